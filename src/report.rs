// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Presentation helpers for settlement results.
//!
//! Transfers to the same creditor for the same amount are shown as one line
//! ("B, C → A 1,000円"). Grouping is keyed on the display name, so two
//! distinct parties sharing a name are merged.

use crate::base::ColorTag;
use crate::settlement::Transfer;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Transfers sharing a recipient and an amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferGroup {
    /// Payers in emission order.
    pub from: Vec<String>,
    pub to: String,
    pub amount: Decimal,
    pub color: ColorTag,
}

/// Groups transfers by `(to, amount)`.
///
/// Groups are ordered by their first payer, then by recipient.
pub fn group_transfers(transfers: &[Transfer]) -> Vec<TransferGroup> {
    let mut groups: Vec<TransferGroup> = Vec::new();
    for transfer in transfers {
        match groups
            .iter_mut()
            .find(|g| g.to == transfer.to && g.amount == transfer.amount)
        {
            Some(group) => group.from.push(transfer.from.clone()),
            None => groups.push(TransferGroup {
                from: vec![transfer.from.clone()],
                to: transfer.to.clone(),
                amount: transfer.amount,
                color: transfer.color,
            }),
        }
    }
    groups.sort_by(|a, b| a.from[0].cmp(&b.from[0]).then_with(|| a.to.cmp(&b.to)));
    groups
}

/// Rounds to whole yen and formats with thousands separators.
///
/// Halves round away from zero: `1234.5` becomes "1,235円".
pub fn format_yen(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let digits = rounded.abs().trunc().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{sign}{grouped}円")
}
