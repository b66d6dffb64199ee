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

//! Transfer minimization.
//!
//! The [`Settler`] turns a list of signed balances into directed transfers
//! that bring every balance back to zero. Matching is greedy: the largest
//! debts are paid first, each into the largest remaining credits.
//!
//! # Algorithm
//!
//! 1. Split balances into creditors (`> 0`) and debtors (`< 0`). Anything
//!    within the tolerance of zero is already settled and never appears in
//!    a transfer.
//! 2. Sort creditors descending and debtors ascending. Both sorts are stable,
//!    so equal balances keep their input order.
//! 3. Walk debtors in order. Each debtor pays creditors in order until its
//!    debt is gone. Creditor balances carry over between debtors.
//!
//! Transfers are returned in emission order (debtor-major, creditor-minor).
//! Presentation code groups on that order, so it is part of the contract.

use crate::base::ColorTag;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use tracing::{debug, warn};

/// A named, signed balance fed into the settlement engine.
///
/// Positive means the party is owed money, negative means it owes money.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    pub name: String,
    pub balance: Decimal,
    pub color: ColorTag,
}

impl Balance {
    pub fn new(name: impl Into<String>, balance: Decimal, color: ColorTag) -> Self {
        Self {
            name: name.into(),
            balance,
            color,
        }
    }
}

/// A directed payment instruction produced by the settlement engine.
///
/// `color` is the receiving creditor's tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transfer {
    pub from: String,
    pub to: String,
    pub amount: Decimal,
    #[serde(skip)]
    pub color: ColorTag,
}

/// Greedy settlement engine.
///
/// The tolerance decides when a balance counts as settled. Integer balances
/// from the even split use [`Settler::exact`]; real-valued per-dish shares use
/// [`Settler::itemized`] so that division residue cannot leave phantom
/// transfers behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settler {
    tolerance: Decimal,
}

impl Settler {
    /// Tolerance used for balances built from per-dish shares.
    pub const ITEMIZED_TOLERANCE: Decimal = dec!(0.01);

    /// Settler with no tolerance: only exact zero is settled.
    pub fn exact() -> Self {
        Self {
            tolerance: Decimal::ZERO,
        }
    }

    /// Settler for itemized balances, tolerant to sub-yen residue.
    pub fn itemized() -> Self {
        Self {
            tolerance: Self::ITEMIZED_TOLERANCE,
        }
    }

    /// Settler with a custom tolerance. Negative values are treated as zero.
    pub fn with_tolerance(tolerance: Decimal) -> Self {
        Self {
            tolerance: tolerance.max(Decimal::ZERO),
        }
    }

    pub fn tolerance(&self) -> Decimal {
        self.tolerance
    }

    fn is_settled(&self, amount: Decimal) -> bool {
        amount.abs() <= self.tolerance
    }

    /// Computes the transfers that settle `balances`.
    ///
    /// The input is never modified; creditors are matched on a private copy,
    /// so repeated calls with the same input return the same transfers.
    pub fn settle(&self, balances: &[Balance]) -> Vec<Transfer> {
        let mut creditors: Vec<Balance> = balances
            .iter()
            .filter(|b| b.balance > self.tolerance)
            .cloned()
            .collect();
        let mut debtors: Vec<&Balance> = balances
            .iter()
            .filter(|b| b.balance < -self.tolerance)
            .collect();

        creditors.sort_by(|a, b| b.balance.cmp(&a.balance));
        debtors.sort_by(|a, b| a.balance.cmp(&b.balance));

        debug!(
            creditors = creditors.len(),
            debtors = debtors.len(),
            tolerance = %self.tolerance,
            "partitioned balances"
        );

        let mut transfers = Vec::new();
        let mut unmatched_debt = Decimal::ZERO;

        for debtor in debtors {
            let mut remaining = debtor.balance.abs();

            for creditor in creditors.iter_mut() {
                if self.is_settled(remaining) {
                    break;
                }
                if self.is_settled(creditor.balance) {
                    continue;
                }

                let amount = remaining.min(creditor.balance);
                if amount > Decimal::ZERO {
                    debug!(from = %debtor.name, to = %creditor.name, %amount, "transfer");
                    transfers.push(Transfer {
                        from: debtor.name.clone(),
                        to: creditor.name.clone(),
                        amount,
                        color: creditor.color,
                    });
                    remaining -= amount;
                    creditor.balance -= amount;
                }
            }

            if !self.is_settled(remaining) {
                unmatched_debt += remaining;
            }
        }

        let unmatched_credit: Decimal = creditors
            .iter()
            .filter(|c| !self.is_settled(c.balance))
            .map(|c| c.balance)
            .sum();
        if !unmatched_debt.is_zero() || !unmatched_credit.is_zero() {
            warn!(
                %unmatched_debt,
                %unmatched_credit,
                "balances do not net to zero; residual left unsettled"
            );
        }

        transfers
    }
}

impl Default for Settler {
    fn default() -> Self {
        Self::exact()
    }
}

/// Settles integer balances exactly.
///
/// Shorthand for [`Settler::exact`] followed by [`Settler::settle`].
pub fn compute_settlement_transfers(balances: &[Balance]) -> Vec<Transfer> {
    Settler::exact().settle(balances)
}
