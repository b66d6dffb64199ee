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

//! People and their recorded payments.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use warimaru_rs::{PaymentId, PaymentItem, Person, PersonId, person_label};
//!
//! let mut person = Person::new(PersonId::from("p1"), person_label(0));
//! person.payments.push(PaymentItem::new(PaymentId::from("pay1"), dec!(1200), "taxi"));
//! assert_eq!(person.name, "Aさん");
//! assert_eq!(person.paid_amount(), dec!(1200));
//! ```

use crate::base::{PaymentId, PersonId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Suffix appended to generated person labels.
pub const LABEL_SUFFIX: &str = "さん";

/// Largest payment magnitude accepted from CSV rows and share payloads.
pub const AMOUNT_LIMIT: Decimal = dec!(1000000000000000);

/// How a session records payments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMode {
    /// One aggregate amount per person; every edit replaces the list.
    #[default]
    Aggregate,
    /// Any number of itemized entries per person.
    Itemized,
}

/// A single payment made by a person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentItem {
    pub id: PaymentId,
    pub amount: Decimal,
    pub description: String,
}

impl PaymentItem {
    pub fn new(id: PaymentId, amount: Decimal, description: impl Into<String>) -> Self {
        Self {
            id,
            amount,
            description: description.into(),
        }
    }
}

/// A payer in the even-split model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub payments: Vec<PaymentItem>,
}

impl Person {
    pub fn new(id: PersonId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            payments: Vec::new(),
        }
    }

    pub fn with_payments(mut self, payments: Vec<PaymentItem>) -> Self {
        self.payments = payments;
        self
    }

    /// Sum of every payment amount. Negative entries are not filtered.
    pub fn paid_amount(&self) -> Decimal {
        saturating_sum(self.payments.iter().map(|p| p.amount))
    }
}

/// Sums amounts, clamping at the `Decimal` range instead of overflowing.
pub(crate) fn saturating_sum(amounts: impl IntoIterator<Item = Decimal>) -> Decimal {
    amounts.into_iter().fold(Decimal::ZERO, |total, amount| {
        total.checked_add(amount).unwrap_or_else(|| {
            warn!(%total, %amount, "Amount total overflows; clamping");
            total.saturating_add(amount)
        })
    })
}

/// Default label for the person at roster position `index`.
///
/// `0..26` map to "Aさん".."Zさん", then two letters follow ("AAさん",
/// "ABさん", …, "ZZさん") and so on, spreadsheet-column style.
pub fn person_label(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        n -= 1;
        letters.push(char::from(b'A' + (n % 26) as u8));
        n /= 26;
    }
    letters.iter().rev().collect::<String>() + LABEL_SUFFIX
}
