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

//! Even split with excluded non-payers.
//!
//! Every participant owes the same share: the total paid divided by the
//! number of participants, rounded up to a whole yen. Payers are credited
//! with what they paid; non-paying participants owe one full share each and
//! are represented by synthetic "参加者N" balances.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use warimaru_rs::{
//!     PaymentId, PaymentItem, Person, PersonId, compute_even_split_balances,
//!     compute_settlement_transfers,
//! };
//!
//! let people = vec![
//!     Person::new(PersonId::from("a"), "A")
//!         .with_payments(vec![PaymentItem::new(PaymentId::from("1"), dec!(3000), "")]),
//! ];
//! let summary = compute_even_split_balances(&people, 1);
//! assert_eq!(summary.per_person_amount, dec!(1500));
//!
//! let transfers = compute_settlement_transfers(&summary.balances);
//! assert_eq!(transfers[0].from, "参加者1");
//! assert_eq!(transfers[0].amount, dec!(1500));
//! ```

use crate::base::ColorTag;
use crate::person::{Person, saturating_sum};
use crate::settlement::Balance;
use rust_decimal::Decimal;
use tracing::debug;

/// Prefix of the synthetic names given to non-paying participants.
pub const NON_PAYING_LABEL_PREFIX: &str = "参加者";

/// How much one payer paid against the per-person share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentStatus<'a> {
    pub person: &'a Person,
    pub paid_amount: Decimal,
    /// `paid_amount - per_person_amount`; positive means overpaid.
    pub difference: Decimal,
    pub color: ColorTag,
}

/// Everything the even-split result view needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvenSplitSummary<'a> {
    pub total_amount: Decimal,
    pub total_participants: usize,
    pub per_person_amount: Decimal,
    /// Largest single payer total, for scaling progress bars.
    pub max_payment: Decimal,
    pub payment_status: Vec<PaymentStatus<'a>>,
    pub balances: Vec<Balance>,
}

/// Sum of every payment of every person.
pub fn total_amount(people: &[Person]) -> Decimal {
    saturating_sum(people.iter().map(Person::paid_amount))
}

pub fn total_participants(people: &[Person], non_paying: usize) -> usize {
    people.len() + non_paying
}

/// Share owed by each participant, rounded up to a whole unit.
///
/// Returns zero when there are no participants.
pub fn per_person_amount(total: Decimal, total_participants: usize) -> Decimal {
    if total_participants == 0 {
        return Decimal::ZERO;
    }
    (total / Decimal::from(total_participants)).ceil()
}

/// Largest per-person paid total, or zero for an empty roster.
pub fn max_payment(people: &[Person]) -> Decimal {
    people
        .iter()
        .map(Person::paid_amount)
        .max()
        .unwrap_or(Decimal::ZERO)
}

/// Per-payer status in roster order.
pub fn payment_status(people: &[Person], per_person_amount: Decimal) -> Vec<PaymentStatus<'_>> {
    people
        .iter()
        .enumerate()
        .map(|(index, person)| {
            let paid_amount = person.paid_amount();
            PaymentStatus {
                person,
                paid_amount,
                difference: paid_amount - per_person_amount,
                color: ColorTag(index),
            }
        })
        .collect()
}

/// Synthetic name of the `ordinal`-th (1-based) non-paying participant.
pub fn non_paying_label(ordinal: usize) -> String {
    format!("{NON_PAYING_LABEL_PREFIX}{ordinal}")
}

/// Balances for the settlement engine.
///
/// Payers come first in roster order, followed by one entry per non-paying
/// participant owing a full share. Synthetic names are not checked against
/// real ones, so a payer literally named "参加者1" is indistinguishable from
/// the first non-payer downstream.
pub fn even_split_balances(
    statuses: &[PaymentStatus<'_>],
    non_paying: usize,
    per_person_amount: Decimal,
) -> Vec<Balance> {
    let payers = statuses
        .iter()
        .map(|status| Balance::new(status.person.name.clone(), status.difference, status.color));
    let non_payers = (0..non_paying).map(|i| {
        Balance::new(
            non_paying_label(i + 1),
            -per_person_amount,
            ColorTag(statuses.len() + i),
        )
    });
    payers.chain(non_payers).collect()
}

/// Runs the whole even-split model.
pub fn compute_even_split_balances(people: &[Person], non_paying: usize) -> EvenSplitSummary<'_> {
    let total_amount = total_amount(people);
    let total_participants = total_participants(people, non_paying);
    let per_person_amount = per_person_amount(total_amount, total_participants);
    let payment_status = payment_status(people, per_person_amount);
    let balances = even_split_balances(&payment_status, non_paying, per_person_amount);

    debug!(
        %total_amount,
        total_participants,
        %per_person_amount,
        "computed even split"
    );

    EvenSplitSummary {
        total_amount,
        total_participants,
        per_person_amount,
        max_payment: max_payment(people),
        payment_status,
        balances,
    }
}
