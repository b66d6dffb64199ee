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

//! Per-dish split.
//!
//! Each dish is shared evenly by the participants who ate it. Shares are
//! kept as unrounded decimals and only rounded for display, so a 1000 yen
//! dish split three ways owes 333.33… per eater.
//!
//! Nobody records payments in this model: every participant's net amount is
//! minus what they owe, which means the settlement engine finds no creditor
//! and the owed totals are the result.

use crate::base::{ColorTag, DishId, PersonId};
use crate::settlement::Balance;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// A participant in the itemized model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: PersonId,
    pub name: String,
}

impl Participant {
    pub fn new(id: PersonId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A dish and the participants who shared it.
///
/// `price` is kept exactly as entered and parsed on every calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dish {
    pub id: DishId,
    pub name: String,
    pub price: String,
    #[serde(default)]
    pub eaters: Vec<PersonId>,
}

impl Dish {
    pub fn new(id: DishId, name: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            price: price.into(),
            eaters: Vec::new(),
        }
    }

    pub fn with_eaters(mut self, eaters: Vec<PersonId>) -> Self {
        self.eaters = eaters;
        self
    }

    /// The price if it parses to a positive integer.
    pub fn valid_price(&self) -> Option<Decimal> {
        parse_price(&self.price)
            .filter(|price| *price > 0)
            .map(Decimal::from)
    }
}

/// One dish's share in a participant's bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DishContribution {
    pub dish_id: DishId,
    pub dish_name: String,
    pub dish_price: Decimal,
    pub contribution: Decimal,
}

/// What one participant owes across all dishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantPayment {
    pub participant_id: PersonId,
    pub participant_name: String,
    pub total_paid: Decimal,
    pub total_owed: Decimal,
    pub net_amount: Decimal,
    pub dishes: Vec<DishContribution>,
}

impl ParticipantPayment {
    fn new(participant: &Participant) -> Self {
        Self {
            participant_id: participant.id.clone(),
            participant_name: participant.name.clone(),
            total_paid: Decimal::ZERO,
            total_owed: Decimal::ZERO,
            net_amount: Decimal::ZERO,
            dishes: Vec::new(),
        }
    }
}

/// Result of the itemized model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemizedSummary {
    /// Sum of every valid dish price, including dishes nobody ate.
    pub total_amount: Decimal,
    pub participants: Vec<ParticipantPayment>,
    pub balances: Vec<Balance>,
}

impl ItemizedSummary {
    /// Sum of all owed shares. Falls short of `total_amount` when a priced
    /// dish has no eaters.
    pub fn total_owed(&self) -> Decimal {
        self.participants.iter().map(|p| p.total_owed).sum()
    }
}

/// Parses a price the way a lenient integer parser would: leading
/// whitespace and an optional sign, then the longest run of ASCII digits.
/// Anything after the digits is ignored ("1200円" is 1200).
///
/// Returns `None` when no digits are found or the value overflows.
pub fn parse_price(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }
    let value: i64 = rest[..digits_end].parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Runs the whole itemized model.
pub fn compute_itemized_balances(dishes: &[Dish], participants: &[Participant]) -> ItemizedSummary {
    let mut payments: Vec<ParticipantPayment> =
        participants.iter().map(ParticipantPayment::new).collect();
    let mut index: HashMap<&PersonId, usize> = HashMap::with_capacity(participants.len());
    for (position, participant) in participants.iter().enumerate() {
        index.entry(&participant.id).or_insert(position);
    }

    let mut total_amount = Decimal::ZERO;

    for dish in dishes {
        let Some(price) = dish.valid_price() else {
            debug!(dish = %dish.id, price = %dish.price, "skipping dish without a valid price");
            continue;
        };
        total_amount += price;

        if dish.eaters.is_empty() {
            debug!(dish = %dish.id, "dish has no eaters; nothing allocated");
            continue;
        }

        let share = price / Decimal::from(dish.eaters.len());
        for eater in &dish.eaters {
            let Some(&position) = index.get(eater) else {
                debug!(dish = %dish.id, eater = %eater, "ignoring unknown eater");
                continue;
            };
            let payment = &mut payments[position];
            payment.total_owed += share;
            payment.dishes.push(DishContribution {
                dish_id: dish.id.clone(),
                dish_name: dish.name.clone(),
                dish_price: price,
                contribution: share,
            });
        }
    }

    for payment in &mut payments {
        payment.net_amount = payment.total_paid - payment.total_owed;
    }

    let balances = payments
        .iter()
        .enumerate()
        .map(|(position, payment)| {
            Balance::new(
                payment.participant_name.clone(),
                payment.net_amount,
                ColorTag(position),
            )
        })
        .collect();

    ItemizedSummary {
        total_amount,
        participants: payments,
        balances,
    }
}
