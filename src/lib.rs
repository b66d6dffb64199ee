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

//! # Warimaru
//!
//! This library splits shared expenses and works out who pays whom.
//!
//! ## Core Components
//!
//! - [`compute_even_split_balances`]: even split among payers and excluded non-payers
//! - [`compute_itemized_balances`]: per-dish split among the people who ate each dish
//! - [`Settler`]: greedy transfer minimization shared by both models
//! - [`EvenSplitSession`] / [`ItemizedSession`]: editable in-memory rosters
//! - [`share`]: share-link payload codec
//! - [`report`]: grouping and formatting for display
//!
//! ## Example
//!
//! ```
//! use warimaru_rs::{
//!     PaymentId, PaymentItem, Person, PersonId, compute_even_split_balances,
//!     compute_settlement_transfers,
//! };
//! use rust_decimal_macros::dec;
//!
//! let people = vec![
//!     Person::new(PersonId::from("a"), "A")
//!         .with_payments(vec![PaymentItem::new(PaymentId::from("1"), dec!(3000), "")]),
//!     Person::new(PersonId::from("b"), "B")
//!         .with_payments(vec![PaymentItem::new(PaymentId::from("2"), dec!(1000), "")]),
//! ];
//!
//! let summary = compute_even_split_balances(&people, 0);
//! assert_eq!(summary.per_person_amount, dec!(2000));
//!
//! let transfers = compute_settlement_transfers(&summary.balances);
//! assert_eq!(transfers.len(), 1);
//! assert_eq!((transfers[0].from.as_str(), transfers[0].to.as_str()), ("B", "A"));
//! assert_eq!(transfers[0].amount, dec!(1000));
//! ```
//!
//! ## Purity
//!
//! Calculation functions are pure and synchronous. They never mutate their
//! input, so recomputing from the same state gives identical results.

mod base;
pub mod error;
pub mod even_split;
pub mod itemized;
pub mod person;
pub mod report;
pub mod session;
pub mod settlement;
pub mod share;

pub use base::{ColorTag, DishId, PaymentId, PersonId};
pub use error::{SessionError, ShareLinkError};
pub use even_split::{EvenSplitSummary, PaymentStatus, compute_even_split_balances};
pub use itemized::{
    Dish, DishContribution, ItemizedSummary, Participant, ParticipantPayment,
    compute_itemized_balances,
};
pub use person::{AMOUNT_LIMIT, PaymentItem, PaymentMode, Person, person_label};
pub use report::{TransferGroup, format_yen, group_transfers};
pub use session::{EvenSplitSession, IdAllocator, ItemizedSession};
pub use settlement::{Balance, Settler, Transfer, compute_settlement_transfers};
