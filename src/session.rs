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

//! In-memory session state.
//!
//! A session owns the roster being edited and hands slices of it to the
//! calculation functions. There is no global store: callers keep the session
//! value and pass it where it is needed.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use warimaru_rs::EvenSplitSession;
//!
//! let mut session = EvenSplitSession::new();
//! let a = session.people()[0].id.clone();
//! let b = session.people()[1].id.clone();
//! session.set_simple_payment(&a, dec!(3000)).unwrap();
//! session.set_simple_payment(&b, dec!(1000)).unwrap();
//!
//! let transfers = session.transfers();
//! assert_eq!(transfers.len(), 1);
//! assert_eq!(transfers[0].from, "Bさん");
//! assert_eq!(transfers[0].amount, dec!(1000));
//! ```

use crate::base::{DishId, PaymentId, PersonId};
use crate::error::SessionError;
use crate::even_split::{EvenSplitSummary, compute_even_split_balances};
use crate::itemized::{Dish, ItemizedSummary, Participant, compute_itemized_balances};
use crate::person::{PaymentItem, PaymentMode, Person, person_label};
use crate::settlement::{Settler, Transfer};
use rust_decimal::Decimal;
use std::collections::HashSet;

/// Hands out opaque, session-unique identifiers.
///
/// Identifiers are a kind prefix plus a counter ("p1", "pay2", "d3"). The
/// counter is shared across kinds and never reused.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    fn bump(&mut self, prefix: &str) -> String {
        self.next += 1;
        format!("{prefix}{}", self.next)
    }

    pub fn person(&mut self) -> PersonId {
        PersonId(self.bump("p"))
    }

    pub fn payment(&mut self) -> PaymentId {
        PaymentId(self.bump("pay"))
    }

    pub fn dish(&mut self) -> DishId {
        DishId(self.bump("d"))
    }
}

fn ensure_unique<'a>(ids: impl Iterator<Item = &'a PersonId>) -> Result<(), SessionError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(SessionError::DuplicatePerson(id.clone()));
        }
    }
    Ok(())
}

/// Session for the even-split calculator.
#[derive(Debug, Clone)]
pub struct EvenSplitSession {
    people: Vec<Person>,
    mode: PaymentMode,
    non_paying_participants: usize,
    ids: IdAllocator,
}

impl EvenSplitSession {
    /// Starts a session with two people, "Aさん" and "Bさん", and no payments.
    pub fn new() -> Self {
        let mut session = Self::empty();
        session.add_person();
        session.add_person();
        session
    }

    /// Starts a session with nobody in it.
    pub fn empty() -> Self {
        Self {
            people: Vec::new(),
            mode: PaymentMode::default(),
            non_paying_participants: 0,
            ids: IdAllocator::new(),
        }
    }

    /// Restores a session from an existing roster.
    ///
    /// # Errors
    ///
    /// [`SessionError::DuplicatePerson`] if two people share an ID.
    pub fn with_people(people: Vec<Person>, non_paying: usize) -> Result<Self, SessionError> {
        ensure_unique(people.iter().map(|p| &p.id))?;
        let mode = if people.iter().any(|p| p.payments.len() > 1) {
            PaymentMode::Itemized
        } else {
            PaymentMode::Aggregate
        };
        Ok(Self {
            people,
            mode,
            non_paying_participants: non_paying,
            ids: IdAllocator::new(),
        })
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn mode(&self) -> PaymentMode {
        self.mode
    }

    pub fn non_paying_participants(&self) -> usize {
        self.non_paying_participants
    }

    pub fn total_participants(&self) -> usize {
        self.people.len() + self.non_paying_participants
    }

    fn fresh_person_id(&mut self) -> PersonId {
        loop {
            let id = self.ids.person();
            if !self.people.iter().any(|p| p.id == id) {
                return id;
            }
        }
    }

    fn fresh_payment_id(&mut self, person: usize) -> PaymentId {
        loop {
            let id = self.ids.payment();
            if !self.people[person].payments.iter().any(|p| p.id == id) {
                return id;
            }
        }
    }

    fn position(&self, id: &PersonId) -> Result<usize, SessionError> {
        self.people
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| SessionError::PersonNotFound(id.clone()))
    }

    /// Appends a person with the next default label.
    pub fn add_person(&mut self) -> PersonId {
        let name = person_label(self.people.len());
        self.add_person_named(name)
    }

    /// Appends a person with an explicit name.
    pub fn add_person_named(&mut self, name: impl Into<String>) -> PersonId {
        let id = self.fresh_person_id();
        self.people.push(Person::new(id.clone(), name));
        id
    }

    pub fn rename_person(&mut self, id: &PersonId, name: impl Into<String>) -> Result<(), SessionError> {
        let position = self.position(id)?;
        self.people[position].name = name.into();
        Ok(())
    }

    /// Removes a person together with all their payments.
    pub fn delete_person(&mut self, id: &PersonId) -> Result<Person, SessionError> {
        let position = self.position(id)?;
        Ok(self.people.remove(position))
    }

    /// Records a payment.
    ///
    /// In [`PaymentMode::Aggregate`] the new entry replaces the person's
    /// existing payments, as [`set_simple_payment`](Self::set_simple_payment)
    /// does.
    pub fn add_payment(
        &mut self,
        person: &PersonId,
        amount: Decimal,
        description: impl Into<String>,
    ) -> Result<PaymentId, SessionError> {
        let position = self.position(person)?;
        let id = self.fresh_payment_id(position);
        let item = PaymentItem::new(id.clone(), amount, description);
        let payments = &mut self.people[position].payments;
        if self.mode == PaymentMode::Aggregate {
            payments.clear();
        }
        payments.push(item);
        Ok(id)
    }

    pub fn update_payment(
        &mut self,
        person: &PersonId,
        payment: &PaymentId,
        amount: Decimal,
        description: impl Into<String>,
    ) -> Result<(), SessionError> {
        let position = self.position(person)?;
        let item = self.people[position]
            .payments
            .iter_mut()
            .find(|p| &p.id == payment)
            .ok_or_else(|| SessionError::PaymentNotFound(payment.clone()))?;
        item.amount = amount;
        item.description = description.into();
        Ok(())
    }

    pub fn delete_payment(&mut self, person: &PersonId, payment: &PaymentId) -> Result<(), SessionError> {
        let position = self.position(person)?;
        let payments = &mut self.people[position].payments;
        let before = payments.len();
        payments.retain(|p| &p.id != payment);
        if payments.len() == before {
            return Err(SessionError::PaymentNotFound(payment.clone()));
        }
        Ok(())
    }

    /// Replaces the person's payments with a single undescribed entry.
    pub fn set_simple_payment(&mut self, person: &PersonId, amount: Decimal) -> Result<PaymentId, SessionError> {
        let position = self.position(person)?;
        let id = self.fresh_payment_id(position);
        self.people[position].payments = vec![PaymentItem::new(id.clone(), amount, "")];
        Ok(id)
    }

    /// Switches payment mode.
    ///
    /// Entering aggregate mode collapses every multi-entry payment list into
    /// one entry holding its total, so the amounts owed do not change.
    pub fn set_mode(&mut self, mode: PaymentMode) {
        if mode == PaymentMode::Aggregate {
            for position in 0..self.people.len() {
                if self.people[position].payments.len() > 1 {
                    let total = self.people[position].paid_amount();
                    let id = self.fresh_payment_id(position);
                    self.people[position].payments = vec![PaymentItem::new(id, total, "")];
                }
            }
        }
        self.mode = mode;
    }

    pub fn set_non_paying_participants(&mut self, count: usize) {
        self.non_paying_participants = count;
    }

    /// Sets the head count; people beyond the roster become non-payers.
    ///
    /// A total below the roster size means nobody is excluded.
    pub fn set_total_participants(&mut self, total: usize) {
        self.non_paying_participants = total.saturating_sub(self.people.len());
    }

    pub fn summary(&self) -> EvenSplitSummary<'_> {
        compute_even_split_balances(&self.people, self.non_paying_participants)
    }

    pub fn transfers(&self) -> Vec<Transfer> {
        Settler::exact().settle(&self.summary().balances)
    }
}

impl Default for EvenSplitSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Session for the per-dish calculator.
#[derive(Debug, Clone, Default)]
pub struct ItemizedSession {
    participants: Vec<Participant>,
    dishes: Vec<Dish>,
    ids: IdAllocator,
}

impl ItemizedSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a session from existing participants and dishes.
    ///
    /// Dish eaters are kept as given, even if they reference nobody.
    ///
    /// # Errors
    ///
    /// [`SessionError::DuplicatePerson`] if two participants share an ID.
    pub fn with_parts(participants: Vec<Participant>, dishes: Vec<Dish>) -> Result<Self, SessionError> {
        ensure_unique(participants.iter().map(|p| &p.id))?;
        Ok(Self {
            participants,
            dishes,
            ids: IdAllocator::new(),
        })
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn dishes(&self) -> &[Dish] {
        &self.dishes
    }

    fn participant_position(&self, id: &PersonId) -> Result<usize, SessionError> {
        self.participants
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| SessionError::PersonNotFound(id.clone()))
    }

    fn dish_mut(&mut self, id: &DishId) -> Result<&mut Dish, SessionError> {
        self.dishes
            .iter_mut()
            .find(|d| &d.id == id)
            .ok_or_else(|| SessionError::DishNotFound(id.clone()))
    }

    pub fn add_participant(&mut self, name: impl Into<String>) -> PersonId {
        let id = loop {
            let id = self.ids.person();
            if !self.participants.iter().any(|p| p.id == id) {
                break id;
            }
        };
        self.participants.push(Participant::new(id.clone(), name));
        id
    }

    pub fn rename_participant(&mut self, id: &PersonId, name: impl Into<String>) -> Result<(), SessionError> {
        let position = self.participant_position(id)?;
        self.participants[position].name = name.into();
        Ok(())
    }

    /// Removes a participant and takes them off every dish.
    pub fn remove_participant(&mut self, id: &PersonId) -> Result<Participant, SessionError> {
        let position = self.participant_position(id)?;
        for dish in &mut self.dishes {
            dish.eaters.retain(|eater| eater != id);
        }
        Ok(self.participants.remove(position))
    }

    /// Adds a dish nobody has eaten yet.
    pub fn add_dish(&mut self, name: impl Into<String>, price: impl Into<String>) -> DishId {
        let id = loop {
            let id = self.ids.dish();
            if !self.dishes.iter().any(|d| d.id == id) {
                break id;
            }
        };
        self.dishes.push(Dish::new(id.clone(), name, price));
        id
    }

    pub fn rename_dish(&mut self, id: &DishId, name: impl Into<String>) -> Result<(), SessionError> {
        self.dish_mut(id)?.name = name.into();
        Ok(())
    }

    pub fn update_dish_price(&mut self, id: &DishId, price: impl Into<String>) -> Result<(), SessionError> {
        self.dish_mut(id)?.price = price.into();
        Ok(())
    }

    pub fn remove_dish(&mut self, id: &DishId) -> Result<Dish, SessionError> {
        let position = self
            .dishes
            .iter()
            .position(|d| &d.id == id)
            .ok_or_else(|| SessionError::DishNotFound(id.clone()))?;
        Ok(self.dishes.remove(position))
    }

    /// Flips whether `person` shares `dish`. Returns `true` if they now do.
    pub fn toggle_eater(&mut self, dish: &DishId, person: &PersonId) -> Result<bool, SessionError> {
        self.participant_position(person)?;
        let dish = self.dish_mut(dish)?;
        if let Some(position) = dish.eaters.iter().position(|eater| eater == person) {
            dish.eaters.remove(position);
            Ok(false)
        } else {
            dish.eaters.push(person.clone());
            Ok(true)
        }
    }

    /// Marks every participant as sharing `dish`, in roster order.
    pub fn set_all_eaters(&mut self, dish: &DishId) -> Result<(), SessionError> {
        let everyone: Vec<PersonId> = self.participants.iter().map(|p| p.id.clone()).collect();
        self.dish_mut(dish)?.eaters = everyone;
        Ok(())
    }

    pub fn summary(&self) -> ItemizedSummary {
        compute_itemized_balances(&self.dishes, &self.participants)
    }

    pub fn transfers(&self) -> Vec<Transfer> {
        Settler::itemized().settle(&self.summary().balances)
    }
}
