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

//! Even-split model integration tests.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use warimaru_rs::even_split::{non_paying_label, per_person_amount};
use warimaru_rs::{
    Balance, ColorTag, PaymentId, PaymentItem, Person, PersonId, compute_even_split_balances,
    compute_settlement_transfers,
};

fn make_person(name: &str, amounts: &[i64]) -> Person {
    let payments = amounts
        .iter()
        .enumerate()
        .map(|(i, amount)| {
            PaymentItem::new(PaymentId(format!("{name}-{i}")), Decimal::from(*amount), "")
        })
        .collect();
    Person::new(PersonId::from(name), name).with_payments(payments)
}

#[test]
fn two_payers_without_exclusions() {
    let people = vec![make_person("A", &[3000]), make_person("B", &[1000])];
    let summary = compute_even_split_balances(&people, 0);

    assert_eq!(summary.total_amount, dec!(4000));
    assert_eq!(summary.total_participants, 2);
    assert_eq!(summary.per_person_amount, dec!(2000));
    assert_eq!(summary.max_payment, dec!(3000));

    let status: Vec<(&str, Decimal, Decimal)> = summary
        .payment_status
        .iter()
        .map(|s| (s.person.name.as_str(), s.paid_amount, s.difference))
        .collect();
    assert_eq!(
        status,
        vec![("A", dec!(3000), dec!(1000)), ("B", dec!(1000), dec!(-1000))]
    );

    let transfers = compute_settlement_transfers(&summary.balances);
    assert_eq!(transfers.len(), 1);
    assert_eq!(transfers[0].from, "B");
    assert_eq!(transfers[0].to, "A");
    assert_eq!(transfers[0].amount, dec!(1000));
    assert_eq!(transfers[0].color, ColorTag(0));
}

#[test]
fn single_payer_with_one_non_payer() {
    let people = vec![make_person("A", &[3000])];
    let summary = compute_even_split_balances(&people, 1);

    assert_eq!(summary.total_participants, 2);
    assert_eq!(summary.per_person_amount, dec!(1500));
    assert_eq!(
        summary.balances,
        vec![
            Balance::new("A", dec!(1500), ColorTag(0)),
            Balance::new("参加者1", dec!(-1500), ColorTag(1)),
        ]
    );

    let transfers = compute_settlement_transfers(&summary.balances);
    assert_eq!(transfers.len(), 1);
    assert_eq!(transfers[0].from, "参加者1");
    assert_eq!(transfers[0].to, "A");
    assert_eq!(transfers[0].amount, dec!(1500));
}

#[test]
fn rounding_residual_terminates_within_one_unit() {
    let people = vec![
        make_person("A", &[50]),
        make_person("B", &[33]),
        make_person("C", &[17]),
    ];
    let summary = compute_even_split_balances(&people, 0);
    assert_eq!(summary.total_amount, dec!(100));
    assert_eq!(summary.per_person_amount, dec!(34));

    let transfers = compute_settlement_transfers(&summary.balances);
    for balance in &summary.balances {
        let outgoing: Decimal = transfers
            .iter()
            .filter(|t| t.from == balance.name)
            .map(|t| t.amount)
            .sum();
        let incoming: Decimal = transfers
            .iter()
            .filter(|t| t.to == balance.name)
            .map(|t| t.amount)
            .sum();
        let residual = balance.balance + outgoing - incoming;
        assert!(residual.abs() <= Decimal::ONE, "{} left with {}", balance.name, residual);
    }
}

#[test]
fn per_person_amount_is_a_tight_ceiling() {
    for total in [0i64, 1, 99, 100, 101, 4000, 12345] {
        for participants in 1usize..=7 {
            let total = Decimal::from(total);
            let n = Decimal::from(participants);
            let share = per_person_amount(total, participants);
            assert!(share * n >= total);
            assert!(share * n - total < n);
        }
    }
}

#[test]
fn multiple_payments_are_summed_per_person() {
    let people = vec![make_person("A", &[1000, 2000]), make_person("B", &[0])];
    let summary = compute_even_split_balances(&people, 0);
    assert_eq!(summary.payment_status[0].paid_amount, dec!(3000));
    assert_eq!(summary.per_person_amount, dec!(1500));
}

#[test]
fn non_payers_follow_payers_with_sequential_labels() {
    let people = vec![make_person("A", &[900])];
    let summary = compute_even_split_balances(&people, 2);
    let names: Vec<&str> = summary.balances.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["A", "参加者1", "参加者2"]);
    assert_eq!(summary.balances[2].color, ColorTag(2));
    assert_eq!(non_paying_label(2), "参加者2");

    let transfers = compute_settlement_transfers(&summary.balances);
    let pairs: Vec<(&str, &str, Decimal)> = transfers
        .iter()
        .map(|t| (t.from.as_str(), t.to.as_str(), t.amount))
        .collect();
    assert_eq!(
        pairs,
        vec![("参加者1", "A", dec!(300)), ("参加者2", "A", dec!(300))]
    );
}

#[test]
fn synthetic_label_may_collide_with_real_name() {
    let people = vec![make_person("参加者1", &[2000]), make_person("B", &[0])];
    let summary = compute_even_split_balances(&people, 1);
    let colliding = summary
        .balances
        .iter()
        .filter(|b| b.name == "参加者1")
        .count();
    assert_eq!(colliding, 2);
}

#[test]
fn negative_payments_propagate() {
    let people = vec![make_person("A", &[-600]), make_person("B", &[0])];
    let summary = compute_even_split_balances(&people, 0);
    assert_eq!(summary.total_amount, dec!(-600));
    assert_eq!(summary.per_person_amount, dec!(-300));
    assert_eq!(summary.payment_status[0].difference, dec!(-300));
    assert_eq!(summary.payment_status[1].difference, dec!(300));
}

#[test]
fn recomputation_is_identical() {
    let people = vec![make_person("A", &[1234]), make_person("B", &[567])];
    let first = compute_even_split_balances(&people, 3);
    let second = compute_even_split_balances(&people, 3);
    assert_eq!(first, second);
}
