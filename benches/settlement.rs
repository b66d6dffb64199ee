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

//! Benchmarks for the settlement engine and balance models.
//!
//! Run with: cargo bench
//!
//! Benchmarks include:
//! - Greedy settlement at growing participant counts
//! - Even-split balance computation
//! - Itemized balance computation

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;
use warimaru_rs::{
    Balance, ColorTag, Dish, DishId, Participant, PaymentId, PaymentItem, Person, PersonId,
    Settler, compute_even_split_balances, compute_itemized_balances,
    compute_settlement_transfers,
};

// =============================================================================
// Helper Functions
// =============================================================================

/// Alternating creditors and debtors whose balances sum to zero.
fn make_balances(count: usize) -> Vec<Balance> {
    (0..count)
        .map(|i| {
            let magnitude = Decimal::from(((i / 2) * 37 % 1000 + 1) as i64);
            let amount = if i % 2 == 0 { magnitude } else { -magnitude };
            Balance::new(format!("P{i}"), amount, ColorTag(i))
        })
        .collect()
}

fn make_people(count: usize) -> Vec<Person> {
    (0..count)
        .map(|i| {
            let payments = (0..3)
                .map(|j| {
                    PaymentItem::new(
                        PaymentId(format!("{i}-{j}")),
                        Decimal::from(((i * 7 + j * 13) % 5000) as i64),
                        "",
                    )
                })
                .collect();
            Person::new(PersonId(format!("p{i}")), format!("P{i}")).with_payments(payments)
        })
        .collect()
}

fn make_menu(participants: usize, dishes: usize) -> (Vec<Participant>, Vec<Dish>) {
    let roster: Vec<Participant> = (0..participants)
        .map(|i| Participant::new(PersonId(format!("p{i}")), format!("P{i}")))
        .collect();
    let menu = (0..dishes)
        .map(|d| {
            let eaters = roster
                .iter()
                .enumerate()
                .filter(|(i, _)| (i + d) % 3 != 0)
                .map(|(_, p)| p.id.clone())
                .collect();
            Dish::new(DishId(format!("d{d}")), format!("dish{d}"), ((d % 20 + 1) * 250).to_string())
                .with_eaters(eaters)
        })
        .collect();
    (roster, menu)
}

// =============================================================================
// Settlement Benchmarks
// =============================================================================

fn bench_settlement_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("settlement_scaling");

    for count in [4, 16, 64, 256].iter() {
        let balances = make_balances(*count);
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &balances, |b, balances| {
            b.iter(|| compute_settlement_transfers(black_box(balances)))
        });
    }

    group.finish();
}

fn bench_itemized_settler(c: &mut Criterion) {
    let balances = make_balances(64);
    let settler = Settler::itemized();
    c.bench_function("itemized_settler_64", |b| {
        b.iter(|| settler.settle(black_box(&balances)))
    });
}

// =============================================================================
// Balance Model Benchmarks
// =============================================================================

fn bench_even_split(c: &mut Criterion) {
    let mut group = c.benchmark_group("even_split");

    for count in [2, 10, 50].iter() {
        let people = make_people(*count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &people, |b, people| {
            b.iter(|| {
                let summary = compute_even_split_balances(black_box(people), 3);
                compute_settlement_transfers(&summary.balances)
            })
        });
    }

    group.finish();
}

fn bench_itemized(c: &mut Criterion) {
    let mut group = c.benchmark_group("itemized");

    for (participants, dishes) in [(4, 10), (10, 40), (30, 120)].iter() {
        let (roster, menu) = make_menu(*participants, *dishes);
        group.bench_with_input(
            BenchmarkId::new("participants", participants),
            &(roster, menu),
            |b, (roster, menu)| b.iter(|| compute_itemized_balances(black_box(menu), black_box(roster))),
        );
    }

    group.finish();
}

criterion_group!(settlement, bench_settlement_scaling, bench_itemized_settler,);

criterion_group!(models, bench_even_split, bench_itemized,);

criterion_main!(settlement, models);
