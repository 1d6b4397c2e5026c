// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use daybook::models::TransactionType;
use daybook::rollup::{Sign, apply_delta, blank_rollup, is_zeroed};
use rust_decimal::Decimal;

fn d(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn invariant_holds(rollup: &daybook::models::DailyRollup) -> bool {
    rollup.total_expense == rollup.expense_by_category.values().copied().sum::<Decimal>()
        && rollup.total_income == rollup.income_by_category.values().copied().sum::<Decimal>()
        && rollup.total_expense >= Decimal::ZERO
        && rollup.total_income >= Decimal::ZERO
}

#[test]
fn blank_rollup_is_zeroed() {
    let rollup = blank_rollup(d("2024-01-05"), "THB");
    assert!(is_zeroed(&rollup));
    assert_eq!(rollup.doc_key(), "2024-01-05_THB");
}

#[test]
fn plus_delta_fills_total_and_category() {
    let mut rollup = blank_rollup(d("2024-01-05"), "THB");
    apply_delta(
        &mut rollup,
        TransactionType::Expense,
        "food",
        dec("100"),
        Sign::Plus,
    );
    assert_eq!(rollup.total_expense, dec("100"));
    assert_eq!(rollup.expense_by_category.get("food"), Some(&dec("100")));
    assert!(rollup.income_by_category.is_empty());
    assert!(!is_zeroed(&rollup));
    assert!(invariant_holds(&rollup));
}

#[test]
fn minus_delta_reverses_plus() {
    let mut rollup = blank_rollup(d("2024-01-05"), "THB");
    apply_delta(
        &mut rollup,
        TransactionType::Income,
        "salary",
        dec("500"),
        Sign::Plus,
    );
    apply_delta(
        &mut rollup,
        TransactionType::Income,
        "salary",
        dec("500"),
        Sign::Minus,
    );
    assert!(is_zeroed(&rollup));
    assert!(rollup.income_by_category.is_empty());
}

#[test]
fn minus_delta_floors_at_zero() {
    let mut rollup = blank_rollup(d("2024-01-05"), "THB");
    apply_delta(
        &mut rollup,
        TransactionType::Expense,
        "food",
        dec("30"),
        Sign::Plus,
    );
    // Over-reversal from drift must clamp, not go negative.
    apply_delta(
        &mut rollup,
        TransactionType::Expense,
        "food",
        dec("80"),
        Sign::Minus,
    );
    assert_eq!(rollup.total_expense, Decimal::ZERO);
    assert!(rollup.expense_by_category.is_empty());
    assert!(is_zeroed(&rollup));
}

#[test]
fn zeroed_category_entry_is_removed() {
    let mut rollup = blank_rollup(d("2024-01-05"), "THB");
    apply_delta(
        &mut rollup,
        TransactionType::Expense,
        "food",
        dec("100"),
        Sign::Plus,
    );
    apply_delta(
        &mut rollup,
        TransactionType::Expense,
        "shopping",
        dec("40"),
        Sign::Plus,
    );
    apply_delta(
        &mut rollup,
        TransactionType::Expense,
        "food",
        dec("100"),
        Sign::Minus,
    );
    assert!(!rollup.expense_by_category.contains_key("food"));
    assert_eq!(rollup.total_expense, dec("40"));
    assert!(!is_zeroed(&rollup));
    assert!(invariant_holds(&rollup));
}

#[test]
fn zero_amount_delta_never_creates_entries() {
    let mut rollup = blank_rollup(d("2024-01-05"), "THB");
    apply_delta(
        &mut rollup,
        TransactionType::Income,
        "gift",
        Decimal::ZERO,
        Sign::Plus,
    );
    assert!(rollup.income_by_category.is_empty());
    assert!(is_zeroed(&rollup));
}

#[test]
fn totals_track_category_sums_through_mixed_sequence() {
    let mut rollup = blank_rollup(d("2024-03-01"), "MMK");
    let script: &[(TransactionType, &str, &str, Sign)] = &[
        (TransactionType::Expense, "food", "12.50", Sign::Plus),
        (TransactionType::Expense, "health", "7", Sign::Plus),
        (TransactionType::Income, "salary", "900", Sign::Plus),
        (TransactionType::Expense, "food", "2.50", Sign::Minus),
        (TransactionType::Income, "bonus", "55", Sign::Plus),
        (TransactionType::Expense, "health", "7", Sign::Minus),
        (TransactionType::Income, "salary", "900", Sign::Minus),
    ];
    for (kind, category, amount, sign) in script {
        apply_delta(&mut rollup, *kind, category, dec(amount), *sign);
        assert!(invariant_holds(&rollup), "invariant broke on {:?}", category);
    }
    assert_eq!(rollup.total_expense, dec("10.00"));
    assert_eq!(rollup.total_income, dec("55"));
    assert_eq!(rollup.expense_by_category.len(), 1);
    assert_eq!(rollup.income_by_category.len(), 1);
}
