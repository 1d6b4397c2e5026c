// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Pure delta arithmetic over daily rollups. No I/O, no validation: callers
//! hand in already-validated values.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{DailyRollup, TransactionType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Plus,
    Minus,
}

/// The zero-valued rollup shape for a partition with no prior activity.
pub fn blank_rollup(date: NaiveDate, currency: &str) -> DailyRollup {
    DailyRollup {
        date,
        currency: currency.to_string(),
        total_expense: Decimal::ZERO,
        total_income: Decimal::ZERO,
        expense_by_category: BTreeMap::new(),
        income_by_category: BTreeMap::new(),
    }
}

/// Apply `sign * amount` to the total and category entry matching `kind`.
///
/// Decrements floor every touched field at zero rather than going negative:
/// tolerance for drift, not a correctness proof. A category entry that lands
/// on zero is removed, so the maps only ever hold nonzero history.
pub fn apply_delta(
    rollup: &mut DailyRollup,
    kind: TransactionType,
    category: &str,
    amount: Decimal,
    sign: Sign,
) {
    let (total, by_category) = match kind {
        TransactionType::Expense => (&mut rollup.total_expense, &mut rollup.expense_by_category),
        TransactionType::Income => (&mut rollup.total_income, &mut rollup.income_by_category),
    };

    *total = shifted(*total, amount, sign);

    let entry = by_category.get(category).copied().unwrap_or(Decimal::ZERO);
    let entry = shifted(entry, amount, sign);
    if entry.is_zero() {
        by_category.remove(category);
    } else {
        by_category.insert(category.to_string(), entry);
    }
}

fn shifted(current: Decimal, amount: Decimal, sign: Sign) -> Decimal {
    match sign {
        Sign::Plus => current + amount,
        Sign::Minus => (current - amount).max(Decimal::ZERO),
    }
}

/// True iff the rollup has decayed to no activity at all. Such a rollup must
/// be deleted from the store, never persisted with zero fields.
pub fn is_zeroed(rollup: &DailyRollup) -> bool {
    rollup.total_expense.is_zero()
        && rollup.total_income.is_zero()
        && rollup.expense_by_category.values().all(|v| v.is_zero())
        && rollup.income_by_category.values().all(|v| v.is_zero())
}
