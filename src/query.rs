// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Read path of the ledger: cursor-paginated, filtered pages of the
//! transaction log, with the window's rollups folded into totals on the fly.
//! Reads never touch individual transactions to compute totals.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::LedgerError;
use crate::models::{
    DailyRollup, ListPage, ListRequest, TotalsSummary, TransactionType, category_kind,
};
use crate::store::{LedgerStore, RollupQuery, TransactionQuery};
use crate::utils::month_bounds;

pub fn list_transactions(
    store: &dyn LedgerStore,
    req: &ListRequest,
    today: NaiveDate,
) -> Result<ListPage, LedgerError> {
    if req.user_id.trim().is_empty() {
        return Err(LedgerError::InvalidRequest(
            "User ID is required!".to_string(),
        ));
    }
    if req.limit == 0 {
        return Err(LedgerError::InvalidRequest(
            "Page limit must be at least 1".to_string(),
        ));
    }
    if let Some(cat) = &req.category {
        match (category_kind(cat), req.kind) {
            (None, _) => {
                return Err(LedgerError::InvalidRequest(format!(
                    "Unknown category '{}'",
                    cat
                )));
            }
            (Some(owner), Some(kind)) if owner != kind => {
                return Err(LedgerError::InvalidRequest(format!(
                    "'{}' is not a {} category",
                    cat, kind
                )));
            }
            _ => {}
        }
    }

    let (month_start, month_end) = month_bounds(today);
    let start = req.start_date.unwrap_or(month_start);
    let end = req.end_date.unwrap_or(month_end);
    if start > end {
        return Err(LedgerError::InvalidRequest(format!(
            "Start date {} is after end date {}",
            start, end
        )));
    }

    let start_after = match &req.cursor {
        Some(id) => {
            let rec = store
                .find_transaction(&req.user_id, id)?
                .ok_or_else(|| LedgerError::InvalidRequest("Invalid last document id!".to_string()))?;
            Some((rec.date, rec.id))
        }
        None => None,
    };

    let tran_query = TransactionQuery {
        start_date: start,
        end_date: end,
        currency: req.currency.clone(),
        kind: req.kind,
        category: req.category.clone(),
        limit: Some(req.limit),
        start_after,
    };

    let totals_currency = match &req.currency {
        Some(ccy) => ccy.clone(),
        None => store.home_currency()?,
    };
    let rollup_query = RollupQuery {
        start_date: start,
        end_date: end,
        currency: Some(totals_currency.clone()),
        positive: req.kind,
    };

    let transactions = store.query_transactions(&req.user_id, &tran_query)?;
    if transactions.is_empty() {
        return Err(LedgerError::NotFound(
            "No transactions found for the given criteria.".to_string(),
        ));
    }
    let rollups = store.query_rollups(&req.user_id, &rollup_query)?;

    let totals = fold_totals(
        &rollups,
        req.kind,
        req.category.as_deref(),
        &totals_currency,
    );

    let has_more = transactions.len() == req.limit;
    let last_doc = if has_more {
        transactions.last().map(|t| t.id.clone())
    } else {
        None
    };

    Ok(ListPage {
        transactions,
        totals,
        has_more,
        last_doc,
    })
}

/// Fold the window's rollups into one totals object.
///
/// The full category breakdown is always merged and returned; an active
/// category filter only narrows what lands in the top-level totals. An
/// active type filter keeps the other side's total at zero and skips merging
/// its breakdown, matching what the record query can return.
pub fn fold_totals(
    rollups: &[DailyRollup],
    kind: Option<TransactionType>,
    category: Option<&str>,
    currency: &str,
) -> TotalsSummary {
    let mut totals = TotalsSummary::empty(currency);

    for rollup in rollups {
        match kind {
            None => {
                merge_categories(&mut totals.expense_by_category, &rollup.expense_by_category);
                merge_categories(&mut totals.income_by_category, &rollup.income_by_category);
                match category {
                    None => {
                        totals.total_expense += rollup.total_expense;
                        totals.total_income += rollup.total_income;
                    }
                    Some(cat) => {
                        totals.total_expense += entry(&rollup.expense_by_category, cat);
                        totals.total_income += entry(&rollup.income_by_category, cat);
                    }
                }
            }
            Some(TransactionType::Expense) => {
                merge_categories(&mut totals.expense_by_category, &rollup.expense_by_category);
                totals.total_expense += match category {
                    Some(cat) => entry(&rollup.expense_by_category, cat),
                    None => rollup.total_expense,
                };
            }
            Some(TransactionType::Income) => {
                merge_categories(&mut totals.income_by_category, &rollup.income_by_category);
                totals.total_income += match category {
                    Some(cat) => entry(&rollup.income_by_category, cat),
                    None => rollup.total_income,
                };
            }
        }
    }

    totals
}

fn merge_categories(
    into: &mut std::collections::BTreeMap<String, Decimal>,
    from: &std::collections::BTreeMap<String, Decimal>,
) {
    for (category, amount) in from {
        *into.entry(category.clone()).or_insert(Decimal::ZERO) += *amount;
    }
}

fn entry(map: &std::collections::BTreeMap<String, Decimal>, category: &str) -> Decimal {
    map.get(category).copied().unwrap_or(Decimal::ZERO)
}
