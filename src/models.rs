// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Categories a transaction may carry, keyed by its type.
pub const EXPENSE_CATEGORIES: [&str; 4] = ["food", "shopping", "health", "other"];
pub const INCOME_CATEGORIES: [&str; 4] = ["salary", "gift", "investment", "bonus"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        }
    }

    pub fn categories(&self) -> &'static [&'static str] {
        match self {
            TransactionType::Income => &INCOME_CATEGORIES,
            TransactionType::Expense => &EXPENSE_CATEGORIES,
        }
    }

    pub fn valid_category(&self, category: &str) -> bool {
        self.categories().contains(&category)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(format!("unknown transaction type '{}'", other)),
        }
    }
}

/// The type owning a category, if the category is known at all. The two
/// category sets are disjoint, so the answer is unique.
pub fn category_kind(category: &str) -> Option<TransactionType> {
    if EXPENSE_CATEGORIES.contains(&category) {
        Some(TransactionType::Expense)
    } else if INCOME_CATEGORIES.contains(&category) {
        Some(TransactionType::Income)
    } else {
        None
    }
}

/// One committed financial event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: String,
    pub amount: Decimal,
    pub currency: String,
    pub date: NaiveDate,
    pub description: Option<String>,
}

/// Per (user, day, currency) aggregate of the transaction log. Derived
/// state: always reconstructible by replaying the partition's transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRollup {
    pub date: NaiveDate,
    pub currency: String,
    pub total_expense: Decimal,
    pub total_income: Decimal,
    pub expense_by_category: BTreeMap<String, Decimal>,
    pub income_by_category: BTreeMap<String, Decimal>,
}

impl DailyRollup {
    /// Document key of the rollup within its user's collection.
    pub fn doc_key(&self) -> String {
        format!("{}_{}", self.date, self.currency)
    }
}

#[derive(Debug, Clone)]
pub struct AddTransaction {
    pub user_id: String,
    pub kind: TransactionType,
    pub category: String,
    pub amount: Decimal,
    pub currency: String,
    pub date: NaiveDate,
    pub description: Option<String>,
}

/// Full replacement state for an existing transaction. Any field may differ
/// from the stored record, including date and currency.
#[derive(Debug, Clone)]
pub struct UpdateTransaction {
    pub user_id: String,
    pub id: String,
    pub kind: TransactionType,
    pub category: String,
    pub amount: Decimal,
    pub currency: String,
    pub date: NaiveDate,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DeleteTransaction {
    pub user_id: String,
    pub id: String,
}

pub const PAGE_LIMIT: usize = 10;

#[derive(Debug, Clone)]
pub struct ListRequest {
    pub user_id: String,
    pub currency: Option<String>,
    pub kind: Option<TransactionType>,
    pub category: Option<String>,
    /// Inclusive window; both default to the current calendar month.
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub limit: usize,
    /// Id of the last record seen on the previous page.
    pub cursor: Option<String>,
}

impl ListRequest {
    pub fn for_user(user_id: &str) -> Self {
        ListRequest {
            user_id: user_id.to_string(),
            currency: None,
            kind: None,
            category: None,
            start_date: None,
            end_date: None,
            limit: PAGE_LIMIT,
            cursor: None,
        }
    }
}

/// Rollups of the active window folded into one totals object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalsSummary {
    pub currency: String,
    pub total_expense: Decimal,
    pub total_income: Decimal,
    pub expense_by_category: BTreeMap<String, Decimal>,
    pub income_by_category: BTreeMap<String, Decimal>,
}

impl TotalsSummary {
    pub fn empty(currency: &str) -> Self {
        TotalsSummary {
            currency: currency.to_string(),
            total_expense: Decimal::ZERO,
            total_income: Decimal::ZERO,
            expense_by_category: BTreeMap::new(),
            income_by_category: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListPage {
    pub transactions: Vec<TransactionRecord>,
    pub totals: TotalsSummary,
    pub has_more: bool,
    pub last_doc: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EraseRequest {
    pub user_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// What a bulk erase actually removed. Batches commit independently, so on
/// failure earlier batches stay deleted; see `LedgerError::PartialErase`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EraseOutcome {
    pub transactions_deleted: usize,
    pub rollups_deleted: usize,
    pub batches: usize,
}

impl EraseOutcome {
    pub fn nothing() -> Self {
        EraseOutcome {
            transactions_deleted: 0,
            rollups_deleted: 0,
            batches: 0,
        }
    }
}
