// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The ledger store contract and its SQLite implementation.
//!
//! The engine is written against [`LedgerStore`]: per-record get/put/delete
//! inside an atomic read-then-write transaction, indexed range queries, and
//! batched deletes. Any document or key-value store with multi-key atomic
//! read-modify-write satisfies the contract; the one shipped here keeps
//! records as rows in SQLite.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::LedgerError;
use crate::models::{DailyRollup, TransactionRecord, TransactionType};

/// Most mutations one `delete_batch` call may carry, mirroring the write
/// ceiling of the document stores this contract abstracts.
pub const BATCH_WRITE_CEILING: usize = 500;

/// Attempts per atomic transaction before contention becomes an internal error.
const TXN_RETRY_LIMIT: u32 = 5;

const HOME_CURRENCY_DEFAULT: &str = "THB";

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "Daybook", "daybook"));

pub fn db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("daybook.sqlite"))
}

/// Opaque id for a new transaction record, unique per store.
pub fn new_transaction_id() -> String {
    Uuid::new_v4().to_string()
}

/// Read/write context inside one atomic transaction. All reads see writes
/// made earlier in the same transaction; the commit is all-or-nothing.
pub trait LedgerTx {
    fn get_transaction(&mut self, id: &str) -> Result<Option<TransactionRecord>, LedgerError>;
    fn put_transaction(&mut self, record: &TransactionRecord) -> Result<(), LedgerError>;
    fn delete_transaction(&mut self, id: &str) -> Result<(), LedgerError>;
    fn get_rollup(
        &mut self,
        date: NaiveDate,
        currency: &str,
    ) -> Result<Option<DailyRollup>, LedgerError>;
    fn put_rollup(&mut self, rollup: &DailyRollup) -> Result<(), LedgerError>;
    fn delete_rollup(&mut self, date: NaiveDate, currency: &str) -> Result<(), LedgerError>;
}

/// Filtered, ordered read of the transaction log. Results come back date
/// descending, id descending within a day.
#[derive(Debug, Clone)]
pub struct TransactionQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub currency: Option<String>,
    pub kind: Option<TransactionType>,
    pub category: Option<String>,
    pub limit: Option<usize>,
    /// `(date, id)` of the last record already seen; results start strictly
    /// after it in the sort order.
    pub start_after: Option<(NaiveDate, String)>,
}

impl TransactionQuery {
    pub fn window(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        TransactionQuery {
            start_date,
            end_date,
            currency: None,
            kind: None,
            category: None,
            limit: None,
            start_after: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RollupQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub currency: Option<String>,
    /// Keep only rollups whose total for this type is positive; the
    /// aggregator sets it when a type filter is active so irrelevant
    /// partitions never leave the store.
    pub positive: Option<TransactionType>,
}

/// Reference to a deletable document, as handed to `delete_batch`.
#[derive(Debug, Clone)]
pub enum DocRef {
    Transaction(String),
    Rollup(NaiveDate, String),
}

pub trait LedgerStore {
    /// Run `op` as one atomic read-then-write transaction for `user_id`'s
    /// documents. Contention with a concurrent writer is retried internally
    /// a bounded number of times; business errors from `op` abort the
    /// transaction with nothing applied.
    fn atomically(
        &mut self,
        user_id: &str,
        op: &mut dyn FnMut(&mut dyn LedgerTx) -> Result<(), LedgerError>,
    ) -> Result<(), LedgerError>;

    fn find_transaction(
        &self,
        user_id: &str,
        id: &str,
    ) -> Result<Option<TransactionRecord>, LedgerError>;

    fn query_transactions(
        &self,
        user_id: &str,
        query: &TransactionQuery,
    ) -> Result<Vec<TransactionRecord>, LedgerError>;

    fn query_rollups(
        &self,
        user_id: &str,
        query: &RollupQuery,
    ) -> Result<Vec<DailyRollup>, LedgerError>;

    /// Delete every referenced document in one committed batch. Callers must
    /// keep `batch.len()` within `batch_write_ceiling`.
    fn delete_batch(&mut self, user_id: &str, batch: &[DocRef]) -> Result<(), LedgerError>;

    fn batch_write_ceiling(&self) -> usize;

    /// Currency the aggregator falls back to when no currency filter is given.
    fn home_currency(&self) -> Result<String, LedgerError>;
}

pub struct SqliteStore {
    conn: Connection,
    batch_ceiling: usize,
}

impl SqliteStore {
    pub fn open_or_init() -> Result<Self> {
        let path = db_path()?;
        let conn =
            Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
        Self::from_connection(conn)
    }

    pub fn open_at(path: &std::path::Path) -> Result<Self> {
        let conn =
            Connection::open(path).with_context(|| format!("Open DB at {}", path.display()))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        conn.busy_timeout(Duration::from_millis(250))?;
        Ok(SqliteStore {
            conn,
            batch_ceiling: BATCH_WRITE_CEILING,
        })
    }

    pub fn with_batch_ceiling(mut self, ceiling: usize) -> Self {
        self.batch_ceiling = ceiling.max(1);
        self
    }

    pub fn set_home_currency(&self, currency: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO settings(key, value) VALUES('home_currency', ?1)
             ON CONFLICT(key) DO UPDATE SET value=excluded.value",
            params![currency],
        )?;
        Ok(())
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS transactions(
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        type TEXT NOT NULL CHECK(type IN ('Income','Expense')),
        category TEXT NOT NULL,
        amount TEXT NOT NULL,
        currency TEXT NOT NULL,
        date TEXT NOT NULL,
        description TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_user_date ON transactions(user_id, date);

    CREATE TABLE IF NOT EXISTS daily_rollups(
        user_id TEXT NOT NULL,
        date TEXT NOT NULL,
        currency TEXT NOT NULL,
        total_expense TEXT NOT NULL,
        total_income TEXT NOT NULL,
        expense_by_category TEXT NOT NULL,
        income_by_category TEXT NOT NULL,
        PRIMARY KEY(user_id, date, currency)
    );
    "#,
    )?;
    Ok(())
}

impl LedgerStore for SqliteStore {
    fn atomically(
        &mut self,
        user_id: &str,
        op: &mut dyn FnMut(&mut dyn LedgerTx) -> Result<(), LedgerError>,
    ) -> Result<(), LedgerError> {
        let mut attempts = 0u32;
        loop {
            let result = run_txn(&mut self.conn, user_id, op);
            match result {
                Err(LedgerError::Contention(reason)) => {
                    attempts += 1;
                    if attempts >= TXN_RETRY_LIMIT {
                        return Err(LedgerError::Internal(format!(
                            "transaction aborted {} times by concurrent writers: {}",
                            attempts, reason
                        )));
                    }
                    log::warn!(
                        "atomic transaction contended (attempt {}): {}",
                        attempts,
                        reason
                    );
                    std::thread::sleep(Duration::from_millis(20 * u64::from(attempts)));
                }
                other => return other,
            }
        }
    }

    fn find_transaction(
        &self,
        user_id: &str,
        id: &str,
    ) -> Result<Option<TransactionRecord>, LedgerError> {
        get_transaction_row(&self.conn, user_id, id)
    }

    fn query_transactions(
        &self,
        user_id: &str,
        query: &TransactionQuery,
    ) -> Result<Vec<TransactionRecord>, LedgerError> {
        let mut sql = String::from(
            "SELECT id, type, category, amount, currency, date, description
             FROM transactions WHERE user_id=? AND date>=? AND date<=?",
        );
        let mut params_vec: Vec<String> = vec![
            user_id.to_string(),
            query.start_date.to_string(),
            query.end_date.to_string(),
        ];

        if let Some(ccy) = &query.currency {
            sql.push_str(" AND currency=?");
            params_vec.push(ccy.clone());
        }
        if let Some(kind) = query.kind {
            sql.push_str(" AND type=?");
            params_vec.push(kind.as_str().to_string());
        }
        if let Some(cat) = &query.category {
            sql.push_str(" AND category=?");
            params_vec.push(cat.clone());
        }
        if let Some((date, id)) = &query.start_after {
            sql.push_str(" AND (date<? OR (date=? AND id<?))");
            params_vec.push(date.to_string());
            params_vec.push(date.to_string());
            params_vec.push(id.clone());
        }
        sql.push_str(" ORDER BY date DESC, id DESC");
        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            params_vec.push(limit.to_string());
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(rusqlite::params_from_iter(params_vec.iter()))?;
        let mut records = Vec::new();
        while let Some(r) = rows.next()? {
            records.push(record_from_row(user_id, r)?);
        }
        Ok(records)
    }

    fn query_rollups(
        &self,
        user_id: &str,
        query: &RollupQuery,
    ) -> Result<Vec<DailyRollup>, LedgerError> {
        let mut sql = String::from(
            "SELECT date, currency, total_expense, total_income,
                    expense_by_category, income_by_category
             FROM daily_rollups WHERE user_id=? AND date>=? AND date<=?",
        );
        let mut params_vec: Vec<String> = vec![
            user_id.to_string(),
            query.start_date.to_string(),
            query.end_date.to_string(),
        ];

        if let Some(ccy) = &query.currency {
            sql.push_str(" AND currency=?");
            params_vec.push(ccy.clone());
        }
        match query.positive {
            Some(TransactionType::Expense) => {
                sql.push_str(" AND CAST(total_expense AS REAL) > 0");
            }
            Some(TransactionType::Income) => {
                sql.push_str(" AND CAST(total_income AS REAL) > 0");
            }
            None => {}
        }
        sql.push_str(" ORDER BY date, currency");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(rusqlite::params_from_iter(params_vec.iter()))?;
        let mut rollups = Vec::new();
        while let Some(r) = rows.next()? {
            rollups.push(rollup_from_row(r)?);
        }
        Ok(rollups)
    }

    fn delete_batch(&mut self, user_id: &str, batch: &[DocRef]) -> Result<(), LedgerError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        for doc in batch {
            match doc {
                DocRef::Transaction(id) => {
                    tx.execute(
                        "DELETE FROM transactions WHERE user_id=?1 AND id=?2",
                        params![user_id, id],
                    )?;
                }
                DocRef::Rollup(date, currency) => {
                    tx.execute(
                        "DELETE FROM daily_rollups WHERE user_id=?1 AND date=?2 AND currency=?3",
                        params![user_id, date, currency],
                    )?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn batch_write_ceiling(&self) -> usize {
        self.batch_ceiling
    }

    fn home_currency(&self) -> Result<String, LedgerError> {
        let v: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key='home_currency'",
                [],
                |r| r.get(0),
            )
            .optional()?;
        Ok(v.unwrap_or_else(|| HOME_CURRENCY_DEFAULT.to_string()))
    }
}

fn run_txn(
    conn: &mut Connection,
    user_id: &str,
    op: &mut dyn FnMut(&mut dyn LedgerTx) -> Result<(), LedgerError>,
) -> Result<(), LedgerError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    {
        let mut ctx = SqliteTx { tx: &tx, user_id };
        op(&mut ctx)?;
    }
    tx.commit()?;
    Ok(())
}

struct SqliteTx<'a> {
    tx: &'a rusqlite::Transaction<'a>,
    user_id: &'a str,
}

impl LedgerTx for SqliteTx<'_> {
    fn get_transaction(&mut self, id: &str) -> Result<Option<TransactionRecord>, LedgerError> {
        get_transaction_row(self.tx, self.user_id, id)
    }

    fn put_transaction(&mut self, record: &TransactionRecord) -> Result<(), LedgerError> {
        self.tx.execute(
            "INSERT INTO transactions(id, user_id, type, category, amount, currency, date, description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                 type=excluded.type, category=excluded.category, amount=excluded.amount,
                 currency=excluded.currency, date=excluded.date, description=excluded.description",
            params![
                record.id,
                self.user_id,
                record.kind.as_str(),
                record.category,
                record.amount.to_string(),
                record.currency,
                record.date,
                record.description,
            ],
        )?;
        Ok(())
    }

    fn delete_transaction(&mut self, id: &str) -> Result<(), LedgerError> {
        self.tx.execute(
            "DELETE FROM transactions WHERE user_id=?1 AND id=?2",
            params![self.user_id, id],
        )?;
        Ok(())
    }

    fn get_rollup(
        &mut self,
        date: NaiveDate,
        currency: &str,
    ) -> Result<Option<DailyRollup>, LedgerError> {
        let mut stmt = self.tx.prepare(
            "SELECT date, currency, total_expense, total_income,
                    expense_by_category, income_by_category
             FROM daily_rollups WHERE user_id=?1 AND date=?2 AND currency=?3",
        )?;
        let mut rows = stmt.query(params![self.user_id, date, currency])?;
        match rows.next()? {
            Some(r) => Ok(Some(rollup_from_row(r)?)),
            None => Ok(None),
        }
    }

    fn put_rollup(&mut self, rollup: &DailyRollup) -> Result<(), LedgerError> {
        self.tx.execute(
            "INSERT INTO daily_rollups(user_id, date, currency, total_expense, total_income,
                                       expense_by_category, income_by_category)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(user_id, date, currency) DO UPDATE SET
                 total_expense=excluded.total_expense, total_income=excluded.total_income,
                 expense_by_category=excluded.expense_by_category,
                 income_by_category=excluded.income_by_category",
            params![
                self.user_id,
                rollup.date,
                rollup.currency,
                rollup.total_expense.to_string(),
                rollup.total_income.to_string(),
                serde_json::to_string(&rollup.expense_by_category)?,
                serde_json::to_string(&rollup.income_by_category)?,
            ],
        )?;
        Ok(())
    }

    fn delete_rollup(&mut self, date: NaiveDate, currency: &str) -> Result<(), LedgerError> {
        self.tx.execute(
            "DELETE FROM daily_rollups WHERE user_id=?1 AND date=?2 AND currency=?3",
            params![self.user_id, date, currency],
        )?;
        Ok(())
    }
}

fn get_transaction_row(
    conn: &Connection,
    user_id: &str,
    id: &str,
) -> Result<Option<TransactionRecord>, LedgerError> {
    let mut stmt = conn.prepare(
        "SELECT id, type, category, amount, currency, date, description
         FROM transactions WHERE user_id=?1 AND id=?2",
    )?;
    let mut rows = stmt.query(params![user_id, id])?;
    match rows.next()? {
        Some(r) => Ok(Some(record_from_row(user_id, r)?)),
        None => Ok(None),
    }
}

fn record_from_row(user_id: &str, row: &rusqlite::Row<'_>) -> Result<TransactionRecord, LedgerError> {
    let id: String = row.get(0)?;
    let kind: String = row.get(1)?;
    let category: String = row.get(2)?;
    let amount: String = row.get(3)?;
    let currency: String = row.get(4)?;
    let date: NaiveDate = row.get(5)?;
    let description: Option<String> = row.get(6)?;
    Ok(TransactionRecord {
        kind: kind
            .parse()
            .map_err(|e: String| LedgerError::Internal(format!("record {}: {}", id, e)))?,
        amount: parse_stored_amount(&amount, &id)?,
        id,
        user_id: user_id.to_string(),
        category,
        currency,
        date,
        description,
    })
}

fn rollup_from_row(row: &rusqlite::Row<'_>) -> Result<DailyRollup, LedgerError> {
    let date: NaiveDate = row.get(0)?;
    let currency: String = row.get(1)?;
    let total_expense: String = row.get(2)?;
    let total_income: String = row.get(3)?;
    let expense_json: String = row.get(4)?;
    let income_json: String = row.get(5)?;
    let key = format!("{}_{}", date, currency);
    Ok(DailyRollup {
        date,
        currency,
        total_expense: parse_stored_amount(&total_expense, &key)?,
        total_income: parse_stored_amount(&total_income, &key)?,
        expense_by_category: serde_json::from_str::<BTreeMap<String, Decimal>>(&expense_json)?,
        income_by_category: serde_json::from_str::<BTreeMap<String, Decimal>>(&income_json)?,
    })
}

fn parse_stored_amount(raw: &str, doc: &str) -> Result<Decimal, LedgerError> {
    raw.parse::<Decimal>()
        .map_err(|e| LedgerError::Internal(format!("invalid stored amount '{}' in {}: {}", raw, doc, e)))
}
