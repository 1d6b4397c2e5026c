// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Write path of the ledger: add, update, and delete a transaction while
//! keeping the touched daily rollups in step. Every operation is one atomic
//! multi-document transaction; readers either see all of its writes or none.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::LedgerError;
use crate::models::{
    AddTransaction, DailyRollup, DeleteTransaction, TransactionRecord, TransactionType,
    UpdateTransaction,
};
use crate::rollup::{self, Sign};
use crate::store::{LedgerStore, LedgerTx, new_transaction_id};

/// Record a new transaction and fold it into its partition's rollup.
/// Returns the id of the new record.
pub fn add_transaction(
    store: &mut dyn LedgerStore,
    req: &AddTransaction,
    today: NaiveDate,
) -> Result<String, LedgerError> {
    validate_fields(
        &req.user_id,
        req.kind,
        &req.category,
        req.amount,
        &req.currency,
        req.date,
        today,
    )?;

    let record = TransactionRecord {
        id: new_transaction_id(),
        user_id: req.user_id.clone(),
        kind: req.kind,
        category: req.category.clone(),
        amount: req.amount,
        currency: req.currency.clone(),
        date: req.date,
        description: req.description.clone(),
    };

    store.atomically(&req.user_id, &mut |tx| {
        let mut rollup = tx
            .get_rollup(record.date, &record.currency)?
            .unwrap_or_else(|| rollup::blank_rollup(record.date, &record.currency));
        rollup::apply_delta(
            &mut rollup,
            record.kind,
            &record.category,
            record.amount,
            Sign::Plus,
        );
        tx.put_transaction(&record)?;
        write_or_decay(tx, &rollup)
    })?;

    Ok(record.id)
}

/// Replace an existing transaction, moving its contribution between rollup
/// partitions when date or currency changed.
///
/// Unlike Add, a missing rollup here is a hard error: an existing record
/// always has prior history to reconcile, and fabricating a rollup at update
/// time would hide real drift.
pub fn update_transaction(
    store: &mut dyn LedgerStore,
    req: &UpdateTransaction,
    today: NaiveDate,
) -> Result<(), LedgerError> {
    validate_fields(
        &req.user_id,
        req.kind,
        &req.category,
        req.amount,
        &req.currency,
        req.date,
        today,
    )?;
    if req.id.trim().is_empty() {
        return Err(LedgerError::InvalidRequest(
            "Transaction id is required!".to_string(),
        ));
    }

    store.atomically(&req.user_id, &mut |tx| {
        let old = tx
            .get_transaction(&req.id)?
            .ok_or_else(|| LedgerError::NotFound(format!("transaction {}", req.id)))?;
        let mut source = tx.get_rollup(old.date, &old.currency)?.ok_or_else(|| {
            LedgerError::NotFound(format!(
                "rollup {}_{} for transaction {}",
                old.date, old.currency, old.id
            ))
        })?;
        rollup::apply_delta(&mut source, old.kind, &old.category, old.amount, Sign::Minus);

        let same_partition = old.date == req.date && old.currency == req.currency;
        if same_partition {
            // Keep mutating the same in-memory rollup before persisting
            // anything, so the reversal and the re-application collapse into
            // a single write (or a single delete).
            rollup::apply_delta(&mut source, req.kind, &req.category, req.amount, Sign::Plus);
            write_or_decay(tx, &source)?;
        } else {
            write_or_decay(tx, &source)?;
            let mut dest = tx
                .get_rollup(req.date, &req.currency)?
                .unwrap_or_else(|| rollup::blank_rollup(req.date, &req.currency));
            rollup::apply_delta(&mut dest, req.kind, &req.category, req.amount, Sign::Plus);
            write_or_decay(tx, &dest)?;
        }

        let updated = TransactionRecord {
            id: old.id,
            user_id: old.user_id,
            kind: req.kind,
            category: req.category.clone(),
            amount: req.amount,
            currency: req.currency.clone(),
            date: req.date,
            description: req.description.clone(),
        };
        tx.put_transaction(&updated)
    })
}

/// Remove a transaction and back its contribution out of its rollup.
pub fn delete_transaction(
    store: &mut dyn LedgerStore,
    req: &DeleteTransaction,
) -> Result<(), LedgerError> {
    if req.user_id.trim().is_empty() {
        return Err(LedgerError::InvalidRequest(
            "User ID is required!".to_string(),
        ));
    }
    if req.id.trim().is_empty() {
        return Err(LedgerError::InvalidRequest(
            "Transaction id is required!".to_string(),
        ));
    }

    store.atomically(&req.user_id, &mut |tx| {
        let record = tx
            .get_transaction(&req.id)?
            .ok_or_else(|| LedgerError::NotFound(format!("transaction {}", req.id)))?;
        let mut rollup = tx.get_rollup(record.date, &record.currency)?.ok_or_else(|| {
            LedgerError::NotFound(format!(
                "rollup {}_{} for transaction {}",
                record.date, record.currency, record.id
            ))
        })?;
        rollup::apply_delta(
            &mut rollup,
            record.kind,
            &record.category,
            record.amount,
            Sign::Minus,
        );
        write_or_decay(tx, &rollup)?;
        tx.delete_transaction(&record.id)
    })
}

/// Upsert the rollup, unless it has decayed to all-zero: an all-zero rollup
/// is deleted, its absence meaning "no activity".
fn write_or_decay(tx: &mut dyn LedgerTx, rollup: &DailyRollup) -> Result<(), LedgerError> {
    if rollup::is_zeroed(rollup) {
        tx.delete_rollup(rollup.date, &rollup.currency)
    } else {
        tx.put_rollup(rollup)
    }
}

fn validate_fields(
    user_id: &str,
    kind: TransactionType,
    category: &str,
    amount: Decimal,
    currency: &str,
    date: NaiveDate,
    today: NaiveDate,
) -> Result<(), LedgerError> {
    if user_id.trim().is_empty() {
        return Err(LedgerError::InvalidRequest(
            "User ID is required!".to_string(),
        ));
    }
    if !kind.valid_category(category) {
        return Err(LedgerError::InvalidRequest(format!(
            "'{}' is not a {} category",
            category, kind
        )));
    }
    if amount < Decimal::ZERO {
        return Err(LedgerError::InvalidRequest(format!(
            "Amount must not be negative (got {})",
            amount
        )));
    }
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(LedgerError::InvalidRequest(format!(
            "Invalid currency code '{}', expected 3 uppercase letters",
            currency
        )));
    }
    if date > today {
        return Err(LedgerError::InvalidRequest(
            "Date cannot be in the future.".to_string(),
        ));
    }
    Ok(())
}
