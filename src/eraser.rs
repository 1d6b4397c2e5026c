// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Bulk erase of a date window: every transaction and rollup whose day falls
//! inside the inclusive window is deleted, in batches capped at the store's
//! write ceiling. Each batch commits on its own, so this operation is NOT
//! all-or-nothing across the window: a mid-sequence failure leaves earlier
//! batches deleted and is reported with the progress made.

use crate::error::LedgerError;
use crate::models::{EraseOutcome, EraseRequest};
use crate::store::{DocRef, LedgerStore, RollupQuery, TransactionQuery};

pub fn delete_range(
    store: &mut dyn LedgerStore,
    req: &EraseRequest,
) -> Result<EraseOutcome, LedgerError> {
    if req.user_id.trim().is_empty() {
        return Err(LedgerError::InvalidRequest(
            "User ID is required!".to_string(),
        ));
    }
    if req.start_date > req.end_date {
        return Err(LedgerError::InvalidRequest(format!(
            "Start date {} is after end date {}",
            req.start_date, req.end_date
        )));
    }

    let transactions = store.query_transactions(
        &req.user_id,
        &TransactionQuery::window(req.start_date, req.end_date),
    )?;
    let rollups = store.query_rollups(
        &req.user_id,
        &RollupQuery {
            start_date: req.start_date,
            end_date: req.end_date,
            currency: None,
            positive: None,
        },
    )?;

    let docs: Vec<DocRef> = transactions
        .iter()
        .map(|t| DocRef::Transaction(t.id.clone()))
        .chain(
            rollups
                .iter()
                .map(|r| DocRef::Rollup(r.date, r.currency.clone())),
        )
        .collect();

    // Nothing to delete is a normal outcome, not a failure.
    if docs.is_empty() {
        return Ok(EraseOutcome::nothing());
    }

    let ceiling = store.batch_write_ceiling();
    let mut outcome = EraseOutcome::nothing();

    for batch in docs.chunks(ceiling) {
        store
            .delete_batch(&req.user_id, batch)
            .map_err(|err| LedgerError::PartialErase {
                deleted: outcome.transactions_deleted,
                message: err.to_string(),
            })?;
        outcome.batches += 1;
        for doc in batch {
            match doc {
                DocRef::Transaction(_) => outcome.transactions_deleted += 1,
                DocRef::Rollup(..) => outcome.rollups_deleted += 1,
            }
        }
        log::debug!(
            "erase batch {} committed ({} docs)",
            outcome.batches,
            batch.len()
        );
    }

    Ok(outcome)
}
