// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Rollup audit: recompute every partition's rollup in a window by replaying
//! its transactions, and report where the stored rollups disagree. The
//! incremental deltas floor at zero instead of proving consistency, so this
//! is the path for catching silent under-counting. Read-only.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::LedgerError;
use crate::models::DailyRollup;
use crate::rollup::{self, Sign};
use crate::store::{LedgerStore, RollupQuery, TransactionQuery};

#[derive(Debug, Clone, PartialEq)]
pub enum RollupDrift {
    /// Transactions exist in the partition but no rollup is stored.
    Missing { expected: DailyRollup },
    /// A rollup is stored for a partition with no transactions.
    Orphaned { stored: DailyRollup },
    /// Stored and replayed rollups disagree.
    Mismatched {
        stored: DailyRollup,
        expected: DailyRollup,
    },
}

impl RollupDrift {
    pub fn doc_key(&self) -> String {
        match self {
            RollupDrift::Missing { expected } => expected.doc_key(),
            RollupDrift::Orphaned { stored } => stored.doc_key(),
            RollupDrift::Mismatched { stored, .. } => stored.doc_key(),
        }
    }
}

/// Replay the window's transactions per partition and diff the result
/// against the stored rollups. An empty result means the window is clean.
pub fn audit_rollups(
    store: &dyn LedgerStore,
    user_id: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Vec<RollupDrift>, LedgerError> {
    if user_id.trim().is_empty() {
        return Err(LedgerError::InvalidRequest(
            "User ID is required!".to_string(),
        ));
    }
    if start_date > end_date {
        return Err(LedgerError::InvalidRequest(format!(
            "Start date {} is after end date {}",
            start_date, end_date
        )));
    }

    let transactions =
        store.query_transactions(user_id, &TransactionQuery::window(start_date, end_date))?;
    let stored = store.query_rollups(
        user_id,
        &RollupQuery {
            start_date,
            end_date,
            currency: None,
            positive: None,
        },
    )?;

    let mut replayed: BTreeMap<(NaiveDate, String), DailyRollup> = BTreeMap::new();
    for record in &transactions {
        let rollup = replayed
            .entry((record.date, record.currency.clone()))
            .or_insert_with(|| rollup::blank_rollup(record.date, &record.currency));
        rollup::apply_delta(rollup, record.kind, &record.category, record.amount, Sign::Plus);
    }
    // Zero-amount transactions replay to an all-zero rollup, which the
    // engine never persists.
    replayed.retain(|_, rollup| !rollup::is_zeroed(rollup));

    let mut drifts = Vec::new();
    for rollup in stored {
        let key = (rollup.date, rollup.currency.clone());
        match replayed.remove(&key) {
            None => drifts.push(RollupDrift::Orphaned { stored: rollup }),
            Some(expected) if expected != rollup => drifts.push(RollupDrift::Mismatched {
                stored: rollup,
                expected,
            }),
            Some(_) => {}
        }
    }
    for (_, expected) in replayed {
        drifts.push(RollupDrift::Missing { expected });
    }

    Ok(drifts)
}
