// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::{NaiveDate, Utc};

use crate::reconcile::{self, RollupDrift};
use crate::store::SqliteStore;
use crate::utils::{parse_date, pretty_table};

pub fn handle(store: &SqliteStore, m: &clap::ArgMatches) -> Result<()> {
    let user = m.get_one::<String>("user").unwrap().trim().to_string();
    let from = match m.get_one::<String>("from") {
        Some(s) => parse_date(s.trim())?,
        None => NaiveDate::from_ymd_opt(1970, 1, 1).unwrap(),
    };
    let to = match m.get_one::<String>("to") {
        Some(s) => parse_date(s.trim())?,
        None => Utc::now().date_naive(),
    };

    let drifts = reconcile::audit_rollups(store, &user, from, to).map_err(super::to_cli)?;
    if drifts.is_empty() {
        println!("doctor: rollups match the transaction log");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = drifts
        .iter()
        .map(|d| {
            let (issue, detail) = match d {
                RollupDrift::Missing { expected } => (
                    "missing_rollup",
                    format!(
                        "expected income {} / expense {}",
                        expected.total_income, expected.total_expense
                    ),
                ),
                RollupDrift::Orphaned { stored } => (
                    "orphaned_rollup",
                    format!(
                        "stored income {} / expense {} but no transactions",
                        stored.total_income, stored.total_expense
                    ),
                ),
                RollupDrift::Mismatched { stored, expected } => (
                    "rollup_mismatch",
                    format!(
                        "stored income {} / expense {}, replay says income {} / expense {}",
                        stored.total_income,
                        stored.total_expense,
                        expected.total_income,
                        expected.total_expense
                    ),
                ),
            };
            vec![issue.to_string(), d.doc_key(), detail]
        })
        .collect();
    println!("{}", pretty_table(&["Issue", "Rollup", "Detail"], rows));
    Ok(())
}
