// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::eraser;
use crate::models::EraseRequest;
use crate::store::SqliteStore;
use crate::utils::{maybe_print_json, parse_date};

pub fn handle(store: &mut SqliteStore, m: &clap::ArgMatches) -> Result<()> {
    let json_flag = m.get_flag("json");
    let jsonl_flag = m.get_flag("jsonl");
    let req = EraseRequest {
        user_id: m.get_one::<String>("user").unwrap().trim().to_string(),
        start_date: parse_date(m.get_one::<String>("from").unwrap().trim())?,
        end_date: parse_date(m.get_one::<String>("to").unwrap().trim())?,
    };

    let outcome = eraser::delete_range(store, &req).map_err(super::to_cli)?;
    if maybe_print_json(json_flag, jsonl_flag, &outcome)? {
        return Ok(());
    }

    if outcome.transactions_deleted == 0 && outcome.rollups_deleted == 0 {
        println!("Nothing to delete in {}..{}", req.start_date, req.end_date);
    } else {
        println!(
            "Deleted {} transactions and {} rollups in {} batches",
            outcome.transactions_deleted, outcome.rollups_deleted, outcome.batches
        );
    }
    Ok(())
}
