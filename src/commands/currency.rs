// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::store::{LedgerStore, SqliteStore};

pub fn handle(store: &SqliteStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => {
            let code = sub.get_one::<String>("code").unwrap().trim().to_uppercase();
            store.set_home_currency(&code)?;
            println!("Home currency set to {}", code);
        }
        Some(("show", _)) | None => {
            println!("Home currency: {}", store.home_currency()?);
        }
        _ => {}
    }
    Ok(())
}
