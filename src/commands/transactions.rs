// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::{NaiveDate, Utc};

use crate::models::{AddTransaction, DeleteTransaction, ListRequest, UpdateTransaction};
use crate::mutations;
use crate::query;
use crate::store::SqliteStore;
use crate::utils::{fmt_money, maybe_print_json, parse_date, parse_decimal, pretty_table};

pub fn handle(store: &mut SqliteStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, sub)?,
        Some(("update", sub)) => update(store, sub)?,
        Some(("delete", sub)) => delete(store, sub)?,
        Some(("list", sub)) => list(store, sub)?,
        _ => {}
    }
    Ok(())
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn add(store: &mut SqliteStore, sub: &clap::ArgMatches) -> Result<()> {
    let date = match sub.get_one::<String>("date") {
        Some(s) => parse_date(s.trim())?,
        None => today(),
    };
    let req = AddTransaction {
        user_id: sub.get_one::<String>("user").unwrap().trim().to_string(),
        kind: sub
            .get_one::<String>("type")
            .unwrap()
            .trim()
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?,
        category: sub.get_one::<String>("category").unwrap().trim().to_lowercase(),
        amount: parse_decimal(sub.get_one::<String>("amount").unwrap().trim())?,
        currency: sub.get_one::<String>("currency").unwrap().trim().to_uppercase(),
        date,
        description: sub.get_one::<String>("description").map(|s| s.to_string()),
    };

    let id = mutations::add_transaction(store, &req, today()).map_err(super::to_cli)?;
    println!(
        "Recorded {} {} '{}' on {} (id: {})",
        req.kind,
        fmt_money(&req.amount, &req.currency),
        req.category,
        req.date,
        id
    );
    Ok(())
}

fn update(store: &mut SqliteStore, sub: &clap::ArgMatches) -> Result<()> {
    let date = match sub.get_one::<String>("date") {
        Some(s) => parse_date(s.trim())?,
        None => today(),
    };
    let req = UpdateTransaction {
        user_id: sub.get_one::<String>("user").unwrap().trim().to_string(),
        id: sub.get_one::<String>("id").unwrap().trim().to_string(),
        kind: sub
            .get_one::<String>("type")
            .unwrap()
            .trim()
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?,
        category: sub.get_one::<String>("category").unwrap().trim().to_lowercase(),
        amount: parse_decimal(sub.get_one::<String>("amount").unwrap().trim())?,
        currency: sub.get_one::<String>("currency").unwrap().trim().to_uppercase(),
        date,
        description: sub.get_one::<String>("description").map(|s| s.to_string()),
    };

    mutations::update_transaction(store, &req, today()).map_err(super::to_cli)?;
    println!("Updated transaction {}", req.id);
    Ok(())
}

fn delete(store: &mut SqliteStore, sub: &clap::ArgMatches) -> Result<()> {
    let req = DeleteTransaction {
        user_id: sub.get_one::<String>("user").unwrap().trim().to_string(),
        id: sub.get_one::<String>("id").unwrap().trim().to_string(),
    };
    mutations::delete_transaction(store, &req).map_err(super::to_cli)?;
    println!("Deleted transaction {}", req.id);
    Ok(())
}

/// Build a `ListRequest` from parsed CLI matches. Separate from `list` so
/// tests can drive it without printing.
pub fn list_request(sub: &clap::ArgMatches) -> Result<ListRequest> {
    let mut req = ListRequest::for_user(sub.get_one::<String>("user").unwrap().trim());
    req.currency = sub
        .get_one::<String>("currency")
        .map(|s| s.trim().to_uppercase());
    req.kind = match sub.get_one::<String>("type") {
        Some(s) => Some(s.trim().parse().map_err(|e: String| anyhow::anyhow!(e))?),
        None => None,
    };
    req.category = sub
        .get_one::<String>("category")
        .map(|s| s.trim().to_lowercase());
    req.start_date = match sub.get_one::<String>("from") {
        Some(s) => Some(parse_date(s.trim())?),
        None => None,
    };
    req.end_date = match sub.get_one::<String>("to") {
        Some(s) => Some(parse_date(s.trim())?),
        None => None,
    };
    req.limit = *sub.get_one::<usize>("limit").unwrap_or(&req.limit);
    req.cursor = sub.get_one::<String>("cursor").map(|s| s.trim().to_string());
    Ok(req)
}

fn list(store: &mut SqliteStore, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let req = list_request(sub)?;

    let page = query::list_transactions(store, &req, today()).map_err(super::to_cli)?;
    if maybe_print_json(json_flag, jsonl_flag, &page)? {
        return Ok(());
    }

    let rows: Vec<Vec<String>> = page
        .transactions
        .iter()
        .map(|t| {
            vec![
                t.id.clone(),
                t.date.to_string(),
                t.kind.to_string(),
                t.category.clone(),
                t.amount.to_string(),
                t.currency.clone(),
                t.description.clone().unwrap_or_default(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Id", "Date", "Type", "Category", "Amount", "CCY", "Description"],
            rows,
        )
    );

    let totals = &page.totals;
    let mut trows = vec![
        vec!["Income".to_string(), totals.total_income.to_string()],
        vec!["Expense".to_string(), totals.total_expense.to_string()],
    ];
    for (cat, amt) in &totals.income_by_category {
        trows.push(vec![format!("Income/{}", cat), amt.to_string()]);
    }
    for (cat, amt) in &totals.expense_by_category {
        trows.push(vec![format!("Expense/{}", cat), amt.to_string()]);
    }
    println!(
        "{}",
        pretty_table(&["Totals", &format!("Amount ({})", totals.currency)], trows)
    );

    if page.has_more {
        if let Some(cursor) = &page.last_doc {
            println!("More results available; resume with --cursor {}", cursor);
        }
    }
    Ok(())
}
