// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use daybook::error::LedgerError;
use daybook::models::{AddTransaction, TransactionType};
use daybook::mutations::add_transaction;
use daybook::store::{LedgerStore, SqliteStore, TransactionQuery};
use rust_decimal::Decimal;

fn d(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn today() -> NaiveDate {
    d("2024-06-15")
}

fn add(store: &mut SqliteStore, amount: &str, date: &str) -> String {
    add_transaction(
        store,
        &AddTransaction {
            user_id: "u1".to_string(),
            kind: TransactionType::Expense,
            category: "food".to_string(),
            amount: amount.parse().unwrap(),
            currency: "THB".to_string(),
            date: d(date),
            description: Some("persisted".to_string()),
        },
        today(),
    )
    .unwrap()
}

#[test]
fn records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("daybook.sqlite");

    let id = {
        let mut store = SqliteStore::open_at(&path).unwrap();
        add(&mut store, "42", "2024-01-05")
    };

    let store = SqliteStore::open_at(&path).unwrap();
    let record = store.find_transaction("u1", &id).unwrap().unwrap();
    assert_eq!(record.amount, Decimal::from(42));
    assert_eq!(record.description.as_deref(), Some("persisted"));
}

#[test]
fn home_currency_defaults_and_persists() {
    let store = SqliteStore::open_in_memory().unwrap();
    assert_eq!(store.home_currency().unwrap(), "THB");
    store.set_home_currency("MMK").unwrap();
    assert_eq!(store.home_currency().unwrap(), "MMK");
}

#[test]
fn atomic_op_rolls_back_on_business_error() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let id = add(&mut store, "10", "2024-01-05");

    // Delete the record mid-transaction, then fail: neither write may stick.
    let result = store.atomically("u1", &mut |tx| {
        tx.delete_transaction(&id)?;
        assert!(tx.get_transaction(&id)?.is_none(), "read-your-writes");
        Err(LedgerError::NotFound("forced abort".to_string()))
    });
    assert!(matches!(result, Err(LedgerError::NotFound(_))));
    assert!(store.find_transaction("u1", &id).unwrap().is_some());
}

#[test]
fn query_cursor_starts_strictly_after() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    add(&mut store, "1", "2024-01-03");
    add(&mut store, "2", "2024-01-04");
    add(&mut store, "3", "2024-01-05");

    let mut query = TransactionQuery::window(d("2024-01-01"), d("2024-01-31"));
    query.limit = Some(1);
    let first = store.query_transactions("u1", &query).unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].date, d("2024-01-05"));

    query.start_after = Some((first[0].date, first[0].id.clone()));
    query.limit = None;
    let rest = store.query_transactions("u1", &query).unwrap();
    assert_eq!(rest.len(), 2);
    assert!(rest.iter().all(|r| r.id != first[0].id));
    assert_eq!(rest[0].date, d("2024-01-04"));
}
