// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use daybook::models::{AddTransaction, TransactionType};
use daybook::mutations::add_transaction;
use daybook::reconcile::{RollupDrift, audit_rollups};
use daybook::store::{DocRef, LedgerStore, SqliteStore};
use rust_decimal::Decimal;

fn d(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn today() -> NaiveDate {
    d("2024-06-15")
}

fn setup() -> SqliteStore {
    SqliteStore::open_in_memory().unwrap()
}

fn add(store: &mut SqliteStore, category: &str, amount: &str, date: &str) -> String {
    add_transaction(
        store,
        &AddTransaction {
            user_id: "u1".to_string(),
            kind: TransactionType::Expense,
            category: category.to_string(),
            amount: dec(amount),
            currency: "THB".to_string(),
            date: d(date),
            description: None,
        },
        today(),
    )
    .unwrap()
}

#[test]
fn clean_ledger_audits_clean() {
    let mut store = setup();
    add(&mut store, "food", "10", "2024-01-05");
    add(&mut store, "health", "20", "2024-01-06");

    let drifts = audit_rollups(&store, "u1", d("2024-01-01"), d("2024-01-31")).unwrap();
    assert!(drifts.is_empty(), "{:?}", drifts);
}

#[test]
fn missing_rollup_is_reported() {
    let mut store = setup();
    add(&mut store, "food", "10", "2024-01-05");
    store
        .delete_batch("u1", &[DocRef::Rollup(d("2024-01-05"), "THB".to_string())])
        .unwrap();

    let drifts = audit_rollups(&store, "u1", d("2024-01-01"), d("2024-01-31")).unwrap();
    assert_eq!(drifts.len(), 1);
    match &drifts[0] {
        RollupDrift::Missing { expected } => {
            assert_eq!(expected.total_expense, dec("10"));
            assert_eq!(expected.doc_key(), "2024-01-05_THB");
        }
        other => panic!("expected Missing, got {:?}", other),
    }
}

#[test]
fn orphaned_rollup_is_reported() {
    let mut store = setup();
    let id = add(&mut store, "food", "10", "2024-01-05");
    store.delete_batch("u1", &[DocRef::Transaction(id)]).unwrap();

    let drifts = audit_rollups(&store, "u1", d("2024-01-01"), d("2024-01-31")).unwrap();
    assert_eq!(drifts.len(), 1);
    assert!(matches!(drifts[0], RollupDrift::Orphaned { .. }), "{:?}", drifts);
}

#[test]
fn partial_log_loss_shows_as_mismatch() {
    let mut store = setup();
    let id = add(&mut store, "food", "10", "2024-01-05");
    add(&mut store, "health", "20", "2024-01-05");
    // Drop one record behind the engine's back; the rollup still counts it.
    store.delete_batch("u1", &[DocRef::Transaction(id)]).unwrap();

    let drifts = audit_rollups(&store, "u1", d("2024-01-01"), d("2024-01-31")).unwrap();
    assert_eq!(drifts.len(), 1);
    match &drifts[0] {
        RollupDrift::Mismatched { stored, expected } => {
            assert_eq!(stored.total_expense, dec("30"));
            assert_eq!(expected.total_expense, dec("20"));
        }
        other => panic!("expected Mismatched, got {:?}", other),
    }
}

#[test]
fn audit_scopes_to_window_and_user() {
    let mut store = setup();
    add(&mut store, "food", "10", "2024-01-05");
    store
        .delete_batch("u1", &[DocRef::Rollup(d("2024-01-05"), "THB".to_string())])
        .unwrap();

    // Outside the damaged window: clean.
    let drifts = audit_rollups(&store, "u1", d("2024-02-01"), d("2024-02-29")).unwrap();
    assert!(drifts.is_empty());
    // Another user: clean.
    let drifts = audit_rollups(&store, "u2", d("2024-01-01"), d("2024-01-31")).unwrap();
    assert!(drifts.is_empty());
}
