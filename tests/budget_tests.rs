// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pocketledger::budget::{self, BudgetUpsert};
use pocketledger::error::LedgerError;
use pocketledger::models::Category;
use rusqlite::Connection;
use rust_decimal::Decimal;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    pocketledger::db::init_schema(&conn).unwrap();
    conn
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

#[test]
fn upsert_creates_then_replaces() {
    let conn = setup();

    let out = budget::upsert(&conn, "u1", "2024-03", Category::Food, dec("250")).unwrap();
    match out {
        BudgetUpsert::Set(b) => {
            assert_eq!(b.month, "2024-03");
            assert_eq!(b.category, Category::Food);
            assert_eq!(b.limit_amount, dec("250"));
        }
        BudgetUpsert::Removed => panic!("expected a stored budget"),
    }

    // Same key again: replaced, not duplicated.
    budget::upsert(&conn, "u1", "2024-03", Category::Food, dec("300")).unwrap();
    let items = budget::list(&conn, "u1", Some("2024-03")).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].limit_amount, dec("300"));
}

#[test]
fn zero_limit_is_a_tombstone() {
    let conn = setup();
    budget::upsert(&conn, "u1", "2024-03", Category::Food, dec("250")).unwrap();

    let out = budget::upsert(&conn, "u1", "2024-03", Category::Food, Decimal::ZERO).unwrap();
    assert!(matches!(out, BudgetUpsert::Removed));
    assert!(budget::list(&conn, "u1", Some("2024-03")).unwrap().is_empty());

    // Clearing an absent row is still a removal, for idempotent callers.
    let out = budget::upsert(&conn, "u1", "2024-03", Category::Food, Decimal::ZERO).unwrap();
    assert!(matches!(out, BudgetUpsert::Removed));
}

#[test]
fn list_is_scoped_and_ordered() {
    let conn = setup();
    budget::upsert(&conn, "u1", "2024-03", Category::Travel, dec("80")).unwrap();
    budget::upsert(&conn, "u1", "2024-03", Category::Food, dec("250")).unwrap();
    budget::upsert(&conn, "u1", "2024-04", Category::Food, dec("200")).unwrap();
    budget::upsert(&conn, "someone-else", "2024-03", Category::Food, dec("99")).unwrap();

    let all = budget::list(&conn, "u1", None).unwrap();
    assert_eq!(all.len(), 3);
    // Months newest first, categories alphabetical within a month.
    assert_eq!(all[0].month, "2024-04");
    assert_eq!(all[1].category, Category::Food);
    assert_eq!(all[2].category, Category::Travel);

    let march = budget::list(&conn, "u1", Some("2024-03")).unwrap();
    assert_eq!(march.len(), 2);
}

#[test]
fn rejects_malformed_month_and_negative_limit() {
    let conn = setup();

    for month in ["2024-3", "202403", "2024-13", "march"] {
        let err = budget::upsert(&conn, "u1", month, Category::Food, dec("10")).unwrap_err();
        assert!(matches!(err, LedgerError::Validation { field: "month", .. }));
    }

    let err = budget::upsert(&conn, "u1", "2024-03", Category::Food, dec("-1")).unwrap_err();
    assert!(matches!(err, LedgerError::Validation { field: "limit", .. }));

    let err = budget::list(&conn, "u1", Some("2024-3")).unwrap_err();
    assert!(matches!(err, LedgerError::Validation { field: "month", .. }));
}
