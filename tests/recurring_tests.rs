// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDateTime;
use pocketledger::error::LedgerError;
use pocketledger::models::{Category, Direction, Frequency};
use pocketledger::recurring::{self, NewRule, RuleUpdate, MAX_CATCH_UP_ITERATIONS};
use pocketledger::wallet;
use rusqlite::Connection;
use rust_decimal::Decimal;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    pocketledger::db::init_schema(&conn).unwrap();
    conn
}

fn ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn new_rule(direction: Direction, amount: &str, frequency: Frequency, next_run: &str) -> NewRule {
    NewRule {
        title: "Subscription".to_string(),
        amount: dec(amount),
        direction,
        category: Category::Bills,
        description: String::new(),
        frequency,
        next_run_at: Some(ts(next_run)),
    }
}

#[test]
fn overdue_daily_debit_materializes_and_skips_when_broke() {
    let mut conn = setup();
    wallet::credit(&mut conn, "u1", dec("25"), None, None, ts("2024-03-01 09:00:00")).unwrap();
    let rule = recurring::create_rule(
        &conn,
        "u1",
        &new_rule(Direction::Debit, "10", Frequency::Daily, "2024-03-07 18:00:00"),
        ts("2024-03-05 09:00:00"),
    )
    .unwrap();

    // Three occurrences are due; the third finds only 5 available and is
    // dropped, but the schedule still advances past it.
    let now = ts("2024-03-10 12:00:00");
    let balance = wallet::get_balance(&mut conn, "u1", now).unwrap();
    assert_eq!(balance, dec("5"));

    let spawned: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM transactions WHERE recurring_source_id=?1",
            [rule.id],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(spawned, 2);

    let reloaded = recurring::get_rule(&conn, "u1", rule.id).unwrap();
    assert_eq!(reloaded.next_run_at, ts("2024-03-10 18:00:00"));
}

#[test]
fn materialize_is_idempotent_with_no_elapsed_time() {
    let mut conn = setup();
    wallet::credit(&mut conn, "u1", dec("25"), None, None, ts("2024-03-01 09:00:00")).unwrap();
    recurring::create_rule(
        &conn,
        "u1",
        &new_rule(Direction::Debit, "10", Frequency::Daily, "2024-03-07 18:00:00"),
        ts("2024-03-05 09:00:00"),
    )
    .unwrap();

    let now = ts("2024-03-10 12:00:00");
    let first = wallet::get_balance(&mut conn, "u1", now).unwrap();
    let count_after_first: i64 = conn
        .query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
        .unwrap();

    let second = wallet::get_balance(&mut conn, "u1", now).unwrap();
    let count_after_second: i64 = conn
        .query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(count_after_first, count_after_second);
}

#[test]
fn spawned_transactions_carry_rule_metadata() {
    let mut conn = setup();
    let mut rule = new_rule(Direction::Credit, "100", Frequency::Weekly, "2024-03-01 00:00:00");
    rule.title = "Paycheck".to_string();
    let rule = recurring::create_rule(&conn, "u1", &rule, ts("2024-02-01 00:00:00")).unwrap();

    let now = ts("2024-03-02 08:00:00");
    wallet::get_balance(&mut conn, "u1", now).unwrap();

    let (occurred_at, description, source): (String, String, i64) = conn
        .query_row(
            "SELECT occurred_at, description, recurring_source_id FROM transactions",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .unwrap();
    // Entries are stamped "now", not the theoretical due time.
    assert_eq!(occurred_at, "2024-03-02 08:00:00");
    assert_eq!(description, "Recurring: Paycheck");
    assert_eq!(source, rule.id);
}

#[test]
fn monthly_rule_advances_from_prior_due_date_without_drift() {
    let mut conn = setup();
    let rule = recurring::create_rule(
        &conn,
        "u1",
        &new_rule(Direction::Credit, "10", Frequency::Monthly, "2024-01-31 00:00:00"),
        ts("2024-01-01 00:00:00"),
    )
    .unwrap();

    // Materialized well after the due date: the next due comes from the
    // rule's own Jan 31 value, clamped into February, not from "now".
    wallet::get_balance(&mut conn, "u1", ts("2024-02-10 12:00:00")).unwrap();
    let reloaded = recurring::get_rule(&conn, "u1", rule.id).unwrap();
    assert_eq!(reloaded.next_run_at, ts("2024-02-29 00:00:00"));

    assert_eq!(
        Frequency::Monthly.step(ts("2025-01-31 00:00:00")),
        ts("2025-02-28 00:00:00")
    );
    assert_eq!(
        Frequency::Weekly.step(ts("2024-03-01 06:30:00")),
        ts("2024-03-08 06:30:00")
    );
}

#[test]
fn catch_up_is_capped_per_invocation() {
    let mut conn = setup();
    let rule = recurring::create_rule(
        &conn,
        "u1",
        &new_rule(Direction::Credit, "1", Frequency::Daily, "2024-01-01 00:00:00"),
        ts("2024-01-01 00:00:00"),
    )
    .unwrap();

    // 100 days overdue, but one invocation only works off 36 occurrences;
    // the rest stay pending for the next invocation.
    let balance = wallet::get_balance(&mut conn, "u1", ts("2024-04-10 00:00:00")).unwrap();
    assert_eq!(balance, Decimal::from(MAX_CATCH_UP_ITERATIONS));

    let reloaded = recurring::get_rule(&conn, "u1", rule.id).unwrap();
    assert_eq!(reloaded.next_run_at, ts("2024-02-06 00:00:00"));
}

#[test]
fn inactive_rules_are_never_materialized() {
    let mut conn = setup();
    let rule = recurring::create_rule(
        &conn,
        "u1",
        &new_rule(Direction::Credit, "10", Frequency::Daily, "2024-03-01 00:00:00"),
        ts("2024-03-01 00:00:00"),
    )
    .unwrap();
    recurring::update_rule(
        &conn,
        "u1",
        rule.id,
        &RuleUpdate {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .unwrap();

    let balance = wallet::get_balance(&mut conn, "u1", ts("2024-03-20 00:00:00")).unwrap();
    assert_eq!(balance, Decimal::ZERO);
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn deleting_a_rule_keeps_its_transactions() {
    let mut conn = setup();
    let rule = recurring::create_rule(
        &conn,
        "u1",
        &new_rule(Direction::Credit, "10", Frequency::Daily, "2024-03-01 00:00:00"),
        ts("2024-03-01 00:00:00"),
    )
    .unwrap();
    wallet::get_balance(&mut conn, "u1", ts("2024-03-01 06:00:00")).unwrap();
    recurring::delete_rule(&conn, "u1", rule.id).unwrap();

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 1);
    assert_eq!(
        wallet::get_balance(&mut conn, "u1", ts("2024-03-01 07:00:00")).unwrap(),
        dec("10")
    );
}

#[test]
fn rule_crud_validates_and_scopes_by_user() {
    let conn = setup();
    let now = ts("2024-03-01 00:00:00");

    let mut bad = new_rule(Direction::Credit, "10", Frequency::Daily, "2024-03-01 00:00:00");
    bad.title = "  ".to_string();
    let err = recurring::create_rule(&conn, "u1", &bad, now).unwrap_err();
    assert!(matches!(err, LedgerError::Validation { field: "title", .. }));

    let err = recurring::create_rule(
        &conn,
        "u1",
        &new_rule(Direction::Credit, "0", Frequency::Daily, "2024-03-01 00:00:00"),
        now,
    )
    .unwrap_err();
    assert!(matches!(err, LedgerError::Validation { field: "amount", .. }));

    let rule = recurring::create_rule(
        &conn,
        "u1",
        &new_rule(Direction::Debit, "10", Frequency::Weekly, "2024-03-01 00:00:00"),
        now,
    )
    .unwrap();

    // Another user cannot see or touch it.
    assert!(matches!(
        recurring::get_rule(&conn, "u2", rule.id).unwrap_err(),
        LedgerError::NotFound { .. }
    ));
    assert!(matches!(
        recurring::delete_rule(&conn, "u2", rule.id).unwrap_err(),
        LedgerError::NotFound { .. }
    ));

    let err = recurring::update_rule(
        &conn,
        "u1",
        rule.id,
        &RuleUpdate {
            amount: Some(dec("-1")),
            ..Default::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, LedgerError::Validation { field: "amount", .. }));

    let updated = recurring::update_rule(
        &conn,
        "u1",
        rule.id,
        &RuleUpdate {
            frequency: Some(Frequency::Monthly),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(updated.frequency, Frequency::Monthly);
    assert_eq!(updated.amount, dec("10"));

    let listed = recurring::list_rules(&conn, "u1").unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].frequency, Frequency::Monthly);
}
