// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pocketledger::{cli, commands};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    pocketledger::db::init_schema(&conn).unwrap();
    conn
}

#[test]
fn wallet_credit_via_cli_records_a_transaction() {
    let mut conn = setup();
    let cli = cli::build_cli();
    let matches = cli.get_matches_from([
        "pocketledger",
        "wallet",
        "credit",
        "--user",
        "u1",
        "--amount",
        "25.50",
        "--category",
        "salary",
    ]);

    if let Some(("wallet", wallet_m)) = matches.subcommand() {
        commands::wallet::handle(&mut conn, wallet_m).unwrap();
    } else {
        panic!("wallet command not parsed");
    }

    let (amount, category, balance): (String, String, String) = conn
        .query_row(
            "SELECT amount, category, balance_after FROM transactions WHERE user_id='u1'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .unwrap();
    assert_eq!(amount.parse::<Decimal>().unwrap(), "25.50".parse().unwrap());
    assert_eq!(category, "salary");
    assert_eq!(balance.parse::<Decimal>().unwrap(), "25.50".parse().unwrap());
}

#[test]
fn tx_list_rejects_unknown_type_filter() {
    let mut conn = setup();
    let cli = cli::build_cli();
    let matches = cli.get_matches_from([
        "pocketledger",
        "tx",
        "list",
        "--user",
        "u1",
        "--type",
        "transfer",
    ]);

    if let Some(("tx", tx_m)) = matches.subcommand() {
        let err = commands::transactions::handle(&mut conn, tx_m).unwrap_err();
        assert!(err.to_string().contains("invalid type"));
    } else {
        panic!("tx command not parsed");
    }
}

#[test]
fn budget_set_trims_and_validates_arguments() {
    let conn = setup();
    let cli = cli::build_cli();
    let matches = cli.get_matches_from([
        "pocketledger",
        "budget",
        "set",
        "--user",
        "u1",
        "--month",
        " 2024-03 ",
        "--category",
        "food",
        "--limit",
        " 120 ",
    ]);

    if let Some(("budget", budget_m)) = matches.subcommand() {
        commands::budgets::handle(&conn, budget_m).unwrap();
    } else {
        panic!("budget command not parsed");
    }

    let limit: String = conn
        .query_row(
            "SELECT limit_amount FROM budgets WHERE user_id='u1' AND month='2024-03'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(limit.parse::<Decimal>().unwrap(), "120".parse().unwrap());
}

#[test]
fn recurring_edit_rejects_bad_active_flag() {
    let conn = setup();
    conn.execute(
        "INSERT INTO recurring_rules(user_id, title, amount, direction, category, description, \
         frequency, next_run_at, is_active) \
         VALUES ('u1','Rent','900','debit','rent','','monthly','2024-04-01 00:00:00',1)",
        [],
    )
    .unwrap();

    let cli = cli::build_cli();
    let matches = cli.get_matches_from([
        "pocketledger",
        "recurring",
        "edit",
        "--user",
        "u1",
        "--id",
        "1",
        "--active",
        "maybe",
    ]);

    if let Some(("recurring", recurring_m)) = matches.subcommand() {
        let err = commands::recurring::handle(&conn, recurring_m).unwrap_err();
        assert!(err.to_string().contains("--active"));
    } else {
        panic!("recurring command not parsed");
    }
}
