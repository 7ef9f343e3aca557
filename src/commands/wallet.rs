// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;

use crate::models::Direction;
use crate::utils::{parse_decimal, pretty_table};
use crate::wallet;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("balance", sub)) => balance(conn, sub)?,
        Some(("credit", sub)) => apply(conn, sub, Direction::Credit)?,
        Some(("debit", sub)) => apply(conn, sub, Direction::Debit)?,
        _ => {}
    }
    Ok(())
}

fn balance(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = sub.get_one::<String>("user").unwrap();
    let balance = wallet::get_balance(conn, user, Utc::now().naive_utc())?;
    println!("Balance for {}: {}", user, balance);
    Ok(())
}

fn apply(conn: &mut Connection, sub: &clap::ArgMatches, direction: Direction) -> Result<()> {
    let user = sub.get_one::<String>("user").unwrap();
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let description = sub.get_one::<String>("description").map(|s| s.as_str());
    let category = sub.get_one::<String>("category").map(|s| s.as_str());
    let now = Utc::now().naive_utc();

    let (balance, tx) = match direction {
        Direction::Credit => wallet::credit(conn, user, amount, description, category, now)?,
        Direction::Debit => wallet::debit(conn, user, amount, description, category, now)?,
    };

    println!("{} {} for {} (balance: {})", direction, amount, user, balance);
    println!(
        "{}",
        pretty_table(
            &["ID", "Date", "Type", "Category", "Amount", "Balance", "Description"],
            vec![vec![
                tx.id.to_string(),
                crate::utils::fmt_ts(tx.occurred_at),
                tx.direction.to_string(),
                tx.category.to_string(),
                tx.amount.to_string(),
                tx.balance_after.to_string(),
                tx.description,
            ]],
        )
    );
    Ok(())
}
