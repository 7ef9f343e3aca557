// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;

use crate::ledger::{Page, TxFilter, TxUpdate};
use crate::models::Transaction;
use crate::utils::{self, maybe_print_json, parse_date, parse_decimal, pretty_table};
use crate::wallet;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn list(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = sub.get_one::<String>("user").unwrap();
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");

    let mut filter = TxFilter::default();
    if let Some(t) = sub.get_one::<String>("type") {
        filter.direction = Some(t.trim().parse()?);
    }
    if let Some(c) = sub.get_one::<String>("category") {
        filter.category = Some(c.trim().parse()?);
    }
    if let Some(m) = sub.get_one::<String>("month") {
        filter.month = Some(m.trim().to_string());
    }
    if let Some(d) = sub.get_one::<String>("from") {
        filter.start_date = Some(parse_date(d)?);
    }
    if let Some(d) = sub.get_one::<String>("to") {
        filter.end_date = Some(parse_date(d)?);
    }
    if let Some(s) = sub.get_one::<String>("search") {
        filter.search = Some(s.to_string());
    }

    let mut page = Page::default();
    if let Some(p) = sub.get_one::<String>("page") {
        page.page = p.trim().parse()?;
    }
    if let Some(l) = sub.get_one::<String>("limit") {
        page.limit = l.trim().parse()?;
    }

    let (items, total) =
        wallet::list_transactions(conn, user, &filter, page, Utc::now().naive_utc())?;

    if !maybe_print_json(json_flag, jsonl_flag, &items)? {
        let rows: Vec<Vec<String>> = items.iter().map(row_cells).collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Type", "Category", "Amount", "Balance", "Description", "Source"],
                rows,
            )
        );
        println!("{} of {} transaction(s)", items.len(), total);
    }
    Ok(())
}

fn row_cells(t: &Transaction) -> Vec<String> {
    vec![
        t.id.to_string(),
        utils::fmt_ts(t.occurred_at),
        t.direction.to_string(),
        t.category.to_string(),
        t.amount.to_string(),
        t.balance_after.to_string(),
        t.description.clone(),
        t.recurring_source_id
            .map(|id| format!("rule {}", id))
            .unwrap_or_default(),
    ]
}

fn edit(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = sub.get_one::<String>("user").unwrap();
    let id: i64 = sub.get_one::<String>("id").unwrap().trim().parse()?;

    let mut update = TxUpdate::default();
    if let Some(t) = sub.get_one::<String>("type") {
        update.direction = Some(t.trim().parse()?);
    }
    if let Some(a) = sub.get_one::<String>("amount") {
        update.amount = Some(parse_decimal(a)?);
    }
    if let Some(c) = sub.get_one::<String>("category") {
        update.category = Some(c.trim().parse()?);
    }
    if let Some(d) = sub.get_one::<String>("description") {
        update.description = Some(d.to_string());
    }
    if let Some(d) = sub.get_one::<String>("date") {
        update.occurred_at = Some(utils::parse_ts(d)?);
    }

    let (balance, tx) =
        wallet::edit_transaction(conn, user, id, &update, Utc::now().naive_utc())?;
    println!("Updated transaction {} (balance: {})", tx.id, balance);
    Ok(())
}

fn rm(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = sub.get_one::<String>("user").unwrap();
    let id: i64 = sub.get_one::<String>("id").unwrap().trim().parse()?;
    let balance = wallet::delete_transaction(conn, user, id, Utc::now().naive_utc())?;
    println!("Deleted transaction {} (balance: {})", id, balance);
    Ok(())
}
