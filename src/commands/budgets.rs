// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use crate::budget::{self, BudgetUpsert};
use crate::utils::{maybe_print_json, parse_decimal, pretty_table};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn set(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = sub.get_one::<String>("user").unwrap();
    let month = sub.get_one::<String>("month").unwrap().trim();
    let category = sub.get_one::<String>("category").unwrap().trim().parse()?;
    let limit = parse_decimal(sub.get_one::<String>("limit").unwrap())?;

    match budget::upsert(conn, user, month, category, limit)? {
        BudgetUpsert::Set(item) => {
            println!(
                "Budget set for {} / {} / {} = {}",
                user, item.month, item.category, item.limit_amount
            );
        }
        BudgetUpsert::Removed => {
            println!("Budget removed for {} / {} / {}", user, month, category);
        }
    }
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = sub.get_one::<String>("user").unwrap();
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let month = sub.get_one::<String>("month").map(|s| s.trim());

    let items = budget::list(conn, user, month)?;
    if !maybe_print_json(json_flag, jsonl_flag, &items)? {
        let rows: Vec<Vec<String>> = items
            .iter()
            .map(|b| {
                vec![
                    b.month.clone(),
                    b.category.to_string(),
                    b.limit_amount.to_string(),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Month", "Category", "Limit"], rows));
    }
    Ok(())
}
