// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{anyhow, Result};
use chrono::Utc;
use rusqlite::Connection;

use crate::models::Category;
use crate::recurring::{self, NewRule, RuleUpdate};
use crate::utils::{self, maybe_print_json, parse_decimal, pretty_table};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = sub.get_one::<String>("user").unwrap();
    let next_run_at = sub
        .get_one::<String>("next-run")
        .map(|s| utils::parse_ts(s))
        .transpose()?;
    let rule = NewRule {
        title: sub.get_one::<String>("title").unwrap().to_string(),
        amount: parse_decimal(sub.get_one::<String>("amount").unwrap())?,
        direction: sub.get_one::<String>("type").unwrap().trim().parse()?,
        category: Category::parse_or_other(sub.get_one::<String>("category").map(|s| s.as_str())),
        description: sub
            .get_one::<String>("description")
            .cloned()
            .unwrap_or_default(),
        frequency: sub.get_one::<String>("frequency").unwrap().trim().parse()?,
        next_run_at,
    };

    let created = recurring::create_rule(conn, user, &rule, Utc::now().naive_utc())?;
    println!(
        "Added rule {} '{}': {} {} {}, next run {}",
        created.id,
        created.title,
        created.frequency,
        created.direction,
        created.amount,
        utils::fmt_ts(created.next_run_at)
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = sub.get_one::<String>("user").unwrap();
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");

    let items = recurring::list_rules(conn, user)?;
    if !maybe_print_json(json_flag, jsonl_flag, &items)? {
        let rows: Vec<Vec<String>> = items
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.title.clone(),
                    r.direction.to_string(),
                    r.amount.to_string(),
                    r.category.to_string(),
                    r.frequency.to_string(),
                    utils::fmt_ts(r.next_run_at),
                    if r.is_active { "yes" } else { "no" }.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Title", "Type", "Amount", "Category", "Frequency", "Next Run", "Active"],
                rows,
            )
        );
    }
    Ok(())
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = sub.get_one::<String>("user").unwrap();
    let id: i64 = sub.get_one::<String>("id").unwrap().trim().parse()?;

    let mut update = RuleUpdate::default();
    if let Some(t) = sub.get_one::<String>("title") {
        update.title = Some(t.to_string());
    }
    if let Some(a) = sub.get_one::<String>("amount") {
        update.amount = Some(parse_decimal(a)?);
    }
    if let Some(t) = sub.get_one::<String>("type") {
        update.direction = Some(t.trim().parse()?);
    }
    if let Some(c) = sub.get_one::<String>("category") {
        update.category = Some(c.trim().parse()?);
    }
    if let Some(d) = sub.get_one::<String>("description") {
        update.description = Some(d.to_string());
    }
    if let Some(f) = sub.get_one::<String>("frequency") {
        update.frequency = Some(f.trim().parse()?);
    }
    if let Some(n) = sub.get_one::<String>("next-run") {
        update.next_run_at = Some(utils::parse_ts(n)?);
    }
    if let Some(a) = sub.get_one::<String>("active") {
        update.is_active = Some(match a.trim() {
            "true" => true,
            "false" => false,
            other => return Err(anyhow!("--active must be 'true' or 'false', got '{}'", other)),
        });
    }

    let updated = recurring::update_rule(conn, user, id, &update)?;
    println!(
        "Updated rule {} '{}' (active: {})",
        updated.id, updated.title, updated.is_active
    );
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = sub.get_one::<String>("user").unwrap();
    let id: i64 = sub.get_one::<String>("id").unwrap().trim().parse()?;
    recurring::delete_rule(conn, user, id)?;
    println!("Removed rule {}", id);
    Ok(())
}
