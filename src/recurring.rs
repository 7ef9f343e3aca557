// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Recurring rules: CRUD plus the materializer that expands due rules into
//! concrete ledger entries. There is no background timer; materialization
//! runs lazily at the start of every ledger-touching operation.

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;

use crate::error::LedgerError;
use crate::ledger::{self, NewTransaction};
use crate::models::{Category, Direction, Frequency, RecurringRule};
use crate::utils;
use crate::wallet;

/// Cap on catch-up occurrences per rule per invocation. A long-dormant rule
/// leaves any backlog beyond this for the next invocation.
pub const MAX_CATCH_UP_ITERATIONS: u32 = 36;

pub(crate) const RULE_COLUMNS: &str = "id, user_id, title, amount, direction, category, \
     description, frequency, next_run_at, is_active";

/// Expand every active rule whose next-due timestamp is in the past.
/// Credits always apply; a debit occurrence that the balance cannot cover
/// is skipped outright, not deferred. The schedule advances from the
/// previous due value either way. Spawned entries are timestamped "now".
pub(crate) fn materialize(
    conn: &Connection,
    user_id: &str,
    now: NaiveDateTime,
) -> Result<(), LedgerError> {
    let sql = format!(
        "SELECT {RULE_COLUMNS} FROM recurring_rules \
         WHERE user_id=?1 AND is_active=1 AND next_run_at<=?2 ORDER BY next_run_at ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![user_id, utils::fmt_ts(now)], RecurringRule::from_row)?;
    let mut due = Vec::new();
    for row in rows {
        due.push(row?);
    }
    if due.is_empty() {
        return Ok(());
    }

    let wallet = wallet::get_or_create(conn, user_id)?;
    let mut balance = wallet.balance;

    for mut rule in due {
        let mut iterations = 0u32;
        while rule.next_run_at <= now && iterations < MAX_CATCH_UP_ITERATIONS {
            let applies = rule.direction == Direction::Credit || balance >= rule.amount;
            if applies {
                balance = match rule.direction {
                    Direction::Credit => balance + rule.amount,
                    Direction::Debit => balance - rule.amount,
                };
                let description = if rule.description.is_empty() {
                    format!("Recurring: {}", rule.title)
                } else {
                    rule.description.clone()
                };
                ledger::insert(
                    conn,
                    &NewTransaction {
                        user_id,
                        wallet_id: wallet.id,
                        amount: rule.amount,
                        direction: rule.direction,
                        category: rule.category,
                        description: &description,
                        occurred_at: now,
                        balance_after: balance,
                        recurring_source_id: Some(rule.id),
                    },
                )?;
            } else {
                log::warn!(
                    "skipping recurring debit '{}' for user {}: requires {}, available {}",
                    rule.title,
                    user_id,
                    rule.amount,
                    balance
                );
            }
            rule.next_run_at = rule.frequency.step(rule.next_run_at);
            iterations += 1;
        }
        conn.execute(
            "UPDATE recurring_rules SET next_run_at=?1 WHERE id=?2",
            params![utils::fmt_ts(rule.next_run_at), rule.id],
        )?;
    }

    conn.execute(
        "UPDATE wallets SET balance=?1 WHERE id=?2",
        params![balance.to_string(), wallet.id],
    )?;
    Ok(())
}

pub struct NewRule {
    pub title: String,
    pub amount: Decimal,
    pub direction: Direction,
    pub category: Category,
    pub description: String,
    pub frequency: Frequency,
    /// Defaults to "now" when absent.
    pub next_run_at: Option<NaiveDateTime>,
}

pub fn create_rule(
    conn: &Connection,
    user_id: &str,
    rule: &NewRule,
    now: NaiveDateTime,
) -> Result<RecurringRule, LedgerError> {
    if rule.title.trim().is_empty() {
        return Err(LedgerError::validation("title", "must not be empty"));
    }
    if rule.amount <= Decimal::ZERO {
        return Err(LedgerError::validation("amount", "must be a positive number"));
    }
    let next_run_at = rule.next_run_at.unwrap_or(now);
    conn.execute(
        "INSERT INTO recurring_rules(user_id, title, amount, direction, category, description, \
         frequency, next_run_at, is_active) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1)",
        params![
            user_id,
            rule.title.trim(),
            rule.amount.to_string(),
            rule.direction.as_str(),
            rule.category.as_str(),
            &rule.description,
            rule.frequency.as_str(),
            utils::fmt_ts(next_run_at),
        ],
    )?;
    Ok(RecurringRule {
        id: conn.last_insert_rowid(),
        user_id: user_id.to_string(),
        title: rule.title.trim().to_string(),
        amount: rule.amount,
        direction: rule.direction,
        category: rule.category,
        description: rule.description.clone(),
        frequency: rule.frequency,
        next_run_at,
        is_active: true,
    })
}

/// Field update set for a rule edit; same semantics as `TxUpdate`.
#[derive(Debug, Default, Clone)]
pub struct RuleUpdate {
    pub title: Option<String>,
    pub amount: Option<Decimal>,
    pub direction: Option<Direction>,
    pub category: Option<Category>,
    pub description: Option<String>,
    pub frequency: Option<Frequency>,
    pub next_run_at: Option<NaiveDateTime>,
    pub is_active: Option<bool>,
}

pub fn update_rule(
    conn: &Connection,
    user_id: &str,
    rule_id: i64,
    update: &RuleUpdate,
) -> Result<RecurringRule, LedgerError> {
    let existing = get_rule(conn, user_id, rule_id)?;

    if let Some(title) = &update.title {
        if title.trim().is_empty() {
            return Err(LedgerError::validation("title", "must not be empty"));
        }
    }
    let amount = update.amount.unwrap_or(existing.amount);
    if amount <= Decimal::ZERO {
        return Err(LedgerError::validation("amount", "must be a positive number"));
    }

    let title = match update.title.as_deref() {
        Some(t) => t.trim().to_string(),
        None => existing.title.clone(),
    };
    let description = match update.description.clone() {
        Some(d) => d,
        None => existing.description.clone(),
    };
    let merged = RecurringRule {
        title,
        amount,
        direction: update.direction.unwrap_or(existing.direction),
        category: update.category.unwrap_or(existing.category),
        description,
        frequency: update.frequency.unwrap_or(existing.frequency),
        next_run_at: update.next_run_at.unwrap_or(existing.next_run_at),
        is_active: update.is_active.unwrap_or(existing.is_active),
        ..existing
    };

    conn.execute(
        "UPDATE recurring_rules SET title=?1, amount=?2, direction=?3, category=?4, \
         description=?5, frequency=?6, next_run_at=?7, is_active=?8 WHERE id=?9 AND user_id=?10",
        params![
            &merged.title,
            merged.amount.to_string(),
            merged.direction.as_str(),
            merged.category.as_str(),
            &merged.description,
            merged.frequency.as_str(),
            utils::fmt_ts(merged.next_run_at),
            merged.is_active,
            rule_id,
            user_id,
        ],
    )?;
    Ok(merged)
}

/// Deleting a rule leaves its already-materialized transactions untouched.
pub fn delete_rule(conn: &Connection, user_id: &str, rule_id: i64) -> Result<(), LedgerError> {
    let n = conn.execute(
        "DELETE FROM recurring_rules WHERE id=?1 AND user_id=?2",
        params![rule_id, user_id],
    )?;
    if n == 0 {
        return Err(LedgerError::not_found("recurring rule"));
    }
    Ok(())
}

pub fn get_rule(
    conn: &Connection,
    user_id: &str,
    rule_id: i64,
) -> Result<RecurringRule, LedgerError> {
    let sql = format!("SELECT {RULE_COLUMNS} FROM recurring_rules WHERE id=?1 AND user_id=?2");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map(params![rule_id, user_id], RecurringRule::from_row)?;
    match rows.next() {
        Some(row) => Ok(row?),
        None => Err(LedgerError::not_found("recurring rule")),
    }
}

/// Newest-created first, matching how rule listings are presented.
pub fn list_rules(conn: &Connection, user_id: &str) -> Result<Vec<RecurringRule>, LedgerError> {
    let sql = format!(
        "SELECT {RULE_COLUMNS} FROM recurring_rules WHERE user_id=?1 ORDER BY id DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![user_id], RecurringRule::from_row)?;
    let mut items = Vec::new();
    for row in rows {
        items.push(row?);
    }
    Ok(items)
}
