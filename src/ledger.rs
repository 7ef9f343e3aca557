// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The transaction ledger: the ordered log of credit/debit entries per
//! wallet. Append/edit/remove here never touch the wallet balance directly;
//! the surrounding unit of work runs the reconciler to keep snapshots and
//! the cached balance in line with history.

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, params_from_iter, Connection};
use rust_decimal::Decimal;

use crate::error::LedgerError;
use crate::models::{Category, Direction, Transaction};
use crate::utils;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 200;

pub(crate) const TX_COLUMNS: &str = "id, user_id, wallet_id, amount, direction, category, \
     description, occurred_at, balance_after, recurring_source_id";

pub(crate) struct NewTransaction<'a> {
    pub user_id: &'a str,
    pub wallet_id: i64,
    pub amount: Decimal,
    pub direction: Direction,
    pub category: Category,
    pub description: &'a str,
    pub occurred_at: NaiveDateTime,
    pub balance_after: Decimal,
    pub recurring_source_id: Option<i64>,
}

pub(crate) fn insert(conn: &Connection, new: &NewTransaction<'_>) -> Result<Transaction, LedgerError> {
    conn.execute(
        "INSERT INTO transactions(user_id, wallet_id, amount, direction, category, description, \
         occurred_at, balance_after, recurring_source_id) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            new.user_id,
            new.wallet_id,
            new.amount.to_string(),
            new.direction.as_str(),
            new.category.as_str(),
            new.description,
            utils::fmt_ts(new.occurred_at),
            new.balance_after.to_string(),
            new.recurring_source_id,
        ],
    )?;
    Ok(Transaction {
        id: conn.last_insert_rowid(),
        user_id: new.user_id.to_string(),
        wallet_id: new.wallet_id,
        amount: new.amount,
        direction: new.direction,
        category: new.category,
        description: new.description.to_string(),
        occurred_at: new.occurred_at,
        balance_after: new.balance_after,
        recurring_source_id: new.recurring_source_id,
    })
}

pub fn get(conn: &Connection, user_id: &str, tx_id: i64) -> Result<Transaction, LedgerError> {
    let sql = format!("SELECT {TX_COLUMNS} FROM transactions WHERE id=?1 AND user_id=?2");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map(params![tx_id, user_id], Transaction::from_row)?;
    match rows.next() {
        Some(row) => Ok(row?),
        None => Err(LedgerError::not_found("transaction")),
    }
}

/// Field update set for a transaction edit. Absent fields keep their current
/// value; present fields have already passed strict parsing at the boundary.
#[derive(Debug, Default, Clone)]
pub struct TxUpdate {
    pub direction: Option<Direction>,
    pub amount: Option<Decimal>,
    pub category: Option<Category>,
    pub description: Option<String>,
    pub occurred_at: Option<NaiveDateTime>,
}

pub fn edit(
    conn: &Connection,
    user_id: &str,
    tx_id: i64,
    update: &TxUpdate,
) -> Result<Transaction, LedgerError> {
    let existing = get(conn, user_id, tx_id)?;

    let amount = update.amount.unwrap_or(existing.amount);
    if amount <= Decimal::ZERO {
        return Err(LedgerError::validation("amount", "must be a positive number"));
    }
    let direction = update.direction.unwrap_or(existing.direction);
    let category = update.category.unwrap_or(existing.category);
    let description = update
        .description
        .clone()
        .unwrap_or_else(|| existing.description.clone());
    let occurred_at = update.occurred_at.unwrap_or(existing.occurred_at);

    conn.execute(
        "UPDATE transactions SET amount=?1, direction=?2, category=?3, description=?4, \
         occurred_at=?5 WHERE id=?6 AND user_id=?7",
        params![
            amount.to_string(),
            direction.as_str(),
            category.as_str(),
            &description,
            utils::fmt_ts(occurred_at),
            tx_id,
            user_id,
        ],
    )?;

    Ok(Transaction {
        amount,
        direction,
        category,
        description,
        occurred_at,
        ..existing
    })
}

pub fn remove(conn: &Connection, user_id: &str, tx_id: i64) -> Result<(), LedgerError> {
    let n = conn.execute(
        "DELETE FROM transactions WHERE id=?1 AND user_id=?2",
        params![tx_id, user_id],
    )?;
    if n == 0 {
        return Err(LedgerError::not_found("transaction"));
    }
    Ok(())
}

#[derive(Debug, Default, Clone)]
pub struct TxFilter {
    pub direction: Option<Direction>,
    pub category: Option<Category>,
    /// Inclusive month window, YYYY-MM.
    pub month: Option<String>,
    /// Start of day, inclusive.
    pub start_date: Option<NaiveDate>,
    /// End of day, inclusive.
    pub end_date: Option<NaiveDate>,
    /// Case-insensitive substring over description and category.
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
}

impl Default for Page {
    fn default() -> Self {
        Page {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Page {
    fn clamped(self) -> Page {
        let limit = if self.limit <= 0 {
            DEFAULT_PAGE_SIZE
        } else {
            self.limit.min(MAX_PAGE_SIZE)
        };
        Page {
            page: self.page.max(1),
            limit,
        }
    }
}

/// Filtered, paginated listing, newest first. Returns the page of items and
/// the total match count.
pub fn list(
    conn: &Connection,
    user_id: &str,
    filter: &TxFilter,
    page: Page,
) -> Result<(Vec<Transaction>, i64), LedgerError> {
    let mut where_sql = String::from(" WHERE user_id=?");
    let mut args: Vec<String> = vec![user_id.to_string()];

    if let Some(direction) = filter.direction {
        where_sql.push_str(" AND direction=?");
        args.push(direction.as_str().to_string());
    }
    if let Some(category) = filter.category {
        where_sql.push_str(" AND category=?");
        args.push(category.as_str().to_string());
    }
    if let Some(month) = &filter.month {
        utils::validate_month(month)?;
        where_sql.push_str(" AND substr(occurred_at,1,7)=?");
        args.push(month.clone());
    }
    if let Some(start) = filter.start_date {
        where_sql.push_str(" AND occurred_at>=?");
        args.push(format!("{} 00:00:00", start));
    }
    if let Some(end) = filter.end_date {
        where_sql.push_str(" AND occurred_at<=?");
        args.push(format!("{} 23:59:59", end));
    }
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        where_sql.push_str(
            " AND (LOWER(description) LIKE ? ESCAPE '\\' OR LOWER(category) LIKE ? ESCAPE '\\')",
        );
        let pattern = format!("%{}%", utils::escape_like(&search.to_lowercase()));
        args.push(pattern.clone());
        args.push(pattern);
    }

    let total: i64 = {
        let sql = format!("SELECT COUNT(*) FROM transactions{where_sql}");
        let mut stmt = conn.prepare(&sql)?;
        stmt.query_row(params_from_iter(args.iter()), |r| r.get(0))?
    };

    let page = page.clamped();
    let sql = format!(
        "SELECT {TX_COLUMNS} FROM transactions{where_sql} \
         ORDER BY occurred_at DESC, id DESC LIMIT ? OFFSET ?"
    );
    args.push(page.limit.to_string());
    args.push(((page.page - 1) * page.limit).to_string());

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(args.iter()), Transaction::from_row)?;
    let mut items = Vec::new();
    for row in rows {
        items.push(row?);
    }
    Ok((items, total))
}
