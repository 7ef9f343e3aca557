// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Monthly per-category spending caps, keyed on (user, month, category).
//! Read-mostly; limits are stored and listed here, never enforced against
//! the ledger.

use rusqlite::{params, params_from_iter, Connection};
use rust_decimal::Decimal;

use crate::error::LedgerError;
use crate::models::{Budget, Category};
use crate::utils;

const BUDGET_COLUMNS: &str = "id, user_id, month, category, limit_amount";

/// Outcome of an upsert: either the stored row, or removal when the limit
/// was the zero tombstone.
#[derive(Debug, Clone)]
pub enum BudgetUpsert {
    Set(Budget),
    Removed,
}

/// Idempotent create-or-replace. A limit of exactly zero deletes any
/// existing row for the key instead of storing it.
pub fn upsert(
    conn: &Connection,
    user_id: &str,
    month: &str,
    category: Category,
    limit_amount: Decimal,
) -> Result<BudgetUpsert, LedgerError> {
    utils::validate_month(month)?;
    if limit_amount < Decimal::ZERO {
        return Err(LedgerError::validation(
            "limit",
            "must be zero or positive",
        ));
    }

    if limit_amount.is_zero() {
        conn.execute(
            "DELETE FROM budgets WHERE user_id=?1 AND month=?2 AND category=?3",
            params![user_id, month, category.as_str()],
        )?;
        return Ok(BudgetUpsert::Removed);
    }

    conn.execute(
        "INSERT INTO budgets(user_id, month, category, limit_amount) VALUES (?1,?2,?3,?4)
         ON CONFLICT(user_id, month, category) DO UPDATE SET limit_amount=excluded.limit_amount",
        params![user_id, month, category.as_str(), limit_amount.to_string()],
    )?;
    let sql = format!(
        "SELECT {BUDGET_COLUMNS} FROM budgets WHERE user_id=?1 AND month=?2 AND category=?3"
    );
    let item = conn.query_row(
        &sql,
        params![user_id, month, category.as_str()],
        Budget::from_row,
    )?;
    Ok(BudgetUpsert::Set(item))
}

pub fn list(
    conn: &Connection,
    user_id: &str,
    month: Option<&str>,
) -> Result<Vec<Budget>, LedgerError> {
    let mut sql = format!("SELECT {BUDGET_COLUMNS} FROM budgets WHERE user_id=?");
    let mut args: Vec<String> = vec![user_id.to_string()];
    if let Some(m) = month {
        utils::validate_month(m)?;
        sql.push_str(" AND month=?");
        args.push(m.to_string());
    }
    sql.push_str(" ORDER BY month DESC, category ASC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(args.iter()), Budget::from_row)?;
    let mut items = Vec::new();
    for row in rows {
        items.push(row?);
    }
    Ok(items)
}
