// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Pocketledger", "pocketledger"));

pub fn db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("pocketledger.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    // Writers from concurrent invocations queue on the database lock rather
    // than failing immediately; each unit of work is an IMMEDIATE
    // transaction, so this is the per-user serialization point.
    conn.busy_timeout(Duration::from_secs(5))?;
    conn.query_row("PRAGMA journal_mode=WAL", [], |_| Ok(()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS wallets(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL UNIQUE,
        balance TEXT NOT NULL DEFAULT '0',
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL,
        wallet_id INTEGER NOT NULL,
        amount TEXT NOT NULL,
        direction TEXT NOT NULL CHECK(direction IN ('credit','debit')),
        category TEXT NOT NULL DEFAULT 'other',
        description TEXT NOT NULL DEFAULT '',
        occurred_at TEXT NOT NULL,
        balance_after TEXT NOT NULL,
        recurring_source_id INTEGER,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(wallet_id) REFERENCES wallets(id) ON DELETE CASCADE
    );
    -- Replay order is (occurred_at, id); id is the stable tie-break for
    -- same-timestamp entries.
    CREATE INDEX IF NOT EXISTS idx_transactions_user_order
        ON transactions(user_id, occurred_at, id);

    CREATE TABLE IF NOT EXISTS recurring_rules(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL,
        title TEXT NOT NULL,
        amount TEXT NOT NULL,
        direction TEXT NOT NULL CHECK(direction IN ('credit','debit')),
        category TEXT NOT NULL DEFAULT 'other',
        description TEXT NOT NULL DEFAULT '',
        frequency TEXT NOT NULL CHECK(frequency IN ('daily','weekly','monthly')),
        next_run_at TEXT NOT NULL,
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE INDEX IF NOT EXISTS idx_recurring_rules_due
        ON recurring_rules(user_id, is_active, next_run_at);

    CREATE TABLE IF NOT EXISTS budgets(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL,
        month TEXT NOT NULL,
        category TEXT NOT NULL,
        limit_amount TEXT NOT NULL,
        UNIQUE(user_id, month, category)
    );
    "#,
    )?;
    Ok(())
}
