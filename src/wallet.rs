// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The wallet aggregate and the unit-of-work entry points. Every operation
//! here runs one IMMEDIATE SQLite transaction: materialize due recurring
//! rules, reconcile, perform its own mutation, reconcile again where
//! history changed shape. Any failure drops the transaction and rolls the
//! whole unit back.

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use rust_decimal::Decimal;

use crate::error::LedgerError;
use crate::ledger::{self, NewTransaction, Page, TxFilter, TxUpdate};
use crate::models::{Category, Direction, Transaction, Wallet};
use crate::reconcile;
use crate::recurring;

/// Wallets are created lazily on first access and never deleted.
pub fn get_or_create(conn: &Connection, user_id: &str) -> Result<Wallet, LedgerError> {
    let existing = conn
        .query_row(
            "SELECT id, user_id, balance FROM wallets WHERE user_id=?1",
            params![user_id],
            Wallet::from_row,
        )
        .optional()?;
    if let Some(w) = existing {
        return Ok(w);
    }
    conn.execute(
        "INSERT INTO wallets(user_id, balance) VALUES (?1, '0')",
        params![user_id],
    )?;
    Ok(Wallet {
        id: conn.last_insert_rowid(),
        user_id: user_id.to_string(),
        balance: Decimal::ZERO,
    })
}

pub(crate) fn set_balance(
    conn: &Connection,
    user_id: &str,
    balance: Decimal,
) -> Result<Wallet, LedgerError> {
    let mut wallet = get_or_create(conn, user_id)?;
    conn.execute(
        "UPDATE wallets SET balance=?1 WHERE id=?2",
        params![balance.to_string(), wallet.id],
    )?;
    wallet.balance = balance;
    Ok(wallet)
}

fn begin(conn: &mut Connection) -> Result<rusqlite::Transaction<'_>, LedgerError> {
    conn.transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(LedgerError::from)
}

/// Canonical current balance: materialize due rules, then derive the
/// balance from history. A logical read, but it mutates state and so runs
/// in the same kind of unit of work as everything else.
pub fn get_balance(
    conn: &mut Connection,
    user_id: &str,
    now: NaiveDateTime,
) -> Result<Decimal, LedgerError> {
    let tx = begin(conn)?;
    recurring::materialize(&tx, user_id, now)?;
    let balance = reconcile::reconcile(&tx, user_id)?;
    tx.commit()?;
    Ok(balance)
}

pub fn credit(
    conn: &mut Connection,
    user_id: &str,
    amount: Decimal,
    description: Option<&str>,
    category: Option<&str>,
    now: NaiveDateTime,
) -> Result<(Decimal, Transaction), LedgerError> {
    apply_direct(conn, user_id, Direction::Credit, amount, description, category, now)
}

pub fn debit(
    conn: &mut Connection,
    user_id: &str,
    amount: Decimal,
    description: Option<&str>,
    category: Option<&str>,
    now: NaiveDateTime,
) -> Result<(Decimal, Transaction), LedgerError> {
    apply_direct(conn, user_id, Direction::Debit, amount, description, category, now)
}

fn apply_direct(
    conn: &mut Connection,
    user_id: &str,
    direction: Direction,
    amount: Decimal,
    description: Option<&str>,
    category: Option<&str>,
    now: NaiveDateTime,
) -> Result<(Decimal, Transaction), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::validation("amount", "must be a positive number"));
    }

    let tx = begin(conn)?;
    recurring::materialize(&tx, user_id, now)?;
    reconcile::reconcile(&tx, user_id)?;

    let wallet = get_or_create(&tx, user_id)?;
    let balance = match direction {
        Direction::Credit => wallet.balance + amount,
        Direction::Debit => {
            if wallet.balance < amount {
                return Err(LedgerError::InsufficientFunds {
                    available: wallet.balance,
                    required: amount,
                });
            }
            wallet.balance - amount
        }
    };

    let default_description = match direction {
        Direction::Credit => "Wallet credit",
        Direction::Debit => "Wallet debit",
    };
    // Fast path: the new entry is latest-in-order, so its snapshot is the
    // new balance and no further reconcile pass is needed.
    let recorded = ledger::insert(
        &tx,
        &NewTransaction {
            user_id,
            wallet_id: wallet.id,
            amount,
            direction,
            category: Category::parse_or_other(category),
            description: description.unwrap_or(default_description),
            occurred_at: now,
            balance_after: balance,
            recurring_source_id: None,
        },
    )?;
    set_balance(&tx, user_id, balance)?;
    tx.commit()?;
    Ok((balance, recorded))
}

pub fn list_transactions(
    conn: &mut Connection,
    user_id: &str,
    filter: &TxFilter,
    page: Page,
    now: NaiveDateTime,
) -> Result<(Vec<Transaction>, i64), LedgerError> {
    let tx = begin(conn)?;
    recurring::materialize(&tx, user_id, now)?;
    reconcile::reconcile(&tx, user_id)?;
    let result = ledger::list(&tx, user_id, filter, page)?;
    tx.commit()?;
    Ok(result)
}

/// Edits can move an entry anywhere in history, so the edit is only kept if
/// the re-reconciled sequence is still valid.
pub fn edit_transaction(
    conn: &mut Connection,
    user_id: &str,
    tx_id: i64,
    update: &TxUpdate,
    now: NaiveDateTime,
) -> Result<(Decimal, Transaction), LedgerError> {
    let tx = begin(conn)?;
    recurring::materialize(&tx, user_id, now)?;
    reconcile::reconcile(&tx, user_id)?;
    ledger::edit(&tx, user_id, tx_id, update)?;
    let balance = reconcile::reconcile(&tx, user_id)?;
    let updated = ledger::get(&tx, user_id, tx_id)?;
    tx.commit()?;
    Ok((balance, updated))
}

pub fn delete_transaction(
    conn: &mut Connection,
    user_id: &str,
    tx_id: i64,
    now: NaiveDateTime,
) -> Result<Decimal, LedgerError> {
    let tx = begin(conn)?;
    recurring::materialize(&tx, user_id, now)?;
    reconcile::reconcile(&tx, user_id)?;
    ledger::remove(&tx, user_id, tx_id)?;
    let balance = reconcile::reconcile(&tx, user_id)?;
    tx.commit()?;
    Ok(balance)
}
