// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The balance reconciler: replays a user's full transaction history in
//! `(occurred_at, id)` order, repairs stale per-transaction snapshots in one
//! batch, and writes the final running balance back to the wallet. Balance
//! is a derived value; this routine is its single source of truth.

use rusqlite::{params, Connection};
use rust_decimal::Decimal;

use crate::error::LedgerError;
use crate::models::Direction;
use crate::utils;
use crate::wallet;

/// Replay history from zero. Fails with `InconsistentLedger` if any debit
/// cannot be satisfied at its position (its amount exceeds the balance
/// before it); landing at exactly zero is allowed. The caller's unit of
/// work is expected to roll back on failure, discarding any repairs.
pub fn reconcile(conn: &Connection, user_id: &str) -> Result<Decimal, LedgerError> {
    let mut stmt = conn.prepare(
        "SELECT id, amount, direction, balance_after FROM transactions \
         WHERE user_id=?1 ORDER BY occurred_at ASC, id ASC",
    )?;
    let rows = stmt.query_map(params![user_id], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            utils::decimal_column(1, r.get(1)?)?,
            utils::enum_column::<Direction>(2, r.get(2)?)?,
            utils::decimal_column(3, r.get(3)?)?,
        ))
    })?;

    let mut running = Decimal::ZERO;
    let mut repairs: Vec<(i64, Decimal)> = Vec::new();
    for row in rows {
        let (id, amount, direction, stored) = row?;
        match direction {
            Direction::Credit => running += amount,
            Direction::Debit => {
                if running < amount {
                    return Err(LedgerError::InconsistentLedger);
                }
                running -= amount;
            }
        }
        if stored != running {
            repairs.push((id, running));
        }
    }

    if !repairs.is_empty() {
        log::debug!(
            "reconcile: repairing {} stale snapshot(s) for user {}",
            repairs.len(),
            user_id
        );
        let mut update = conn.prepare("UPDATE transactions SET balance_after=?1 WHERE id=?2")?;
        for (id, balance) in &repairs {
            update.execute(params![balance.to_string(), id])?;
        }
    }

    wallet::set_balance(conn, user_id, running)?;
    Ok(running)
}
