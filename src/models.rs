// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, Months, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::utils;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Credit,
    Debit,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Credit => "credit",
            Direction::Debit => "debit",
        }
    }
}

impl FromStr for Direction {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit" => Ok(Direction::Credit),
            "debit" => Ok(Direction::Debit),
            other => Err(LedgerError::validation(
                "type",
                format!("'{}' is not 'credit' or 'debit'", other),
            )),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed category set. Anything outside it is either coerced to `Other`
/// (where a category is optional) or rejected (explicit edits, budgets).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Salary,
    Food,
    Rent,
    Travel,
    Bills,
    Shopping,
    Health,
    Entertainment,
    Other,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Salary,
        Category::Food,
        Category::Rent,
        Category::Travel,
        Category::Bills,
        Category::Shopping,
        Category::Health,
        Category::Entertainment,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Salary => "salary",
            Category::Food => "food",
            Category::Rent => "rent",
            Category::Travel => "travel",
            Category::Bills => "bills",
            Category::Shopping => "shopping",
            Category::Health => "health",
            Category::Entertainment => "entertainment",
            Category::Other => "other",
        }
    }

    /// Lenient form used where a category is optional: absent or unknown
    /// values fall back to `Other`.
    pub fn parse_or_other(s: Option<&str>) -> Category {
        s.and_then(|v| v.parse().ok()).unwrap_or(Category::Other)
    }
}

impl FromStr for Category {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "salary" => Ok(Category::Salary),
            "food" => Ok(Category::Food),
            "rent" => Ok(Category::Rent),
            "travel" => Ok(Category::Travel),
            "bills" => Ok(Category::Bills),
            "shopping" => Ok(Category::Shopping),
            "health" => Ok(Category::Health),
            "entertainment" => Ok(Category::Entertainment),
            "other" => Ok(Category::Other),
            unknown => Err(LedgerError::validation(
                "category",
                format!("'{}' is not a known category", unknown),
            )),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }

    /// Next due timestamp computed from the previous due value, never from
    /// "now", so repeated late materialization does not drift the schedule.
    /// Monthly steps clamp to the end of shorter months (Jan 31 -> Feb 28).
    pub fn step(self, from: NaiveDateTime) -> NaiveDateTime {
        match self {
            Frequency::Daily => from + Duration::days(1),
            Frequency::Weekly => from + Duration::days(7),
            Frequency::Monthly => from
                .checked_add_months(Months::new(1))
                .unwrap_or(from + Duration::days(31)),
        }
    }
}

impl FromStr for Frequency {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            other => Err(LedgerError::validation(
                "frequency",
                format!("'{}' is not 'daily', 'weekly' or 'monthly'", other),
            )),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-user container for the derived current balance. Created lazily on
/// first access; the balance is only ever written by the reconciler and the
/// direct credit/debit fast paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub id: i64,
    pub user_id: String,
    pub balance: Decimal,
}

impl Wallet {
    pub(crate) fn from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Wallet {
            id: r.get(0)?,
            user_id: r.get(1)?,
            balance: utils::decimal_column(2, r.get(2)?)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: String,
    pub wallet_id: i64,
    pub amount: Decimal,
    pub direction: Direction,
    pub category: Category,
    pub description: String,
    pub occurred_at: NaiveDateTime,
    /// Running balance immediately after this entry, in `(occurred_at, id)`
    /// order. Repaired by the reconciler whenever history changes shape.
    pub balance_after: Decimal,
    /// Back-reference to the recurring rule that spawned this entry.
    pub recurring_source_id: Option<i64>,
}

impl Transaction {
    pub(crate) fn from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Transaction {
            id: r.get(0)?,
            user_id: r.get(1)?,
            wallet_id: r.get(2)?,
            amount: utils::decimal_column(3, r.get(3)?)?,
            direction: utils::enum_column(4, r.get(4)?)?,
            category: utils::enum_column(5, r.get(5)?)?,
            description: r.get(6)?,
            occurred_at: utils::ts_column(7, r.get(7)?)?,
            balance_after: utils::decimal_column(8, r.get(8)?)?,
            recurring_source_id: r.get(9)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringRule {
    pub id: i64,
    pub user_id: String,
    pub title: String,
    pub amount: Decimal,
    pub direction: Direction,
    pub category: Category,
    pub description: String,
    pub frequency: Frequency,
    pub next_run_at: NaiveDateTime,
    pub is_active: bool,
}

impl RecurringRule {
    pub(crate) fn from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(RecurringRule {
            id: r.get(0)?,
            user_id: r.get(1)?,
            title: r.get(2)?,
            amount: utils::decimal_column(3, r.get(3)?)?,
            direction: utils::enum_column(4, r.get(4)?)?,
            category: utils::enum_column(5, r.get(5)?)?,
            description: r.get(6)?,
            frequency: utils::enum_column(7, r.get(7)?)?,
            next_run_at: utils::ts_column(8, r.get(8)?)?,
            is_active: r.get(9)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub user_id: String,
    pub month: String, // YYYY-MM
    pub category: Category,
    pub limit_amount: Decimal,
}

impl Budget {
    pub(crate) fn from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Budget {
            id: r.get(0)?,
            user_id: r.get(1)?,
            month: r.get(2)?,
            category: utils::enum_column(3, r.get(3)?)?,
            limit_amount: utils::decimal_column(4, r.get(4)?)?,
        })
    }
}
