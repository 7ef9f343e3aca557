// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use crate::error::LedgerError;

/// Stored timestamp format. Second precision, chosen so that lexicographic
/// order over the TEXT column equals chronological order.
pub const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static MONTH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}$").unwrap());

pub fn fmt_ts(t: NaiveDateTime) -> String {
    t.format(TS_FORMAT).to_string()
}

/// Parse a user-supplied timestamp. Accepts the stored format, an ISO 'T'
/// separator, or a bare date (taken as midnight).
pub fn parse_ts(s: &str) -> Result<NaiveDateTime, LedgerError> {
    let s = s.trim();
    if let Ok(t) = NaiveDateTime::parse_from_str(s, TS_FORMAT) {
        return Ok(t);
    }
    if let Ok(t) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(t);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(t) = d.and_hms_opt(0, 0, 0) {
            return Ok(t);
        }
    }
    Err(LedgerError::validation(
        "date",
        format!("'{}' is not a valid date or timestamp", s),
    ))
}

pub fn validate_month(s: &str) -> Result<(), LedgerError> {
    if !MONTH_RE.is_match(s) {
        return Err(LedgerError::validation(
            "month",
            format!("'{}' must be YYYY-MM", s),
        ));
    }
    let mm: u32 = s[5..7].parse().unwrap_or(0);
    if !(1..=12).contains(&mm) {
        return Err(LedgerError::validation(
            "month",
            format!("'{}' has an out-of-range month number", s),
        ));
    }
    Ok(())
}

/// Escape LIKE metacharacters so a search string is matched literally.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

// CLI-side argument parsing, in the anyhow dialect.

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

// Row-mapping helpers: convert TEXT columns inside rusqlite closures,
// surfacing corrupt rows as conversion failures instead of panics.

pub(crate) fn decimal_column(idx: usize, s: String) -> rusqlite::Result<Decimal> {
    s.parse::<Decimal>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

pub(crate) fn ts_column(idx: usize, s: String) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(&s, TS_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

pub(crate) fn enum_column<T>(idx: usize, s: String) -> rusqlite::Result<T>
where
    T: FromStr<Err = LedgerError>,
{
    s.parse::<T>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
