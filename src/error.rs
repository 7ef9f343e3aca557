// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use thiserror::Error;

/// Failure taxonomy for ledger operations. Callers map these onto whatever
/// transport they sit behind; the core never deals in status codes.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Malformed or out-of-range input. Never retried.
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// The referenced record does not exist for this user.
    #[error("{what} not found")]
    NotFound { what: &'static str },

    /// A debit exceeds the available balance.
    #[error("insufficient balance: available {available}, required {required}")]
    InsufficientFunds {
        available: Decimal,
        required: Decimal,
    },

    /// Replaying the transaction history hit a debit that cannot be
    /// satisfied at its position. The triggering unit of work is rolled
    /// back in full.
    #[error("operation would create an invalid balance sequence")]
    InconsistentLedger,

    /// Underlying SQLite failure. Safe to retry the whole operation.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl LedgerError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn not_found(what: &'static str) -> Self {
        Self::NotFound { what }
    }
}
