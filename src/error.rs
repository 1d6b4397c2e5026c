// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::ErrorCode;
use thiserror::Error;

/// Errors surfaced by the ledger engine.
///
/// `InvalidRequest` is always raised before any store access and is fully
/// recoverable by correcting the input. `Contention` never reaches callers
/// directly: the store retries it internally and converts an exhausted retry
/// budget into `Internal`.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Store contention: {0}")]
    Contention(String),
    #[error("Range erase interrupted after deleting {deleted} records: {message}")]
    PartialErase { deleted: usize, message: String },
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Boundary status, the way UI collaborators consume it.
    pub fn status(&self) -> &'static str {
        match self {
            LedgerError::InvalidRequest(_) => "invalid-request",
            LedgerError::NotFound(_) => "not-found",
            LedgerError::PartialErase { .. } => "partial-completion",
            LedgerError::Contention(_) | LedgerError::Internal(_) => "internal-error",
        }
    }
}

impl From<rusqlite::Error> for LedgerError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => {
                LedgerError::Contention(err.to_string())
            }
            _ => LedgerError::Internal(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Internal(format!("rollup payload: {}", err))
    }
}
