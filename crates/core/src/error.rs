// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for counter decrements and the collaborators behind them

use crate::counter::{Counter, CounterId};
use std::time::Duration;
use thiserror::Error;

/// Errors from the counter store
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("counter not found: {0}")]
    NotFound(CounterId),
    #[error("counter already exists: {0}")]
    AlreadyExists(CounterId),
    #[error("unknown advisory session: {0}")]
    UnknownSession(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("wal error: {0}")]
    Wal(String),
}

/// Errors from the distributed lock backend
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("lock backend unavailable: {0}")]
    Unavailable(String),
    #[error("injected failure: {0}")]
    Injected(String),
}

/// Infrastructure failure inside a lock capability
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LockError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors surfaced to callers of a decrement
#[derive(Debug, Error)]
pub enum StockError {
    #[error("counter not found: {0}")]
    NotFound(CounterId),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("insufficient stock for counter {id}: requested {requested}, available {available}")]
    InsufficientStock {
        id: CounterId,
        requested: u64,
        available: u64,
    },
    #[error("version conflict on counter {id} after {attempts} attempts")]
    VersionConflict { id: CounterId, attempts: u32 },
    #[error("timed out acquiring lock {key} after {waited:?}")]
    LockTimeout { key: String, waited: Duration },
    #[error("failed to acquire lock {key}: {source}")]
    LockAcquire {
        key: String,
        #[source]
        source: LockError,
    },
    #[error("failed to release lock {key}: {source} ({})", describe_outcome(.operation))]
    LockReleaseFailure {
        key: String,
        #[source]
        source: LockError,
        /// Outcome of the protected operation, reported alongside the release failure
        operation: Box<Result<Counter, StockError>>,
    },
    #[error("storage error: {0}")]
    Storage(StoreError),
}

impl StockError {
    /// Concurrency failures a caller may retry with its own backoff
    pub fn is_transient(&self) -> bool {
        match self {
            StockError::VersionConflict { .. } | StockError::LockTimeout { .. } => true,
            StockError::LockReleaseFailure { operation, .. } => match operation.as_ref() {
                Ok(_) => false,
                Err(e) => e.is_transient(),
            },
            _ => false,
        }
    }

    /// Whether the protected mutation was committed despite this error
    pub fn committed(&self) -> Option<&Counter> {
        match self {
            StockError::LockReleaseFailure { operation, .. } => operation.as_ref().as_ref().ok(),
            _ => None,
        }
    }
}

impl From<StoreError> for StockError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => StockError::NotFound(id),
            other => StockError::Storage(other),
        }
    }
}

fn describe_outcome(operation: &Result<Counter, StockError>) -> String {
    match operation {
        Ok(counter) => format!(
            "operation committed: counter {} at quantity {}",
            counter.id, counter.quantity
        ),
        Err(e) => format!("operation failed: {}", e),
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
