// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock capabilities
//!
//! A capability grants one holder at a time per key. Each instance remembers
//! what it acquired for every key it holds, so `release` only gives back
//! what this instance took.

mod mutex;
mod named;
mod notify;
mod spin;

pub use mutex::InProcessMutexLock;
pub use named::NamedLock;
pub use notify::NotifyLock;
pub use spin::SpinLock;

use async_trait::async_trait;
use sg_core::{LockError, StrategyKind};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Exclusive access to a resource key
#[async_trait]
pub trait LockCapability: Send + Sync + 'static {
    /// Strategy this capability implements
    fn kind(&self) -> StrategyKind;

    /// Name used in logs
    fn name(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Wait up to `timeout` for `key`. `Ok(false)` means the budget ran out;
    /// a zero budget makes a single attempt.
    async fn try_acquire(&self, key: &str, timeout: Duration) -> Result<bool, LockError>;

    /// Give back a key acquired through this instance. Releasing a key this
    /// instance does not hold is a logged no-op.
    async fn release(&self, key: &str) -> Result<(), LockError>;
}

/// What an instance holds, per key
pub(crate) struct Holdings<T> {
    by_key: Mutex<HashMap<String, T>>,
}

impl<T> Holdings<T> {
    pub(crate) fn new() -> Self {
        Self {
            by_key: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn insert(&self, key: &str, value: T) {
        let previous = self
            .by_key
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value);
        if previous.is_some() {
            // The earlier grant expired and someone in this process took it over
            tracing::warn!(key, "replaced a hold that was never released");
        }
    }

    pub(crate) fn take(&self, key: &str) -> Option<T> {
        self.by_key
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key)
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.by_key
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(key)
    }
}

/// Log a release of a key this instance does not hold
pub(crate) fn warn_unheld(kind: StrategyKind, key: &str) {
    tracing::warn!(lock = kind.as_str(), key, "release of a key this instance does not hold");
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
