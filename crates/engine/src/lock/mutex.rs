// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process mutex
//!
//! Only excludes callers sharing this instance. Two processes each running
//! one of these will happily hold the same key at once.

use super::{warn_unheld, Holdings, LockCapability};
use async_trait::async_trait;
use sg_core::{LockError, StrategyKind};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Per-key single-permit semaphore kept in process memory
pub struct InProcessMutexLock {
    slots: Mutex<HashMap<String, Arc<Semaphore>>>,
    permits: Holdings<OwnedSemaphorePermit>,
}

impl InProcessMutexLock {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            permits: Holdings::new(),
        }
    }

    pub fn holds(&self, key: &str) -> bool {
        self.permits.contains(key)
    }

    fn slot(&self, key: &str) -> Arc<Semaphore> {
        self.slots
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Semaphore::new(1)))
            .clone()
    }
}

impl Default for InProcessMutexLock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LockCapability for InProcessMutexLock {
    fn kind(&self) -> StrategyKind {
        StrategyKind::InProcessMutex
    }

    async fn try_acquire(&self, key: &str, timeout: Duration) -> Result<bool, LockError> {
        let slot = self.slot(key);
        // Semaphores are never closed, so an acquire error cannot happen
        let permit = if timeout.is_zero() {
            slot.try_acquire_owned().ok()
        } else {
            tokio::time::timeout(timeout, slot.acquire_owned())
                .await
                .ok()
                .and_then(Result::ok)
        };

        match permit {
            Some(permit) => {
                self.permits.insert(key, permit);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn release(&self, key: &str) -> Result<(), LockError> {
        match self.permits.take(key) {
            // Dropping the permit hands the slot to the next waiter
            Some(_permit) => {}
            None => warn_unheld(self.kind(), key),
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "mutex_tests.rs"]
mod tests;
