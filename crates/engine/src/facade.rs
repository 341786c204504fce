// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Locked decrement facade
//!
//! Acquire, decrement, release. The lock is given back on every path once
//! it was granted, and a release failure never hides the decrement's own
//! outcome. A caller that drops the future mid-operation still gets the key
//! released, from a task spawned by [`Grant`]'s destructor.

use crate::decrement::DecrementOperation;
use crate::lock::LockCapability;
use crate::pause::pause;
use sg_core::counter::validate_amount;
use sg_core::{BackoffPolicy, CoordinationConfig, Counter, CounterId, CounterStore, StockError};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::Instrument;

/// Runs a [`DecrementOperation`] while holding a [`LockCapability`]
pub struct LockedDecrementFacade<L, S> {
    lock: Arc<L>,
    operation: DecrementOperation<S>,
    key_prefix: String,
    acquire_timeout: Duration,
    acquire_retries: u32,
    backoff: BackoffPolicy,
}

impl<L: LockCapability, S: CounterStore> LockedDecrementFacade<L, S> {
    pub fn new(lock: L, store: Arc<S>, config: &CoordinationConfig) -> Self {
        Self {
            lock: Arc::new(lock),
            operation: DecrementOperation::new(store),
            key_prefix: config.key_prefix.clone(),
            acquire_timeout: config.lock.acquire_timeout,
            acquire_retries: config.facade.acquire_retries,
            backoff: config.facade.backoff.clone(),
        }
    }

    pub fn lock(&self) -> &L {
        &self.lock
    }

    pub fn key_for(&self, id: CounterId) -> String {
        id.lock_key(&self.key_prefix)
    }

    pub async fn decrement(&self, id: CounterId, amount: u64) -> Result<Counter, StockError> {
        let key = self.key_for(id);
        let span = tracing::info_span!("facade.decrement", lock = self.lock.name(), key = %key, amount);
        self.decrement_locked(id, amount, key).instrument(span).await
    }

    async fn decrement_locked(
        &self,
        id: CounterId,
        amount: u64,
        key: String,
    ) -> Result<Counter, StockError> {
        // Not worth a lock round-trip
        validate_amount(amount)?;

        self.acquire(&key).await?;
        let grant = Grant::new(self.lock.clone(), &key);
        let held_since = Instant::now();

        let outcome = self.operation.run(id, amount).await;

        let released = self.lock.release(&key).await;
        grant.disarm();

        match released {
            Ok(()) => {
                tracing::debug!(
                    held_ms = held_since.elapsed().as_millis() as u64,
                    ok = outcome.is_ok(),
                    "released"
                );
                outcome
            }
            Err(source) => {
                tracing::error!(
                    error = %source,
                    committed = outcome.is_ok(),
                    "release failed"
                );
                Err(StockError::LockReleaseFailure {
                    key,
                    source,
                    operation: Box::new(outcome),
                })
            }
        }
    }

    async fn acquire(&self, key: &str) -> Result<(), StockError> {
        let started = Instant::now();
        let mut retry = 0u32;

        loop {
            let granted = self
                .lock
                .try_acquire(key, self.acquire_timeout)
                .await
                .map_err(|source| {
                    tracing::error!(error = %source, "lock acquisition failed");
                    StockError::LockAcquire {
                        key: key.to_string(),
                        source,
                    }
                })?;
            if granted {
                return Ok(());
            }

            if retry >= self.acquire_retries {
                let waited = started.elapsed();
                tracing::warn!(waited_ms = waited.as_millis() as u64, "lock acquisition timed out");
                return Err(StockError::LockTimeout {
                    key: key.to_string(),
                    waited,
                });
            }

            let delay = self.backoff.delay(retry);
            tracing::debug!(retry, delay_ms = delay.as_millis() as u64, "acquisition timed out, retrying");
            pause(delay).await;
            retry += 1;
        }
    }
}

/// Releases a granted key if the facade future is dropped before it could
struct Grant<L: LockCapability> {
    lock: Arc<L>,
    key: String,
    armed: bool,
}

impl<L: LockCapability> Grant<L> {
    fn new(lock: Arc<L>, key: &str) -> Self {
        Self {
            lock,
            key: key.to_string(),
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<L: LockCapability> Drop for Grant<L> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        // Outside a runtime only a lease can free the key
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(key = %self.key, "dropped a granted lock outside a runtime");
            return;
        };

        let lock = self.lock.clone();
        let key = std::mem::take(&mut self.key);
        tracing::warn!(lock = lock.name(), key = %key, "decrement cancelled while holding the lock, releasing");
        handle.spawn(async move {
            if let Err(e) = lock.release(&key).await {
                tracing::error!(key = %key, error = %e, "release after cancellation failed");
            }
        });
    }
}

#[cfg(test)]
#[path = "facade_tests.rs"]
mod tests;
