// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spin (polling) distributed lock
//!
//! Keeps trying `set_if_absent` until granted or the budget runs out,
//! sleeping per the backoff policy between attempts. The key carries a lease
//! so a crashed holder is reclaimed once it expires.

use super::{warn_unheld, Holdings, LockCapability};
use crate::pause::pause;
use async_trait::async_trait;
use sg_core::{BackoffPolicy, IdGen, LockBackend, LockError, LockSettings, StrategyKind, FAR_FUTURE};
use std::time::Duration;
use tokio::time::Instant;

pub struct SpinLock<B, G> {
    backend: B,
    id_gen: G,
    lease: Duration,
    backoff: BackoffPolicy,
    tokens: Holdings<String>,
}

impl<B: LockBackend, G: IdGen> SpinLock<B, G> {
    pub fn new(backend: B, id_gen: G, lock: &LockSettings, backoff: BackoffPolicy) -> Self {
        Self {
            backend,
            id_gen,
            lease: lock.lease,
            backoff,
            tokens: Holdings::new(),
        }
    }

    pub fn holds(&self, key: &str) -> bool {
        self.tokens.contains(key)
    }
}

#[async_trait]
impl<B: LockBackend, G: IdGen> LockCapability for SpinLock<B, G> {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SpinLock
    }

    async fn try_acquire(&self, key: &str, timeout: Duration) -> Result<bool, LockError> {
        let token = self.id_gen.next();
        let deadline = Instant::now() + timeout.min(FAR_FUTURE);
        let mut attempt = 0u32;

        loop {
            if self.backend.set_if_absent(key, &token, self.lease).await? {
                tracing::trace!(key, holder = %token, attempt, "spin lock granted");
                self.tokens.insert(key, token);
                return Ok(true);
            }

            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                return Ok(false);
            }

            let delay = self.backoff.delay(attempt).min(left);
            tracing::debug!(key, attempt, delay_ms = delay.as_millis() as u64, "lock held, spinning");
            pause(delay).await;
            attempt = attempt.saturating_add(1);
        }
    }

    async fn release(&self, key: &str) -> Result<(), LockError> {
        if self.tokens.take(key).is_none() {
            warn_unheld(self.kind(), key);
            return Ok(());
        }
        if !self.backend.delete(key).await? {
            tracing::warn!(key, "lease expired before release");
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "spin_tests.rs"]
mod tests;
