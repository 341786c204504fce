// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification-based distributed lock
//!
//! Contenders park on the key's release channel instead of polling. Each
//! wait is bounded by the holder's remaining lease, so a holder that crashed
//! without publishing still hands the key over once its lease runs out.

use super::{warn_unheld, Holdings, LockCapability};
use async_trait::async_trait;
use sg_core::{
    IdGen, LockBackend, LockError, LockSettings, NotifyLockConfig, StrategyKind, Subscription,
    FAR_FUTURE,
};
use std::time::Duration;
use tokio::time::Instant;

/// Message published when a key is released
pub const RELEASED: &str = "released";

/// Release channel for a lock key
pub fn release_channel(key: &str) -> String {
    format!("{}:released", key)
}

pub struct NotifyLock<B, G> {
    backend: B,
    id_gen: G,
    lease: Duration,
    max_wait: Duration,
    tokens: Holdings<String>,
}

impl<B: LockBackend, G: IdGen> NotifyLock<B, G> {
    pub fn new(backend: B, id_gen: G, lock: &LockSettings, notify: &NotifyLockConfig) -> Self {
        Self {
            backend,
            id_gen,
            lease: lock.lease,
            max_wait: notify.max_wait,
            tokens: Holdings::new(),
        }
    }

    pub fn holds(&self, key: &str) -> bool {
        self.tokens.contains(key)
    }
}

#[async_trait]
impl<B: LockBackend, G: IdGen> LockCapability for NotifyLock<B, G> {
    fn kind(&self) -> StrategyKind {
        StrategyKind::NotifyLock
    }

    async fn try_acquire(&self, key: &str, timeout: Duration) -> Result<bool, LockError> {
        let token = self.id_gen.next();
        let deadline = Instant::now() + timeout.min(FAR_FUTURE);
        // Subscribe before the first attempt so a release in between is not missed
        let mut subscription = self.backend.subscribe(&release_channel(key)).await?;

        loop {
            if self.backend.set_if_absent(key, &token, self.lease).await? {
                tracing::trace!(key, holder = %token, "notify lock granted");
                self.tokens.insert(key, token);
                return Ok(true);
            }

            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                return Ok(false);
            }

            // Key vanished between the two calls: try again straight away
            let Some(lease_left) = self.backend.pttl(key).await? else {
                continue;
            };

            let wait = left.min(lease_left).min(self.max_wait);
            tracing::debug!(key, wait_ms = wait.as_millis() as u64, "lock held, waiting for release");
            subscription.next_message(wait).await?;
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

        // Waiters fall back to their bounded wait if this is lost
        if let Err(e) = self.backend.publish(&release_channel(key), RELEASED).await {
            tracing::warn!(key, error = %e, "failed to publish release");
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "notify_tests.rs"]
mod tests;
