// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced backend wrapper for consistent observability

use async_trait::async_trait;
use sg_core::{BackendError, LockBackend};
use std::time::{Duration, Instant};
use tracing::Instrument;

/// Wrapper that adds tracing to any LockBackend
#[derive(Clone)]
pub struct TracedLockBackend<B> {
    inner: B,
}

impl<B> TracedLockBackend<B> {
    pub fn new(inner: B) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }
}

#[async_trait]
impl<B: LockBackend> LockBackend for TracedLockBackend<B> {
    type Subscription = B::Subscription;

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, BackendError> {
        let span = tracing::info_span!("backend.set_if_absent", key, ttl_ms = ttl.as_millis() as u64);
        async {
            let start = Instant::now();
            let result = self.inner.set_if_absent(key, value, ttl).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(true) => tracing::info!(holder = value, elapsed_ms, "key set"),
                Ok(false) => tracing::trace!(elapsed_ms, "key already held"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "set_if_absent failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn delete(&self, key: &str) -> Result<bool, BackendError> {
        let span = tracing::info_span!("backend.delete", key);
        async {
            let result = self.inner.delete(key).await;
            match &result {
                Ok(true) => tracing::info!("key deleted"),
                // Expired before release
                Ok(false) => tracing::warn!("key was already gone"),
                Err(e) => tracing::error!(error = %e, "delete failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn pttl(&self, key: &str) -> Result<Option<Duration>, BackendError> {
        let result = self.inner.pttl(key).await;
        tracing::trace!(
            key,
            remaining_ms = ?result.as_ref().ok().copied().flatten().map(|d| d.as_millis() as u64),
            "checked ttl"
        );
        result
    }

    async fn publish(&self, channel: &str, message: &str) -> Result<usize, BackendError> {
        let span = tracing::debug_span!("backend.publish", channel);
        async {
            let result = self.inner.publish(channel, message).await;
            match &result {
                Ok(receivers) => tracing::debug!(receivers, "published"),
                Err(e) => tracing::warn!(error = %e, "publish failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn subscribe(&self, channel: &str) -> Result<B::Subscription, BackendError> {
        let result = self.inner.subscribe(channel).await;
        if let Err(e) = &result {
            tracing::error!(channel, error = %e, "subscribe failed");
        } else {
            tracing::trace!(channel, "subscribed");
        }
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
