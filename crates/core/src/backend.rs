// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Distributed lock backend contract (a Redis-like key/value store)

use crate::error::BackendError;
use async_trait::async_trait;
use std::time::Duration;

/// Receiving end of a release-notification channel
#[async_trait]
pub trait Subscription: Send {
    /// Wait up to `budget` for the next message; `None` if none arrived
    async fn next_message(&mut self, budget: Duration) -> Result<Option<String>, BackendError>;
}

/// Key/value backend with TTL keys and publish/subscribe
#[async_trait]
pub trait LockBackend: Send + Sync + 'static {
    type Subscription: Subscription + 'static;

    /// Atomically set `key` to `value` with an expiry, only if absent (or expired)
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration)
        -> Result<bool, BackendError>;

    /// `true` if a live key was removed
    async fn delete(&self, key: &str) -> Result<bool, BackendError>;

    /// Remaining time to live of a live key
    async fn pttl(&self, key: &str) -> Result<Option<Duration>, BackendError>;

    /// Returns the number of subscribers that received the message
    async fn publish(&self, channel: &str, message: &str) -> Result<usize, BackendError>;

    /// Messages published after this call are delivered to the subscription
    async fn subscribe(&self, channel: &str) -> Result<Self::Subscription, BackendError>;
}

#[async_trait]
impl<B: LockBackend> LockBackend for std::sync::Arc<B> {
    type Subscription = B::Subscription;

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, BackendError> {
        (**self).set_if_absent(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<bool, BackendError> {
        (**self).delete(key).await
    }

    async fn pttl(&self, key: &str) -> Result<Option<Duration>, BackendError> {
        (**self).pttl(key).await
    }

    async fn publish(&self, channel: &str, message: &str) -> Result<usize, BackendError> {
        (**self).publish(channel, message).await
    }

    async fn subscribe(&self, channel: &str) -> Result<Self::Subscription, BackendError> {
        (**self).subscribe(channel).await
    }
}
