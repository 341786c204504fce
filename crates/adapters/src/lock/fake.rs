// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake lock backend for testing
//!
//! Delegates to a [`MemoryLockBackend`] while recording calls and injecting
//! failures on demand.
#![cfg_attr(coverage_nightly, coverage(off))]

use super::memory::{MemoryLockBackend, MemorySubscription};
use async_trait::async_trait;
use sg_core::{BackendError, Clock, LockBackend, SystemClock};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Recorded backend call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    SetIfAbsent { key: String, value: String, ttl: Duration },
    Delete { key: String },
    Pttl { key: String },
    Publish { channel: String, message: String },
    Subscribe { channel: String },
}

#[derive(Default)]
struct Failures {
    set_if_absent: Option<String>,
    delete: Option<String>,
    publish: Option<String>,
}

/// Fake lock backend for testing
#[derive(Clone)]
pub struct FakeLockBackend<C: Clock = SystemClock> {
    inner: MemoryLockBackend<C>,
    calls: Arc<Mutex<Vec<BackendCall>>>,
    failures: Arc<Mutex<Failures>>,
}

impl FakeLockBackend<SystemClock> {
    pub fn new() -> Self {
        Self::wrap(MemoryLockBackend::new())
    }
}

impl Default for FakeLockBackend<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> FakeLockBackend<C> {
    pub fn wrap(inner: MemoryLockBackend<C>) -> Self {
        Self {
            inner,
            calls: Arc::new(Mutex::new(Vec::new())),
            failures: Arc::new(Mutex::new(Failures::default())),
        }
    }

    /// The backend the fake delegates to
    pub fn backend(&self) -> &MemoryLockBackend<C> {
        &self.inner
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Fail every `set_if_absent` until cleared with `None`
    pub fn fail_set_if_absent(&self, reason: Option<&str>) {
        self.failures().set_if_absent = reason.map(str::to_string);
    }

    /// Fail every `delete` until cleared with `None`
    pub fn fail_delete(&self, reason: Option<&str>) {
        self.failures().delete = reason.map(str::to_string);
    }

    /// Fail every `publish` until cleared with `None`
    pub fn fail_publish(&self, reason: Option<&str>) {
        self.failures().publish = reason.map(str::to_string);
    }

    fn failures(&self) -> std::sync::MutexGuard<'_, Failures> {
        self.failures.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, call: BackendCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }
}

#[async_trait]
impl<C: Clock> LockBackend for FakeLockBackend<C> {
    type Subscription = MemorySubscription;

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, BackendError> {
        self.record(BackendCall::SetIfAbsent {
            key: key.to_string(),
            value: value.to_string(),
            ttl,
        });
        let failure = self.failures().set_if_absent.clone();
        if let Some(reason) = failure {
            return Err(BackendError::Injected(reason));
        }
        self.inner.set_if_absent(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<bool, BackendError> {
        self.record(BackendCall::Delete {
            key: key.to_string(),
        });
        let failure = self.failures().delete.clone();
        if let Some(reason) = failure {
            return Err(BackendError::Injected(reason));
        }
        self.inner.delete(key).await
    }

    async fn pttl(&self, key: &str) -> Result<Option<Duration>, BackendError> {
        self.record(BackendCall::Pttl {
            key: key.to_string(),
        });
        self.inner.pttl(key).await
    }

    async fn publish(&self, channel: &str, message: &str) -> Result<usize, BackendError> {
        self.record(BackendCall::Publish {
            channel: channel.to_string(),
            message: message.to_string(),
        });
        let failure = self.failures().publish.clone();
        if let Some(reason) = failure {
            return Err(BackendError::Injected(reason));
        }
        self.inner.publish(channel, message).await
    }

    async fn subscribe(&self, channel: &str) -> Result<MemorySubscription, BackendError> {
        self.record(BackendCall::Subscribe {
            channel: channel.to_string(),
        });
        self.inner.subscribe(channel).await
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
