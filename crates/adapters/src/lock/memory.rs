// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory lock backend with TTL keys and publish/subscribe
//!
//! Stands in for a Redis-like server. Instances sharing one backend behave
//! like separate processes talking to the same server.

use async_trait::async_trait;
use sg_core::{BackendError, Clock, LockBackend, Subscription, SystemClock, FAR_FUTURE};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::broadcast;

/// Buffered messages per channel before slow subscribers lag
const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

struct Shared<C> {
    clock: C,
    keys: Mutex<HashMap<String, Entry>>,
    channels: Mutex<HashMap<String, broadcast::Sender<String>>>,
}

/// Lock backend kept in process memory
#[derive(Clone)]
pub struct MemoryLockBackend<C: Clock = SystemClock> {
    shared: Arc<Shared<C>>,
}

impl MemoryLockBackend<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for MemoryLockBackend<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> MemoryLockBackend<C> {
    /// Use `clock` to stamp and expire keys
    pub fn with_clock(clock: C) -> Self {
        Self {
            shared: Arc::new(Shared {
                clock,
                keys: Mutex::new(HashMap::new()),
                channels: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Value of a live key
    pub fn value(&self, key: &str) -> Option<String> {
        let keys = self.keys();
        keys.get(key)
            .filter(|entry| self.is_live(entry))
            .map(|entry| entry.value.clone())
    }

    fn keys(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
        self.shared.keys.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn channels(&self) -> std::sync::MutexGuard<'_, HashMap<String, broadcast::Sender<String>>> {
        self.shared.channels.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_live(&self, entry: &Entry) -> bool {
        self.shared.clock.remaining(entry.expires_at).is_some()
    }
}

#[async_trait]
impl<C: Clock> LockBackend for MemoryLockBackend<C> {
    type Subscription = MemorySubscription;

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, BackendError> {
        let mut keys = self.keys();
        if let Some(entry) = keys.get(key) {
            if self.is_live(entry) {
                return Ok(false);
            }
        }
        keys.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: self.shared.clock.deadline_after(ttl),
            },
        );
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<bool, BackendError> {
        let removed = self.keys().remove(key);
        Ok(removed.is_some_and(|entry| self.is_live(&entry)))
    }

    async fn pttl(&self, key: &str) -> Result<Option<Duration>, BackendError> {
        let keys = self.keys();
        Ok(keys
            .get(key)
            .and_then(|entry| self.shared.clock.remaining(entry.expires_at)))
    }

    async fn publish(&self, channel: &str, message: &str) -> Result<usize, BackendError> {
        let mut channels = self.channels();
        let Some(sender) = channels.get(channel) else {
            return Ok(0);
        };
        match sender.send(message.to_string()) {
            Ok(receivers) => Ok(receivers),
            Err(_) => {
                // Nobody listening any more
                channels.remove(channel);
                Ok(0)
            }
        }
    }

    async fn subscribe(&self, channel: &str) -> Result<MemorySubscription, BackendError> {
        let receiver = self
            .channels()
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe();
        Ok(MemorySubscription {
            channel: channel.to_string(),
            receiver,
        })
    }
}

/// Subscription to one channel of a [`MemoryLockBackend`]
pub struct MemorySubscription {
    channel: String,
    receiver: broadcast::Receiver<String>,
}

#[async_trait]
impl Subscription for MemorySubscription {
    async fn next_message(&mut self, budget: Duration) -> Result<Option<String>, BackendError> {
        let deadline = tokio::time::Instant::now() + budget.min(FAR_FUTURE);
        loop {
            match tokio::time::timeout_at(deadline, self.receiver.recv()).await {
                Err(_) => return Ok(None),
                Ok(Ok(message)) => return Ok(Some(message)),
                // Missed messages still mean something was released
                Ok(Err(broadcast::error::RecvError::Lagged(skipped))) => {
                    tracing::trace!(channel = %self.channel, skipped, "subscription lagged");
                    continue;
                }
                Ok(Err(broadcast::error::RecvError::Closed)) => {
                    return Err(BackendError::Unavailable(format!(
                        "channel {} closed",
                        self.channel
                    )))
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
