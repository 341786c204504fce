// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction for lease expiry
//!
//! Lock backends stamp TTL keys with deadlines from a [`Clock`], so tests can
//! expire a crashed holder's lease by advancing a [`FakeClock`] instead of
//! sleeping.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Cap applied to waits and leases before they are turned into deadlines.
/// Anything longer, up to `Duration::MAX`, means "no deadline".
pub const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// A clock that provides the current time
pub trait Clock: Clone + Send + Sync + 'static {
    fn now(&self) -> Instant;

    /// Absolute deadline `ttl` from now
    fn deadline_after(&self, ttl: Duration) -> Instant {
        self.now() + ttl.min(FAR_FUTURE)
    }

    /// Time left until `deadline`, or `None` once it has passed
    fn remaining(&self, deadline: Instant) -> Option<Duration> {
        let left = deadline.saturating_duration_since(self.now());
        (!left.is_zero()).then_some(left)
    }
}

/// Real system clock
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Fake clock for testing with controllable time
#[derive(Clone)]
pub struct FakeClock {
    current: Arc<Mutex<Instant>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            current: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Advance the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current += duration;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
