// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backoff policy shared by the polling loops
//!
//! The spin lock, the optimistic retry loop and the facade's acquisition retry
//! all sleep between attempts. The policy is injected so tests can run with
//! [`BackoffPolicy::none`].

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Shape of the delay curve
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffKind {
    /// Same delay every attempt
    Fixed,
    /// Delay doubles every attempt, up to `max_interval`
    Exponential,
}

/// Delay between attempts of a retry loop
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BackoffPolicy {
    pub kind: BackoffKind,
    /// Delay before the first retry
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    /// Upper bound on the delay, before jitter
    #[serde(default, with = "humantime_serde")]
    pub max_interval: Option<Duration>,
    /// Random extra delay, as a fraction of the computed delay (0.0 to 1.0)
    #[serde(default)]
    pub jitter: f64,
}

impl BackoffPolicy {
    pub fn fixed(interval: Duration) -> Self {
        Self {
            kind: BackoffKind::Fixed,
            interval,
            max_interval: None,
            jitter: 0.0,
        }
    }

    pub fn exponential(initial: Duration, max: Duration) -> Self {
        Self {
            kind: BackoffKind::Exponential,
            interval: initial,
            max_interval: Some(max),
            jitter: 0.0,
        }
    }

    /// Retry immediately
    pub fn none() -> Self {
        Self::fixed(Duration::ZERO)
    }

    pub fn with_jitter(mut self, fraction: f64) -> Self {
        self.jitter = fraction.clamp(0.0, 1.0);
        self
    }

    pub fn with_max_interval(mut self, max: Duration) -> Self {
        self.max_interval = Some(max);
        self
    }

    /// Deterministic part of the delay after `attempt` failed attempts (0-based)
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let delay = match self.kind {
            BackoffKind::Fixed => self.interval,
            BackoffKind::Exponential => {
                let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
                self.interval.saturating_mul(factor)
            }
        };
        match self.max_interval {
            Some(max) => delay.min(max),
            None => delay,
        }
    }

    /// Delay to sleep after `attempt` failed attempts, jitter included
    pub fn delay(&self, attempt: u32) -> Duration {
        let base = self.base_delay(attempt);
        let jitter = self.jitter.clamp(0.0, 1.0);
        if base.is_zero() || jitter == 0.0 {
            return base;
        }

        // Fresh rng per call so no non-Send state is held across an await
        let span = base.mul_f64(jitter).as_nanos().min(u64::MAX as u128) as u64;
        let extra = rand::rng().random_range(0..=span);
        base.saturating_add(Duration::from_nanos(extra))
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::fixed(Duration::from_millis(100))
    }
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;
