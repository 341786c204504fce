// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordination configuration
//!
//! Loaded from TOML. Every section is optional and falls back to the
//! defaults below:
//!
//! ```toml
//! strategy = "notify_lock"
//! key_prefix = "stock:"
//!
//! [lock]
//! acquire_timeout = "10s"
//! lease = "3s"
//!
//! [spin.backoff]
//! kind = "fixed"
//! interval = "100ms"
//!
//! [optimistic]
//! max_attempts = 500
//! ```

use crate::backoff::BackoffPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("TOML syntax error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Which coordination strategy protects the decrement
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Plain read-modify-write; loses updates under contention
    Unsynchronized,
    /// Per-key mutex in process memory; wrong across processes
    InProcessMutex,
    /// Row lock held for the duration of the write
    #[default]
    Pessimistic,
    /// Version check at write time, retried on conflict
    Optimistic,
    /// Named advisory lock coordinated by the store
    NamedLock,
    /// TTL key polled with sleep
    SpinLock,
    /// TTL key with release notifications
    NotifyLock,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 7] = [
        StrategyKind::Unsynchronized,
        StrategyKind::InProcessMutex,
        StrategyKind::Pessimistic,
        StrategyKind::Optimistic,
        StrategyKind::NamedLock,
        StrategyKind::SpinLock,
        StrategyKind::NotifyLock,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Unsynchronized => "unsynchronized",
            StrategyKind::InProcessMutex => "in_process_mutex",
            StrategyKind::Pessimistic => "pessimistic",
            StrategyKind::Optimistic => "optimistic",
            StrategyKind::NamedLock => "named_lock",
            StrategyKind::SpinLock => "spin_lock",
            StrategyKind::NotifyLock => "notify_lock",
        }
    }

    /// Strategies that stay correct when callers run in separate processes
    pub fn is_multi_process_safe(&self) -> bool {
        !matches!(
            self,
            StrategyKind::Unsynchronized | StrategyKind::InProcessMutex
        )
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings shared by every lock capability
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockSettings {
    /// Total budget for one acquisition
    #[serde(with = "humantime_serde")]
    pub acquire_timeout: Duration,
    /// TTL of distributed lock keys; a crashed holder's lock expires after this
    #[serde(with = "humantime_serde")]
    pub lease: Duration,
}

impl Default for LockSettings {
    fn default() -> Self {
        Self {
            acquire_timeout: Duration::from_secs(10),
            lease: Duration::from_millis(3000),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinLockConfig {
    pub backoff: BackoffPolicy,
}

impl Default for SpinLockConfig {
    fn default() -> Self {
        Self {
            backoff: BackoffPolicy::fixed(Duration::from_millis(100)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyLockConfig {
    /// Longest single wait for a release message before re-checking the key
    #[serde(with = "humantime_serde")]
    pub max_wait: Duration,
}

impl Default for NotifyLockConfig {
    fn default() -> Self {
        Self {
            max_wait: Duration::from_secs(1),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamedLockConfig {
    /// Server-side wait passed to the named-lock acquire
    #[serde(with = "humantime_serde")]
    pub wait: Duration,
}

impl Default for NamedLockConfig {
    fn default() -> Self {
        Self {
            wait: Duration::from_millis(3000),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimisticConfig {
    pub backoff: BackoffPolicy,
    /// Give up after this many conflicting attempts; unbounded when absent
    pub max_attempts: Option<u32>,
}

impl Default for OptimisticConfig {
    fn default() -> Self {
        Self {
            backoff: BackoffPolicy::fixed(Duration::from_millis(50)),
            max_attempts: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacadeConfig {
    /// Extra acquisition rounds after a timeout before surfacing it
    pub acquire_retries: u32,
    pub backoff: BackoffPolicy,
}

impl Default for FacadeConfig {
    fn default() -> Self {
        Self {
            acquire_retries: 0,
            backoff: BackoffPolicy::fixed(Duration::from_millis(100)),
        }
    }
}

/// Top-level coordination configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinationConfig {
    pub strategy: StrategyKind,
    /// Prepended to the counter id to form lock keys
    pub key_prefix: String,
    pub lock: LockSettings,
    pub spin: SpinLockConfig,
    pub notify: NotifyLockConfig,
    pub named: NamedLockConfig,
    pub optimistic: OptimisticConfig,
    pub facade: FacadeConfig,
}

impl CoordinationConfig {
    pub fn new(strategy: StrategyKind) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: CoordinationConfig = toml::from_str(content)?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), strategy = %config.strategy, "loaded coordination config");
        Ok(config)
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.lock.acquire_timeout = timeout;
        self
    }

    pub fn with_lease(mut self, lease: Duration) -> Self {
        self.lock.lease = lease;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.optimistic.max_attempts = Some(max_attempts);
        self
    }

    /// Replace every sleep with an immediate retry
    pub fn without_delays(mut self) -> Self {
        self.spin.backoff = BackoffPolicy::none();
        self.optimistic.backoff = BackoffPolicy::none();
        self.facade.backoff = BackoffPolicy::none();
        self
    }
}
