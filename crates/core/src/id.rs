// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Holder token generation
//!
//! Distributed locks store a token naming their current holder, and advisory
//! locks open one session per acquisition. Both come from an [`IdGen`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Generates unique holder tokens
pub trait IdGen: Clone + Send + Sync + 'static {
    fn next(&self) -> String;
}

/// UUID-based generator for production use
#[derive(Clone, Default)]
pub struct UuidIdGen {
    prefix: Option<String>,
}

impl UuidIdGen {
    /// Tag every token, e.g. with a process name, to make holders readable in the backend
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }
}

impl IdGen for UuidIdGen {
    fn next(&self) -> String {
        let uuid = uuid::Uuid::new_v4();
        match &self.prefix {
            Some(prefix) => format!("{}-{}", prefix, uuid),
            None => uuid.to_string(),
        }
    }
}

/// Sequential generator for testing
#[derive(Clone)]
pub struct SequentialIdGen {
    prefix: String,
    counter: Arc<AtomicU64>,
}

impl SequentialIdGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl Default for SequentialIdGen {
    fn default() -> Self {
        Self::new("holder")
    }
}

impl IdGen for SequentialIdGen {
    fn next(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("{}-{}", self.prefix, n)
    }
}
