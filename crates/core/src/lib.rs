// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sg-core: Core library for stockguard
//!
//! This crate provides:
//! - The inventory counter and its pure decrement arithmetic
//! - The error taxonomy shared by every strategy
//! - Collaborator traits for the counter store and the distributed lock backend
//! - Clock, id generation, backoff and configuration plumbing

pub mod clock;
pub mod id;

pub mod backend;
pub mod backoff;
pub mod config;
pub mod counter;
pub mod error;
pub mod operation;
pub mod store;

// Re-exports
pub use backend::{LockBackend, Subscription};
pub use backoff::{BackoffKind, BackoffPolicy};
pub use clock::{Clock, FakeClock, SystemClock, FAR_FUTURE};
pub use config::{
    ConfigError, CoordinationConfig, FacadeConfig, LockSettings, NamedLockConfig,
    NotifyLockConfig, OptimisticConfig, SpinLockConfig, StrategyKind,
};
pub use counter::{Counter, CounterId};
pub use error::{BackendError, LockError, StockError, StoreError};
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
pub use operation::Operation;
pub use store::{AdvisoryLocks, CasOutcome, CounterStore, ExclusiveCounter, SessionId};
