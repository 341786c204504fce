// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Stockguard decrement engine
//!
//! Every strategy funnels into the same [`DecrementOperation`]; they differ
//! only in how they keep concurrent callers from losing each other's writes.

mod decrement;
mod facade;
pub mod lock;
mod optimistic;
mod pause;
mod strategy;

pub use decrement::DecrementOperation;
pub use facade::LockedDecrementFacade;
pub use lock::{InProcessMutexLock, LockCapability, NamedLock, NotifyLock, SpinLock};
pub use optimistic::OptimisticRetryCoordinator;
pub use strategy::{
    build_strategy, DecrementStrategy, PessimisticDecrement, StrategyDeps, Unsynchronized,
};
