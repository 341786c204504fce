// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Strategy selection
//!
//! Every strategy answers the same `decrement(id, amount)`. Which one runs
//! is decided once, at composition time, from [`CoordinationConfig`].

use crate::decrement::DecrementOperation;
use crate::facade::LockedDecrementFacade;
use crate::lock::{InProcessMutexLock, LockCapability, NamedLock, NotifyLock, SpinLock};
use crate::optimistic::OptimisticRetryCoordinator;
use async_trait::async_trait;
use sg_adapters::TracedLockBackend;
use sg_core::{
    AdvisoryLocks, CoordinationConfig, Counter, CounterId, CounterStore, IdGen, LockBackend,
    StockError, StrategyKind,
};
use std::sync::Arc;

/// A way of decrementing a counter under concurrency
#[async_trait]
pub trait DecrementStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    async fn decrement(&self, id: CounterId, amount: u64) -> Result<Counter, StockError>;
}

/// Read-modify-write with no coordination at all.
///
/// Loses updates as soon as two callers overlap; kept to demonstrate the race.
pub struct Unsynchronized<S> {
    operation: DecrementOperation<S>,
}

impl<S: CounterStore> Unsynchronized<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            operation: DecrementOperation::new(store),
        }
    }
}

#[async_trait]
impl<S: CounterStore> DecrementStrategy for Unsynchronized<S> {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Unsynchronized
    }

    async fn decrement(&self, id: CounterId, amount: u64) -> Result<Counter, StockError> {
        self.operation.run(id, amount).await
    }
}

/// Row lock taken with the read and held until the write commits
pub struct PessimisticDecrement<S> {
    operation: DecrementOperation<S>,
}

impl<S: CounterStore> PessimisticDecrement<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            operation: DecrementOperation::new(store),
        }
    }
}

#[async_trait]
impl<S: CounterStore> DecrementStrategy for PessimisticDecrement<S> {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Pessimistic
    }

    async fn decrement(&self, id: CounterId, amount: u64) -> Result<Counter, StockError> {
        self.operation.run_exclusive(id, amount).await
    }
}

#[async_trait]
impl<S: CounterStore> DecrementStrategy for OptimisticRetryCoordinator<S> {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Optimistic
    }

    async fn decrement(&self, id: CounterId, amount: u64) -> Result<Counter, StockError> {
        OptimisticRetryCoordinator::decrement(self, id, amount).await
    }
}

#[async_trait]
impl<L: LockCapability, S: CounterStore> DecrementStrategy for LockedDecrementFacade<L, S> {
    fn kind(&self) -> StrategyKind {
        self.lock().kind()
    }

    async fn decrement(&self, id: CounterId, amount: u64) -> Result<Counter, StockError> {
        LockedDecrementFacade::decrement(self, id, amount).await
    }
}

/// Collaborators a strategy may need
pub struct StrategyDeps<S, B, G> {
    /// Counter storage, also the advisory lock provider
    pub store: Arc<S>,
    /// Distributed lock backend shared by every process
    pub backend: Arc<B>,
    /// Holder tokens and advisory sessions
    pub id_gen: G,
}

/// Compose the strategy named by `kind`
pub fn build_strategy<S, B, G>(
    kind: StrategyKind,
    deps: &StrategyDeps<S, B, G>,
    config: &CoordinationConfig,
) -> Box<dyn DecrementStrategy>
where
    S: CounterStore + AdvisoryLocks,
    B: LockBackend,
    G: IdGen,
{
    tracing::debug!(strategy = %kind, multi_process_safe = kind.is_multi_process_safe(), "building strategy");
    let store = deps.store.clone();
    match kind {
        StrategyKind::Unsynchronized => Box::new(Unsynchronized::new(store)),
        StrategyKind::Pessimistic => Box::new(PessimisticDecrement::new(store)),
        StrategyKind::Optimistic => {
            Box::new(OptimisticRetryCoordinator::new(store, &config.optimistic))
        }
        StrategyKind::InProcessMutex => Box::new(LockedDecrementFacade::new(
            InProcessMutexLock::new(),
            store,
            config,
        )),
        StrategyKind::NamedLock => Box::new(LockedDecrementFacade::new(
            NamedLock::new(store.clone(), deps.id_gen.clone(), &config.named),
            store,
            config,
        )),
        StrategyKind::SpinLock => Box::new(LockedDecrementFacade::new(
            SpinLock::new(
                TracedLockBackend::new(deps.backend.clone()),
                deps.id_gen.clone(),
                &config.lock,
                config.spin.backoff.clone(),
            ),
            store,
            config,
        )),
        StrategyKind::NotifyLock => Box::new(LockedDecrementFacade::new(
            NotifyLock::new(
                TracedLockBackend::new(deps.backend.clone()),
                deps.id_gen.clone(),
                &config.lock,
                &config.notify,
            ),
            store,
            config,
        )),
    }
}

#[cfg(test)]
#[path = "strategy_tests.rs"]
mod tests;
