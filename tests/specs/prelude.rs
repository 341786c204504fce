//! Shared fixtures for the behavioral specs

#![allow(dead_code)]

pub use sg_adapters::{FakeLockBackend, MemoryLockBackend};
pub use sg_core::{
    BackoffPolicy, CoordinationConfig, Counter, CounterId, CounterStore, LockBackend, LockSettings,
    NamedLockConfig, NotifyLockConfig, SequentialIdGen, StockError, StrategyKind,
};
pub use sg_engine::{
    build_strategy, DecrementStrategy, InProcessMutexLock, LockCapability, LockedDecrementFacade,
    NamedLock, NotifyLock, SpinLock, StrategyDeps,
};
pub use sg_storage::MemoryCounterStore;
pub use std::sync::Arc;
pub use std::time::Duration;

pub const COUNTER: CounterId = CounterId(1);

/// Everything a process needs, sharing one store and one lock backend
pub type Deps = StrategyDeps<MemoryCounterStore, MemoryLockBackend, SequentialIdGen>;

pub async fn seeded(quantity: u64) -> Deps {
    seeded_with(MemoryCounterStore::new(), quantity).await
}

pub async fn seeded_with(store: MemoryCounterStore, quantity: u64) -> Deps {
    store.insert(Counter::new(COUNTER, 1, quantity)).await.unwrap();
    StrategyDeps {
        store: Arc::new(store),
        backend: Arc::new(MemoryLockBackend::new()),
        id_gen: SequentialIdGen::new("process"),
    }
}

/// Test config: short sleeps so contention resolves quickly
pub fn config(kind: StrategyKind) -> CoordinationConfig {
    let mut config = CoordinationConfig::new(kind).with_key_prefix("stock:");
    config.spin.backoff = BackoffPolicy::fixed(Duration::from_millis(1)).with_jitter(0.5);
    config.optimistic.backoff = BackoffPolicy::fixed(Duration::from_millis(1)).with_jitter(0.5);
    config.named.wait = Duration::from_secs(10);
    config.notify.max_wait = Duration::from_millis(200);
    config.with_acquire_timeout(Duration::from_secs(30))
}

/// Run `callers` decrements of 1, spread over `processes` strategy instances
pub async fn decrement_concurrently(
    deps: &Deps,
    kind: StrategyKind,
    processes: usize,
    callers: usize,
) -> Vec<Result<Counter, StockError>> {
    let config = config(kind);
    let strategies: Vec<Arc<dyn DecrementStrategy>> = (0..processes)
        .map(|_| Arc::from(build_strategy(kind, deps, &config)))
        .collect();

    let mut handles = Vec::new();
    for n in 0..callers {
        let strategy = strategies[n % processes].clone();
        handles.push(tokio::spawn(async move {
            strategy.decrement(COUNTER, 1).await
        }));
    }

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap());
    }
    results
}

pub async fn quantity(deps: &Deps) -> u64 {
    deps.store.get(COUNTER).await.unwrap().quantity
}
