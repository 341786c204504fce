//! Persistence specs
//!
//! Decrements made through any strategy survive a restart of the store.

use crate::prelude::*;

#[tokio::test]
async fn decrements_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("counters.wal");

    {
        let store = MemoryCounterStore::open(&path).unwrap();
        let deps = seeded_with(store, 100).await;
        for kind in [
            StrategyKind::Pessimistic,
            StrategyKind::Optimistic,
            StrategyKind::NamedLock,
            StrategyKind::SpinLock,
        ] {
            let strategy = build_strategy(kind, &deps, &config(kind));
            strategy.decrement(COUNTER, 5).await.unwrap();
        }
        // A refused decrement writes nothing
        let strategy = build_strategy(StrategyKind::Pessimistic, &deps, &config(StrategyKind::Pessimistic));
        strategy.decrement(COUNTER, 1000).await.unwrap_err();
    }

    let reopened = MemoryCounterStore::open(&path).unwrap();
    let counter = reopened.get(COUNTER).await.unwrap();
    assert_eq!(counter.quantity, 80);
    assert_eq!(counter.version, 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_decrements_are_all_logged() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("counters.wal");

    {
        let store = MemoryCounterStore::open(&path).unwrap();
        let deps = seeded_with(store, 40).await;
        let results = decrement_concurrently(&deps, StrategyKind::Optimistic, 2, 40).await;
        assert!(results.iter().all(Result::is_ok));
    }

    let reopened = MemoryCounterStore::open(&path).unwrap();
    let counter = reopened.get(COUNTER).await.unwrap();
    assert_eq!((counter.quantity, counter.version), (0, 40));
}
