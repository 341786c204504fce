//! Contention specs
//!
//! One hundred callers each take one unit from a counter of one hundred.

use crate::prelude::*;

async fn assert_no_lost_updates(kind: StrategyKind, processes: usize) {
    let deps = seeded(100).await;

    let results = decrement_concurrently(&deps, kind, processes, 100).await;

    for result in &results {
        assert!(result.is_ok(), "{} failed a decrement: {:?}", kind, result);
    }
    let counter = deps.store.get(COUNTER).await.unwrap();
    assert_eq!(counter.quantity, 0, "{} lost updates", kind);
    assert_eq!(counter.version, 100);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn pessimistic_loses_no_updates() {
    assert_no_lost_updates(StrategyKind::Pessimistic, 4).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn optimistic_loses_no_updates() {
    assert_no_lost_updates(StrategyKind::Optimistic, 4).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn named_lock_loses_no_updates() {
    assert_no_lost_updates(StrategyKind::NamedLock, 4).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn spin_lock_loses_no_updates() {
    assert_no_lost_updates(StrategyKind::SpinLock, 4).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn notify_lock_loses_no_updates() {
    assert_no_lost_updates(StrategyKind::NotifyLock, 4).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn in_process_mutex_loses_no_updates_within_one_process() {
    assert_no_lost_updates(StrategyKind::InProcessMutex, 1).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn unsynchronized_loses_updates() {
    let mut finals = std::collections::BTreeSet::new();

    for _ in 0..5 {
        // A store round-trip wide enough for reads to interleave
        let store = MemoryCounterStore::new().with_latency(Duration::from_millis(1));
        let deps = seeded_with(store, 100).await;

        let results = decrement_concurrently(&deps, StrategyKind::Unsynchronized, 1, 100).await;

        assert!(results.iter().all(Result::is_ok));
        let counter = deps.store.get(COUNTER).await.unwrap();
        // Every write landed, yet writes overwrote each other
        assert_eq!(counter.version, 100);
        assert!(counter.quantity > 0, "no update was lost");
        finals.insert(counter.quantity);
    }

    // How many distinct outcomes depends on scheduling
    eprintln!("unsynchronized final quantities over 5 runs: {:?}", finals);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn in_process_mutex_is_not_safe_across_processes() {
    let store = MemoryCounterStore::new().with_latency(Duration::from_millis(1));
    let deps = seeded_with(store, 100).await;

    decrement_concurrently(&deps, StrategyKind::InProcessMutex, 4, 100).await;

    assert!(!StrategyKind::InProcessMutex.is_multi_process_safe());
    assert!(quantity(&deps).await > 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn quantity_never_goes_negative() {
    for kind in StrategyKind::ALL
        .into_iter()
        .filter(|kind| kind.is_multi_process_safe())
    {
        let deps = seeded(30).await;

        let results = decrement_concurrently(&deps, kind, 3, 50).await;

        let granted = results.iter().filter(|r| r.is_ok()).count();
        let refused = results
            .iter()
            .filter(|r| matches!(r, Err(StockError::InsufficientStock { .. })))
            .count();
        assert_eq!((granted, refused), (30, 20), "{} miscounted", kind);
        assert_eq!(quantity(&deps).await, 0);
    }
}
