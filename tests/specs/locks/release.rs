//! Release specs
//!
//! A granted lock is always given back, and a failed release is reported
//! together with what the decrement did.

use crate::prelude::*;

async fn assert_released_after_failure<L: LockCapability>(lock: L, deps: &Deps) {
    let facade = LockedDecrementFacade::new(lock, deps.store.clone(), &config(StrategyKind::SpinLock));

    let err = facade.decrement(COUNTER, 101).await.unwrap_err();
    assert!(matches!(err, StockError::InsufficientStock { .. }));

    assert!(
        facade
            .lock()
            .try_acquire("stock:1", Duration::ZERO)
            .await
            .unwrap(),
        "{} kept the key after a failed decrement",
        facade.lock().name()
    );
    facade.lock().release("stock:1").await.unwrap();
}

#[tokio::test]
async fn every_lock_is_released_after_a_failed_decrement() {
    let deps = seeded(100).await;
    let settings = LockSettings::default();

    assert_released_after_failure(InProcessMutexLock::new(), &deps).await;
    assert_released_after_failure(
        NamedLock::new(deps.store.clone(), SequentialIdGen::new("named"), &NamedLockConfig::default()),
        &deps,
    )
    .await;
    assert_released_after_failure(
        SpinLock::new(
            deps.backend.clone(),
            SequentialIdGen::new("spin"),
            &settings,
            BackoffPolicy::none(),
        ),
        &deps,
    )
    .await;
    assert_released_after_failure(
        NotifyLock::new(
            deps.backend.clone(),
            SequentialIdGen::new("notify"),
            &settings,
            &NotifyLockConfig::default(),
        ),
        &deps,
    )
    .await;
}

#[tokio::test]
async fn held_key_with_zero_budget_times_out_immediately() {
    let deps = seeded(100).await;
    let settings = LockSettings::default();
    let holder = SpinLock::new(deps.backend.clone(), SequentialIdGen::new("a"), &settings, BackoffPolicy::none());
    let contender = NotifyLock::new(
        deps.backend.clone(),
        SequentialIdGen::new("b"),
        &settings,
        &NotifyLockConfig::default(),
    );

    assert!(holder.try_acquire("stock:1", Duration::ZERO).await.unwrap());
    let started = std::time::Instant::now();
    assert!(!contender.try_acquire("stock:1", Duration::ZERO).await.unwrap());
    assert!(started.elapsed() < Duration::from_millis(500));

    let facade = LockedDecrementFacade::new(
        contender,
        deps.store.clone(),
        &config(StrategyKind::NotifyLock).with_acquire_timeout(Duration::ZERO),
    );
    assert!(matches!(
        facade.decrement(COUNTER, 1).await,
        Err(StockError::LockTimeout { .. })
    ));
    assert_eq!(quantity(&deps).await, 100);
}

#[tokio::test]
async fn failed_release_reports_the_committed_decrement() {
    let deps = seeded(100).await;
    let fake = FakeLockBackend::wrap((*deps.backend).clone());
    let lock = SpinLock::new(fake.clone(), SequentialIdGen::default(), &LockSettings::default(), BackoffPolicy::none());
    let facade = LockedDecrementFacade::new(lock, deps.store.clone(), &config(StrategyKind::SpinLock));
    fake.fail_delete(Some("connection reset"));

    let err = facade.decrement(COUNTER, 1).await.unwrap_err();

    assert!(matches!(err, StockError::LockReleaseFailure { .. }));
    assert_eq!(err.committed().map(|c| c.quantity), Some(99));
    assert!(err.to_string().contains("connection reset"));
    assert!(err.to_string().contains("operation committed"));
    // The key stays until its lease runs out
    assert!(deps.backend.value("stock:1").is_some());
}

#[tokio::test]
async fn failed_release_reports_the_failed_decrement() {
    let deps = seeded(100).await;
    let fake = FakeLockBackend::wrap((*deps.backend).clone());
    let lock = SpinLock::new(fake.clone(), SequentialIdGen::default(), &LockSettings::default(), BackoffPolicy::none());
    let facade = LockedDecrementFacade::new(lock, deps.store.clone(), &config(StrategyKind::SpinLock));
    fake.fail_delete(Some("connection reset"));

    let err = facade.decrement(COUNTER, 101).await.unwrap_err();

    match err {
        StockError::LockReleaseFailure { operation, .. } => {
            assert!(matches!(*operation, Err(StockError::InsufficientStock { .. })));
        }
        other => panic!("expected release failure, got {:?}", other),
    }
}
