//! Lease expiry specs
//!
//! A holder that dies without releasing blocks others only until its lease
//! runs out.

use crate::prelude::*;
use sg_core::FakeClock;

#[tokio::test]
async fn spin_lock_reclaims_crashed_holders_key() {
    let clock = FakeClock::new();
    let backend = MemoryLockBackend::with_clock(clock.clone());
    let settings = LockSettings::default();
    let crashed = SpinLock::new(backend.clone(), SequentialIdGen::new("crashed"), &settings, BackoffPolicy::none());
    let survivor = SpinLock::new(backend.clone(), SequentialIdGen::new("survivor"), &settings, BackoffPolicy::none());

    assert!(crashed.try_acquire("stock:1", Duration::ZERO).await.unwrap());
    assert!(!survivor.try_acquire("stock:1", Duration::ZERO).await.unwrap());

    clock.advance(settings.lease);

    assert!(survivor.try_acquire("stock:1", Duration::ZERO).await.unwrap());
}

#[tokio::test]
async fn notify_lock_waiter_takes_over_after_lease_without_a_release() {
    let store = Arc::new(MemoryCounterStore::new());
    store.insert(Counter::new(COUNTER, 1, 10)).await.unwrap();
    let backend = MemoryLockBackend::new();
    let short_lease = LockSettings {
        lease: Duration::from_millis(100),
        ..LockSettings::default()
    };
    let patient = NotifyLockConfig {
        max_wait: Duration::from_secs(30),
    };

    let crashed = NotifyLock::new(backend.clone(), SequentialIdGen::new("crashed"), &short_lease, &patient);
    assert!(crashed.try_acquire("stock:1", Duration::ZERO).await.unwrap());

    let facade = LockedDecrementFacade::new(
        NotifyLock::new(backend.clone(), SequentialIdGen::new("survivor"), &short_lease, &patient),
        store.clone(),
        &config(StrategyKind::NotifyLock).with_acquire_timeout(Duration::from_secs(10)),
    );

    let started = std::time::Instant::now();
    let counter = facade.decrement(COUNTER, 1).await.unwrap();

    assert_eq!(counter.quantity, 9);
    // Woken by the lease running out, not by the 30s notification cap
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(backend.value("stock:1"), None);
}

#[tokio::test]
async fn late_release_after_expiry_is_harmless_to_the_caller() {
    let clock = FakeClock::new();
    let backend = MemoryLockBackend::with_clock(clock.clone());
    let settings = LockSettings::default();
    let slow = SpinLock::new(backend.clone(), SequentialIdGen::new("slow"), &settings, BackoffPolicy::none());

    slow.try_acquire("stock:1", Duration::ZERO).await.unwrap();
    clock.advance(settings.lease);

    // The key is already gone; releasing it is only logged
    slow.release("stock:1").await.unwrap();
    assert_eq!(backend.value("stock:1"), None);
}
