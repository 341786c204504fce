// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn store_not_found_maps_to_stock_not_found() {
    let err: StockError = StoreError::NotFound(CounterId(3)).into();
    assert!(matches!(err, StockError::NotFound(CounterId(3))));
}

#[test]
fn other_store_errors_stay_storage() {
    let err: StockError = StoreError::Unavailable("down".to_string()).into();
    assert!(matches!(err, StockError::Storage(StoreError::Unavailable(_))));
}

#[test]
fn contention_errors_are_transient() {
    assert!(StockError::VersionConflict {
        id: CounterId(1),
        attempts: 3
    }
    .is_transient());
    assert!(StockError::LockTimeout {
        key: "1".to_string(),
        waited: Duration::ZERO
    }
    .is_transient());
    assert!(!StockError::InsufficientStock {
        id: CounterId(1),
        requested: 2,
        available: 1
    }
    .is_transient());
    assert!(!StockError::NotFound(CounterId(1)).is_transient());
}

#[test]
fn release_failure_reports_both_errors() {
    let err = StockError::LockReleaseFailure {
        key: "1".to_string(),
        source: LockError::Backend(BackendError::Unavailable("conn reset".to_string())),
        operation: Box::new(Err(StockError::InsufficientStock {
            id: CounterId(1),
            requested: 5,
            available: 2,
        })),
    };

    let message = err.to_string();
    assert!(message.contains("failed to release lock 1"), "{}", message);
    assert!(message.contains("conn reset"), "{}", message);
    assert!(message.contains("insufficient stock"), "{}", message);
    assert!(err.committed().is_none());
}

#[test]
fn release_failure_after_commit_exposes_counter() {
    let counter = Counter::new(1, 1, 9);
    let err = StockError::LockReleaseFailure {
        key: "1".to_string(),
        source: LockError::Backend(BackendError::Injected("boom".to_string())),
        operation: Box::new(Ok(counter.clone())),
    };

    assert_eq!(err.committed(), Some(&counter));
    assert!(!err.is_transient());
    assert!(err.to_string().contains("operation committed"));
}
