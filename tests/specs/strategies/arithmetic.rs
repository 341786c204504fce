//! Arithmetic specs
//!
//! The same answers regardless of which strategy runs the decrement.

use crate::prelude::*;

#[tokio::test]
async fn single_decrement_subtracts_and_bumps_version() {
    for kind in StrategyKind::ALL {
        let deps = seeded(100).await;
        let strategy = build_strategy(kind, &deps, &config(kind));

        let counter = strategy.decrement(COUNTER, 1).await.unwrap();

        assert_eq!(counter.quantity, 99, "{}", kind);
        assert_eq!(counter.version, 1, "{}", kind);
    }
}

#[tokio::test]
async fn overdraw_is_refused_and_changes_nothing() {
    for kind in StrategyKind::ALL {
        let deps = seeded(100).await;
        let strategy = build_strategy(kind, &deps, &config(kind));

        let err = strategy.decrement(COUNTER, 101).await.unwrap_err();

        assert!(
            matches!(
                err,
                StockError::InsufficientStock {
                    requested: 101,
                    available: 100,
                    ..
                }
            ),
            "{} returned {:?}",
            kind,
            err
        );
        assert!(!err.is_transient());
        let counter = deps.store.get(COUNTER).await.unwrap();
        assert_eq!((counter.quantity, counter.version), (100, 0), "{}", kind);
    }
}

#[tokio::test]
async fn zero_amount_is_invalid() {
    for kind in StrategyKind::ALL {
        let deps = seeded(100).await;
        let strategy = build_strategy(kind, &deps, &config(kind));

        assert!(
            matches!(
                strategy.decrement(COUNTER, 0).await,
                Err(StockError::InvalidArgument(_))
            ),
            "{}",
            kind
        );
    }
}

#[tokio::test]
async fn draining_exactly_to_zero_is_allowed() {
    let deps = seeded(3).await;
    let strategy = build_strategy(StrategyKind::NotifyLock, &deps, &config(StrategyKind::NotifyLock));

    assert_eq!(strategy.decrement(COUNTER, 3).await.unwrap().quantity, 0);
    assert!(matches!(
        strategy.decrement(COUNTER, 1).await,
        Err(StockError::InsufficientStock { available: 0, .. })
    ));
}
