//! Configuration specs
//!
//! A strategy built from a TOML file behaves like one built in code.

use crate::prelude::*;

const SPIN_CONFIG: &str = r#"
strategy = "spin_lock"
key_prefix = "stock:"

[lock]
acquire_timeout = "250ms"
lease = "3s"

[spin.backoff]
kind = "fixed"
interval = "5ms"
"#;

#[tokio::test]
async fn strategy_from_toml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("coordination.toml");
    std::fs::write(&path, SPIN_CONFIG).unwrap();

    let config = CoordinationConfig::load(&path).unwrap();
    let deps = seeded(10).await;
    let strategy = build_strategy(config.strategy, &deps, &config);

    assert_eq!(strategy.kind(), StrategyKind::SpinLock);
    assert_eq!(strategy.decrement(COUNTER, 4).await.unwrap().quantity, 6);
    assert_eq!(deps.backend.value("stock:1"), None);
}

#[tokio::test]
async fn configured_timeout_bounds_the_wait() {
    let config = CoordinationConfig::from_toml_str(SPIN_CONFIG).unwrap();
    let deps = seeded(10).await;

    // Another process holds the key for the whole test
    deps.backend
        .set_if_absent("stock:1", "other-process", Duration::from_secs(60))
        .await
        .unwrap();

    let strategy = build_strategy(config.strategy, &deps, &config);
    let err = strategy.decrement(COUNTER, 1).await.unwrap_err();

    match err {
        StockError::LockTimeout { key, waited } => {
            assert_eq!(key, "stock:1");
            assert!(waited >= Duration::from_millis(250));
        }
        other => panic!("expected timeout, got {:?}", other),
    }
    assert_eq!(quantity(&deps).await, 10);
}

#[test]
fn missing_file_is_an_io_error() {
    let err = CoordinationConfig::load(std::path::Path::new("/nonexistent/coordination.toml"))
        .unwrap_err();
    assert!(err.to_string().contains("/nonexistent/coordination.toml"));
}
