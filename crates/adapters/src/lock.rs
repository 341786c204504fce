// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Distributed lock backends

mod memory;
pub use memory::{MemoryLockBackend, MemorySubscription};

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{BackendCall, FakeLockBackend};

pub use sg_core::{LockBackend, Subscription};
