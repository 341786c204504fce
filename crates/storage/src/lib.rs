// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Counter storage: in-memory store and write-ahead log

mod memory;
mod state;
mod wal;

pub use memory::{MemoryCounterStore, MemoryRowGuard};
pub use state::MaterializedState;
pub use wal::{Recovered, Wal, WalError};
