// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Counter store contract
//!
//! The store owns the authoritative copy of every counter. Strategies only
//! see snapshots and mutate through one of three write primitives:
//! - [`CounterStore::write`], unconditional, for callers already holding a lock
//! - [`ExclusiveCounter::write`], unconditional inside a row-level hold
//! - [`CounterStore::conditional_update`], a single round-trip compare-and-set

use crate::counter::{Counter, CounterId};
use crate::error::StoreError;
use async_trait::async_trait;
use std::time::Duration;

/// Result of a version-conditional write
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CasOutcome {
    /// Version matched; the stored counter after the write
    Applied(Counter),
    /// Someone else wrote first
    Conflict { actual_version: u64 },
}

/// A counter row held exclusively until this handle is dropped
#[async_trait]
pub trait ExclusiveCounter: Send {
    /// Snapshot read when the hold was taken (refreshed by `write`)
    fn counter(&self) -> &Counter;

    /// Unconditional write; exclusivity is already guaranteed
    async fn write(&mut self, quantity: u64) -> Result<Counter, StoreError>;
}

/// Durable counter storage
#[async_trait]
pub trait CounterStore: Send + Sync + 'static {
    type Exclusive: ExclusiveCounter + 'static;

    /// Create a counter; fails if the id is taken
    async fn insert(&self, counter: Counter) -> Result<(), StoreError>;

    async fn get(&self, id: CounterId) -> Result<Counter, StoreError>;

    /// Atomically set `quantity` and bump the version iff the stored version
    /// still equals `expected_version`
    async fn conditional_update(
        &self,
        id: CounterId,
        expected_version: u64,
        quantity: u64,
    ) -> Result<CasOutcome, StoreError>;

    /// Take a row-level hold that blocks other callers of this method on the same id
    async fn get_for_exclusive_access(&self, id: CounterId) -> Result<Self::Exclusive, StoreError>;

    /// Unconditional write
    async fn write(&self, id: CounterId, quantity: u64) -> Result<Counter, StoreError>;
}

/// Advisory lock session, the backend's equivalent of a dedicated connection
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(pub String);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Named locks coordinated by the storage backend
///
/// Locks belong to the session that took them, not to any business
/// transaction, so they survive rollback of the operation they protect.
/// Closing a session releases every lock it still holds.
#[async_trait]
pub trait AdvisoryLocks: Send + Sync + 'static {
    async fn open_session(&self, session: SessionId) -> Result<(), StoreError>;

    /// Wait up to `timeout` for `name`; `false` on timeout
    async fn acquire_named(
        &self,
        session: &SessionId,
        name: &str,
        timeout: Duration,
    ) -> Result<bool, StoreError>;

    /// `false` if `session` did not hold `name`
    async fn release_named(&self, session: &SessionId, name: &str) -> Result<bool, StoreError>;

    async fn close_session(&self, session: &SessionId) -> Result<(), StoreError>;
}
