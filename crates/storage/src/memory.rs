// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory counter store
//!
//! Implements the full store contract: single round-trip compare-and-set,
//! FIFO row locks, and session-owned named locks. Writes can optionally be
//! persisted to a [`Wal`] and every primitive can be given a simulated
//! round-trip latency.

use crate::state::MaterializedState;
use crate::wal::{Recovered, Wal};
use async_trait::async_trait;
use sg_core::{
    AdvisoryLocks, CasOutcome, Counter, CounterId, CounterStore, ExclusiveCounter, Operation,
    SessionId, StoreError, FAR_FUTURE,
};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{Notify, OwnedMutexGuard};

/// Counter store kept in process memory
#[derive(Clone, Default)]
pub struct MemoryCounterStore {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    state: Mutex<MaterializedState>,
    /// One FIFO mutex per row for exclusive access
    rows: Mutex<HashMap<CounterId, Arc<tokio::sync::Mutex<()>>>>,
    named: Mutex<NamedLocks>,
    named_released: Notify,
    wal: Option<Mutex<Wal>>,
    latency: Duration,
}

#[derive(Default)]
struct NamedLocks {
    sessions: HashSet<SessionId>,
    held: HashMap<String, NamedHold>,
}

struct NamedHold {
    session: SessionId,
    /// Re-entrant acquisitions by the same session
    count: u32,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a store persisted to the WAL at `path`, replaying existing entries
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let Recovered { wal, operations } = Wal::open(path)?;
        let state = MaterializedState::replay(&operations);
        tracing::debug!(
            path = %path.display(),
            operations = operations.len(),
            counters = state.counters.len(),
            "replayed counter wal"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                state: Mutex::new(state),
                wal: Some(Mutex::new(wal)),
                ..Inner::default()
            }),
        })
    }

    /// Delay every primitive by `latency`, like a round-trip to a database
    ///
    /// Must be called before the store is shared.
    pub fn with_latency(self, latency: Duration) -> Self {
        let inner = match Arc::try_unwrap(self.inner) {
            Ok(inner) => inner,
            Err(shared) => {
                tracing::warn!("latency must be configured before the store is shared");
                return Self { inner: shared };
            }
        };
        Self {
            inner: Arc::new(Inner { latency, ..inner }),
        }
    }

    /// Drop a counter; housekeeping only, never used by decrement paths
    pub fn remove(&self, id: CounterId) -> Option<Counter> {
        self.inner.rows().remove(&id);
        self.inner.state().counters.remove(&id)
    }

    /// Named locks currently held, with their owning session
    pub fn named_locks(&self) -> Vec<(String, SessionId)> {
        self.inner
            .named()
            .held
            .iter()
            .map(|(name, hold)| (name.clone(), hold.session.clone()))
            .collect()
    }

    async fn round_trip(&self) {
        if !self.inner.latency.is_zero() {
            tokio::time::sleep(self.inner.latency).await;
        }
    }
}

impl Inner {
    fn state(&self) -> std::sync::MutexGuard<'_, MaterializedState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn rows(&self) -> std::sync::MutexGuard<'_, HashMap<CounterId, Arc<tokio::sync::Mutex<()>>>> {
        self.rows.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn named(&self) -> std::sync::MutexGuard<'_, NamedLocks> {
        self.named.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Log then apply; the in-memory state only changes once the WAL accepted the entry
    fn persist(&self, state: &mut MaterializedState, op: Operation) -> Result<(), StoreError> {
        if let Some(wal) = &self.wal {
            wal.lock().unwrap_or_else(|e| e.into_inner()).append(&op)?;
        }
        state.apply(&op);
        Ok(())
    }

    fn write(&self, id: CounterId, quantity: u64) -> Result<Counter, StoreError> {
        let mut state = self.state();
        let current = state.get(id).ok_or(StoreError::NotFound(id))?;
        let next = current.written(quantity);
        self.persist(&mut state, Operation::written(&next))?;
        Ok(next)
    }
}

/// Row held exclusively until dropped
pub struct MemoryRowGuard {
    store: MemoryCounterStore,
    counter: Counter,
    _row: OwnedMutexGuard<()>,
}

#[async_trait]
impl ExclusiveCounter for MemoryRowGuard {
    fn counter(&self) -> &Counter {
        &self.counter
    }

    async fn write(&mut self, quantity: u64) -> Result<Counter, StoreError> {
        self.store.round_trip().await;
        self.counter = self.store.inner.write(self.counter.id, quantity)?;
        Ok(self.counter.clone())
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    type Exclusive = MemoryRowGuard;

    async fn insert(&self, counter: Counter) -> Result<(), StoreError> {
        self.round_trip().await;
        let mut state = self.inner.state();
        if state.get(counter.id).is_some() {
            return Err(StoreError::AlreadyExists(counter.id));
        }
        let created = Counter::new(counter.id, counter.product_id, counter.quantity);
        self.inner.persist(&mut state, Operation::created(&created))
    }

    async fn get(&self, id: CounterId) -> Result<Counter, StoreError> {
        self.round_trip().await;
        self.inner
            .state()
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn conditional_update(
        &self,
        id: CounterId,
        expected_version: u64,
        quantity: u64,
    ) -> Result<CasOutcome, StoreError> {
        self.round_trip().await;
        let mut state = self.inner.state();
        let current = state.get(id).ok_or(StoreError::NotFound(id))?;
        if current.version != expected_version {
            return Ok(CasOutcome::Conflict {
                actual_version: current.version,
            });
        }
        let next = current.written(quantity);
        self.inner.persist(&mut state, Operation::written(&next))?;
        Ok(CasOutcome::Applied(next))
    }

    async fn get_for_exclusive_access(&self, id: CounterId) -> Result<MemoryRowGuard, StoreError> {
        self.round_trip().await;
        let row = {
            if self.inner.state().get(id).is_none() {
                return Err(StoreError::NotFound(id));
            }
            self.inner.rows().entry(id).or_default().clone()
        };

        let hold = row.lock_owned().await;
        // Read only after the hold is granted so the snapshot is current
        let counter = self
            .inner
            .state()
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound(id))?;

        Ok(MemoryRowGuard {
            store: self.clone(),
            counter,
            _row: hold,
        })
    }

    async fn write(&self, id: CounterId, quantity: u64) -> Result<Counter, StoreError> {
        self.round_trip().await;
        self.inner.write(id, quantity)
    }
}

#[async_trait]
impl AdvisoryLocks for MemoryCounterStore {
    async fn open_session(&self, session: SessionId) -> Result<(), StoreError> {
        self.inner.named().sessions.insert(session);
        Ok(())
    }

    async fn acquire_named(
        &self,
        session: &SessionId,
        name: &str,
        timeout: Duration,
    ) -> Result<bool, StoreError> {
        self.round_trip().await;
        let deadline = tokio::time::Instant::now() + timeout.min(FAR_FUTURE);

        loop {
            // Register for wake-ups before checking, so a release in between is not missed
            let released = self.inner.named_released.notified();
            tokio::pin!(released);
            released.as_mut().enable();

            {
                let mut named = self.inner.named();
                if !named.sessions.contains(session) {
                    return Err(StoreError::UnknownSession(session.0.clone()));
                }
                match named.held.get_mut(name) {
                    None => {
                        named.held.insert(
                            name.to_string(),
                            NamedHold {
                                session: session.clone(),
                                count: 1,
                            },
                        );
                        return Ok(true);
                    }
                    Some(hold) if hold.session == *session => {
                        hold.count += 1;
                        return Ok(true);
                    }
                    Some(_) => {}
                }
            }

            if tokio::time::timeout_at(deadline, released).await.is_err() {
                return Ok(false);
            }
        }
    }

    async fn release_named(&self, session: &SessionId, name: &str) -> Result<bool, StoreError> {
        self.round_trip().await;
        let mut named = self.inner.named();
        if !named.sessions.contains(session) {
            return Err(StoreError::UnknownSession(session.0.clone()));
        }
        let freed = match named.held.get_mut(name) {
            Some(hold) if hold.session == *session => {
                hold.count -= 1;
                hold.count == 0
            }
            _ => return Ok(false),
        };
        if freed {
            named.held.remove(name);
            drop(named);
            self.inner.named_released.notify_waiters();
        }
        Ok(true)
    }

    async fn close_session(&self, session: &SessionId) -> Result<(), StoreError> {
        let mut named = self.inner.named();
        named.sessions.remove(session);
        let before = named.held.len();
        named.held.retain(|_, hold| hold.session != *session);
        let freed = before - named.held.len();
        drop(named);
        if freed > 0 {
            tracing::debug!(%session, freed, "session closed with named locks still held");
            self.inner.named_released.notify_waiters();
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
