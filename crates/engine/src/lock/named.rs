// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Advisory (named) lock held by the storage backend
//!
//! Each acquisition opens its own advisory session, independent of whatever
//! transaction the protected operation runs in. The session lives until
//! release, so the lock outlives a rollback of the business write.

use super::{warn_unheld, Holdings, LockCapability};
use async_trait::async_trait;
use sg_core::{AdvisoryLocks, IdGen, LockError, NamedLockConfig, SessionId, StrategyKind};
use std::sync::Arc;
use std::time::Duration;

pub struct NamedLock<A, G> {
    locks: Arc<A>,
    id_gen: G,
    wait: Duration,
    sessions: Holdings<SessionId>,
}

impl<A: AdvisoryLocks, G: IdGen> NamedLock<A, G> {
    pub fn new(locks: Arc<A>, id_gen: G, config: &NamedLockConfig) -> Self {
        Self {
            locks,
            id_gen,
            wait: config.wait,
            sessions: Holdings::new(),
        }
    }

    pub fn holds(&self, key: &str) -> bool {
        self.sessions.contains(key)
    }

    async fn close(&self, session: &SessionId) {
        if let Err(e) = self.locks.close_session(session).await {
            tracing::warn!(%session, error = %e, "failed to close advisory session");
        }
    }
}

#[async_trait]
impl<A: AdvisoryLocks, G: IdGen> LockCapability for NamedLock<A, G> {
    fn kind(&self) -> StrategyKind {
        StrategyKind::NamedLock
    }

    async fn try_acquire(&self, key: &str, timeout: Duration) -> Result<bool, LockError> {
        let session = SessionId(self.id_gen.next());
        self.locks.open_session(session.clone()).await?;

        let wait = self.wait.min(timeout);
        match self.locks.acquire_named(&session, key, wait).await {
            Ok(true) => {
                tracing::trace!(key, %session, "advisory lock granted");
                self.sessions.insert(key, session);
                Ok(true)
            }
            Ok(false) => {
                tracing::debug!(key, wait_ms = wait.as_millis() as u64, "advisory lock wait expired");
                self.close(&session).await;
                Ok(false)
            }
            Err(e) => {
                self.close(&session).await;
                Err(e.into())
            }
        }
    }

    async fn release(&self, key: &str) -> Result<(), LockError> {
        let Some(session) = self.sessions.take(key) else {
            warn_unheld(self.kind(), key);
            return Ok(());
        };

        let released = self.locks.release_named(&session, key).await;
        // Closing the session frees the name even if the release call failed
        let closed = self.locks.close_session(&session).await;

        if !released? {
            tracing::warn!(key, %session, "advisory lock was not held by its session");
        }
        closed?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "named_tests.rs"]
mod tests;
