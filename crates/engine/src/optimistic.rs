// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Optimistic retry loop
//!
//! Reads are never blocked. Each attempt re-reads the counter and writes
//! back only if nobody else wrote since; a conflict means "try again with
//! fresh state", not an error.

use crate::decrement::DecrementOperation;
use crate::pause::pause;
use sg_core::{
    BackoffPolicy, CasOutcome, Counter, CounterId, CounterStore, OptimisticConfig, StockError,
};
use std::sync::Arc;

#[derive(Debug)]
enum AttemptState {
    /// 1-based attempt about to run
    Attempting { attempt: u32 },
    Done(Counter),
}

/// Drives [`DecrementOperation::attempt_conditional`] until it applies
pub struct OptimisticRetryCoordinator<S> {
    operation: DecrementOperation<S>,
    backoff: BackoffPolicy,
    max_attempts: Option<u32>,
}

impl<S: CounterStore> OptimisticRetryCoordinator<S> {
    pub fn new(store: Arc<S>, config: &OptimisticConfig) -> Self {
        Self {
            operation: DecrementOperation::new(store),
            backoff: config.backoff.clone(),
            max_attempts: config.max_attempts,
        }
    }

    pub async fn decrement(&self, id: CounterId, amount: u64) -> Result<Counter, StockError> {
        let mut state = AttemptState::Attempting { attempt: 1 };
        loop {
            state = match state {
                AttemptState::Done(counter) => return Ok(counter),
                AttemptState::Attempting { attempt } => {
                    // Business and storage errors are final; only conflicts loop
                    match self.operation.attempt_conditional(id, amount).await? {
                        CasOutcome::Applied(counter) => {
                            if attempt > 1 {
                                tracing::debug!(counter_id = %id, attempt, "applied after conflicts");
                            }
                            AttemptState::Done(counter)
                        }
                        CasOutcome::Conflict { actual_version } => {
                            self.after_conflict(id, attempt, actual_version).await?
                        }
                    }
                }
            };
        }
    }

    async fn after_conflict(
        &self,
        id: CounterId,
        attempt: u32,
        actual_version: u64,
    ) -> Result<AttemptState, StockError> {
        if self.max_attempts.is_some_and(|max| attempt >= max) {
            tracing::warn!(counter_id = %id, attempts = attempt, "giving up after version conflicts");
            return Err(StockError::VersionConflict {
                id,
                attempts: attempt,
            });
        }

        let delay = self.backoff.delay(attempt - 1);
        tracing::debug!(
            counter_id = %id,
            attempt,
            actual_version,
            delay_ms = delay.as_millis() as u64,
            "version conflict, retrying"
        );
        pause(delay).await;
        Ok(AttemptState::Attempting {
            attempt: attempt.saturating_add(1),
        })
    }
}

#[cfg(test)]
#[path = "optimistic_tests.rs"]
mod tests;
