// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The decrement itself: read, check, subtract, persist
//!
//! The arithmetic lives in [`Counter::plan_decrement`]; this type only picks
//! the read and write primitives.

use sg_core::counter::validate_amount;
use sg_core::{CasOutcome, Counter, CounterId, CounterStore, ExclusiveCounter, StockError};
use std::sync::Arc;

/// Decrement against a [`CounterStore`]
pub struct DecrementOperation<S> {
    store: Arc<S>,
}

impl<S> Clone for DecrementOperation<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: CounterStore> DecrementOperation<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Plain read then unconditional write. Only safe while the caller holds
    /// a lock on the counter.
    pub async fn run(&self, id: CounterId, amount: u64) -> Result<Counter, StockError> {
        validate_amount(amount)?;
        let counter = self.store.get(id).await?;
        let quantity = counter.plan_decrement(amount)?;
        let written = self.store.write(id, quantity).await?;
        tracing::trace!(counter_id = %id, quantity, version = written.version, "decremented");
        Ok(written)
    }

    /// Read and write inside a row-level hold released when this returns
    pub async fn run_exclusive(&self, id: CounterId, amount: u64) -> Result<Counter, StockError> {
        validate_amount(amount)?;
        let mut row = self.store.get_for_exclusive_access(id).await?;
        let quantity = row.counter().plan_decrement(amount)?;
        let written = row.write(quantity).await?;
        tracing::trace!(counter_id = %id, quantity, version = written.version, "decremented under row lock");
        Ok(written)
    }

    /// One compare-and-set attempt against the version just read
    pub async fn attempt_conditional(
        &self,
        id: CounterId,
        amount: u64,
    ) -> Result<CasOutcome, StockError> {
        validate_amount(amount)?;
        let counter = self.store.get(id).await?;
        let quantity = counter.plan_decrement(amount)?;
        Ok(self
            .store
            .conditional_update(id, counter.version, quantity)
            .await?)
    }
}

#[cfg(test)]
#[path = "decrement_tests.rs"]
mod tests;
