// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized counter state from WAL replay

use sg_core::{Counter, CounterId, Operation};
use std::collections::HashMap;

/// Counters built from WAL operations
#[derive(Debug, Default)]
pub struct MaterializedState {
    pub counters: HashMap<CounterId, Counter>,
}

impl MaterializedState {
    /// Rebuild state by applying every operation in order
    pub fn replay(ops: &[Operation]) -> Self {
        let mut state = Self::default();
        for op in ops {
            state.apply(op);
        }
        state
    }

    pub fn get(&self, id: CounterId) -> Option<&Counter> {
        self.counters.get(&id)
    }

    /// Apply an operation to update the state
    pub fn apply(&mut self, op: &Operation) {
        match op {
            Operation::CounterCreate {
                id,
                product_id,
                quantity,
            } => {
                self.counters
                    .insert(*id, Counter::new(*id, *product_id, *quantity));
            }
            Operation::CounterWrite {
                id,
                quantity,
                version,
            } => {
                // Writes for counters never created are ignored
                if let Some(counter) = self.counters.get_mut(id) {
                    counter.quantity = *quantity;
                    counter.version = *version;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
