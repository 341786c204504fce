// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operations for the write-ahead log

use crate::counter::{Counter, CounterId};
use serde::{Deserialize, Serialize};

/// Counter mutations that can be persisted to the WAL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Create a counter at version 0
    CounterCreate {
        id: CounterId,
        /// Missing in logs written before product ids were tracked
        #[serde(default)]
        product_id: u64,
        quantity: u64,
    },

    /// Record the state after a successful write
    CounterWrite {
        id: CounterId,
        quantity: u64,
        version: u64,
    },
}

impl Operation {
    pub fn created(counter: &Counter) -> Self {
        Operation::CounterCreate {
            id: counter.id,
            product_id: counter.product_id,
            quantity: counter.quantity,
        }
    }

    pub fn written(counter: &Counter) -> Self {
        Operation::CounterWrite {
            id: counter.id,
            quantity: counter.quantity,
            version: counter.version,
        }
    }

    pub fn counter_id(&self) -> CounterId {
        match self {
            Operation::CounterCreate { id, .. } | Operation::CounterWrite { id, .. } => *id,
        }
    }
}

#[cfg(test)]
#[path = "operation_tests.rs"]
mod tests;
