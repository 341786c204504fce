// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inventory counter and the decrement rule that protects it

use crate::error::StockError;
use serde::{Deserialize, Serialize};

/// Stable identifier of a counter row
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CounterId(pub u64);

impl CounterId {
    /// Lock key for this counter, optionally namespaced
    pub fn lock_key(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self.0)
    }
}

impl std::fmt::Display for CounterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CounterId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// One inventory line
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    pub id: CounterId,
    /// Product this inventory line belongs to
    pub product_id: u64,
    pub quantity: u64,
    /// Bumped once per successful write; the optimistic path compares it
    pub version: u64,
}

impl Counter {
    pub fn new(id: impl Into<CounterId>, product_id: u64, quantity: u64) -> Self {
        Self {
            id: id.into(),
            product_id,
            quantity,
            version: 0,
        }
    }

    /// Validate a decrement and compute the resulting quantity.
    ///
    /// This is the only place the "never negative" rule is enforced. Callers
    /// persist the returned quantity through whatever write primitive their
    /// strategy holds.
    pub fn plan_decrement(&self, amount: u64) -> Result<u64, StockError> {
        validate_amount(amount)?;
        self.quantity
            .checked_sub(amount)
            .ok_or(StockError::InsufficientStock {
                id: self.id,
                requested: amount,
                available: self.quantity,
            })
    }

    /// Snapshot after a successful write of `quantity`
    pub fn written(&self, quantity: u64) -> Counter {
        Counter {
            quantity,
            version: self.version + 1,
            ..self.clone()
        }
    }
}

/// Reject amounts that are not strictly positive
pub fn validate_amount(amount: u64) -> Result<(), StockError> {
    if amount == 0 {
        return Err(StockError::InvalidArgument(
            "decrement amount must be positive".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "counter_tests.rs"]
mod tests;
