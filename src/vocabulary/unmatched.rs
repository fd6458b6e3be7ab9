//! Side-channel for values no vocabulary entry matched

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};

/// A raw value that passed through normalization unmatched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnmatchedValue {
    pub field: String,
    pub vocabulary: String,
    pub raw_value: String,
    pub observed_at: DateTime<Utc>,
}

/// Receives unmatched values for operator review.
pub trait UnmatchedSink: Send + Sync {
    fn record(&self, value: UnmatchedValue);
}

/// Logs each unmatched value at `info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingUnmatched;

impl UnmatchedSink for TracingUnmatched {
    fn record(&self, value: UnmatchedValue) {
        tracing::info!(
            field = %value.field,
            vocabulary = %value.vocabulary,
            raw_value = %value.raw_value,
            "no vocabulary match"
        );
    }
}

/// Collects unmatched values in memory until drained.
#[derive(Debug, Default)]
pub struct UnmatchedLog {
    entries: Mutex<Vec<UnmatchedValue>>,
}

impl UnmatchedLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every collected value, leaving the log empty.
    pub fn drain(&self) -> Vec<UnmatchedValue> {
        std::mem::take(&mut *self.entries.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl UnmatchedSink for UnmatchedLog {
    fn record(&self, value: UnmatchedValue) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(value);
    }
}
