//! Batched time-series metrics
//!
//! A `MetricBatch` accumulates timestamped samples from a rapid, repeated
//! measurement so they can be submitted in one round trip instead of one
//! per sample. Accumulation is single-producer; once submitted the batch
//! is read-only.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Current Unix time in seconds, with sub-second precision
pub fn unix_timestamp() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricBatch {
    samples: Vec<(f64, f64)>,
}

impl MetricBatch {
    pub fn new() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    /// Append a sample stamped with the current time
    pub fn record(&mut self, value: f64) {
        self.samples.push((unix_timestamp(), value));
    }

    /// Append a sample with an explicit Unix timestamp
    pub fn record_at(&mut self, timestamp: f64, value: f64) {
        self.samples.push((timestamp, value));
    }

    /// All `(timestamp, value)` pairs in insertion order
    pub fn samples(&self) -> &[(f64, f64)] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Summarize the batch for backends that cannot accept bulk payloads
    ///
    /// Returns `None` for an empty batch.
    pub fn summary(&self) -> Option<BatchSummary> {
        let (first, rest) = self.samples.split_first()?;
        let last = rest.last().unwrap_or(first);
        let total: f64 = self.samples.iter().map(|(_, v)| v).sum();
        Some(BatchSummary {
            count: self.samples.len(),
            total,
            mean: total / self.samples.len() as f64,
            elapsed: last.0 - first.0,
        })
    }
}

/// Lossy digest of a [`MetricBatch`]
///
/// Backends limited to scalar reporting emit this instead of every sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchSummary {
    pub count: usize,
    pub total: f64,
    pub mean: f64,
    /// Seconds between the first and last sample
    pub elapsed: f64,
}
