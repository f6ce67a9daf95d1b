//! Metrics hooks for Bloom filter operations
//!
//! ## Usage
//!
//! ```ignore
//! use bloom_filter::{BloomFilter, Metrics};
//! use std::sync::Arc;
//!
//! let metrics = Arc::new(Metrics::new());
//! let filter = BloomFilter::new(1000, 0.01)?.with_metrics(metrics.clone());
//!
//! filter.add("alpha");
//! filter.contains("beta");
//!
//! let snapshot = metrics.snapshot();
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Trait for custom metrics recording implementations
///
/// Implement this trait to integrate with external metrics systems
/// like Prometheus, StatsD, or OpenTelemetry.
pub trait MetricsRecorder: Send + Sync {
    /// Record filter creation
    fn record_filter_created(&self, capacity: usize, hashes: usize, expected_elements: usize);

    /// Record an add; `newly_set` is the add's return value
    fn record_add(&self, duration: Duration, newly_set: bool);

    /// Record a membership lookup
    fn record_lookup(&self, duration: Duration, found: bool);

    /// Record a clear
    fn record_clear(&self);

    /// Record a bit vector encode
    fn record_encode(&self, raw_bytes: usize, payload_bytes: usize, compressed: bool);
}

/// No-op metrics recorder for when metrics are disabled
#[derive(Default)]
pub struct NoOpMetrics;

impl MetricsRecorder for NoOpMetrics {
    fn record_filter_created(&self, _: usize, _: usize, _: usize) {}
    fn record_add(&self, _: Duration, _: bool) {}
    fn record_lookup(&self, _: Duration, _: bool) {}
    fn record_clear(&self) {}
    fn record_encode(&self, _: usize, _: usize, _: bool) {}
}

/// Atomic counter based recorder
///
/// Can be shared by any number of filters.
#[derive(Default)]
pub struct Metrics {
    pub filters_created: AtomicU64,
    /// Bytes of bit storage across created filters
    pub bytes_allocated: AtomicU64,
    pub adds: AtomicU64,
    /// Adds that set at least one new bit
    pub adds_new: AtomicU64,
    pub lookups: AtomicU64,
    pub lookups_positive: AtomicU64,
    pub clears: AtomicU64,
    pub encodes: AtomicU64,
    pub encodes_compressed: AtomicU64,
    pub encoded_raw_bytes: AtomicU64,
    pub encoded_payload_bytes: AtomicU64,
    /// Cumulative add time in nanoseconds
    pub add_time_ns: AtomicU64,
    /// Cumulative lookup time in nanoseconds
    pub lookup_time_ns: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            filters_created: self.filters_created.load(Ordering::Relaxed),
            bytes_allocated: self.bytes_allocated.load(Ordering::Relaxed),
            adds: self.adds.load(Ordering::Relaxed),
            adds_new: self.adds_new.load(Ordering::Relaxed),
            lookups: self.lookups.load(Ordering::Relaxed),
            lookups_positive: self.lookups_positive.load(Ordering::Relaxed),
            clears: self.clears.load(Ordering::Relaxed),
            encodes: self.encodes.load(Ordering::Relaxed),
            encodes_compressed: self.encodes_compressed.load(Ordering::Relaxed),
            avg_add_ns: average(&self.add_time_ns, &self.adds),
            avg_lookup_ns: average(&self.lookup_time_ns, &self.lookups),
            compression_ratio: self.compression_ratio(),
        }
    }

    /// Ratio of positive lookups to total lookups
    ///
    /// Includes true positives; it only approximates the false positive
    /// rate when queried keys are known to be absent.
    pub fn observed_positive_rate(&self) -> f64 {
        let total = self.lookups.load(Ordering::Relaxed);
        let positive = self.lookups_positive.load(Ordering::Relaxed);
        if total > 0 {
            positive as f64 / total as f64
        } else {
            0.0
        }
    }

    /// Payload bytes per packed byte across all encodes (1.0 if none)
    pub fn compression_ratio(&self) -> f64 {
        let raw = self.encoded_raw_bytes.load(Ordering::Relaxed);
        let payload = self.encoded_payload_bytes.load(Ordering::Relaxed);
        if raw > 0 {
            payload as f64 / raw as f64
        } else {
            1.0
        }
    }

    /// Reset all counters
    pub fn reset(&self) {
        for counter in [
            &self.filters_created,
            &self.bytes_allocated,
            &self.adds,
            &self.adds_new,
            &self.lookups,
            &self.lookups_positive,
            &self.clears,
            &self.encodes,
            &self.encodes_compressed,
            &self.encoded_raw_bytes,
            &self.encoded_payload_bytes,
            &self.add_time_ns,
            &self.lookup_time_ns,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

fn average(total: &AtomicU64, count: &AtomicU64) -> u64 {
    let total = total.load(Ordering::Relaxed);
    let count = count.load(Ordering::Relaxed);
    if count > 0 {
        total / count
    } else {
        0
    }
}

impl MetricsRecorder for Metrics {
    fn record_filter_created(&self, capacity: usize, _hashes: usize, _expected_elements: usize) {
        self.filters_created.fetch_add(1, Ordering::Relaxed);
        self.bytes_allocated
            .fetch_add(capacity.div_ceil(8) as u64, Ordering::Relaxed);
    }

    fn record_add(&self, duration: Duration, newly_set: bool) {
        self.adds.fetch_add(1, Ordering::Relaxed);
        self.add_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
        if newly_set {
            self.adds_new.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn record_lookup(&self, duration: Duration, found: bool) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        self.lookup_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
        if found {
            self.lookups_positive.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn record_clear(&self) {
        self.clears.fetch_add(1, Ordering::Relaxed);
    }

    fn record_encode(&self, raw_bytes: usize, payload_bytes: usize, compressed: bool) {
        self.encodes.fetch_add(1, Ordering::Relaxed);
        self.encoded_raw_bytes
            .fetch_add(raw_bytes as u64, Ordering::Relaxed);
        self.encoded_payload_bytes
            .fetch_add(payload_bytes as u64, Ordering::Relaxed);
        if compressed {
            self.encodes_compressed.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default)]
pub struct MetricsSnapshot {
    pub filters_created: u64,
    pub bytes_allocated: u64,
    pub adds: u64,
    pub adds_new: u64,
    pub lookups: u64,
    pub lookups_positive: u64,
    pub clears: u64,
    pub encodes: u64,
    pub encodes_compressed: u64,
    pub avg_add_ns: u64,
    pub avg_lookup_ns: u64,
    pub compression_ratio: f64,
}
