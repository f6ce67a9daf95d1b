//! Core Bloom Filter implementation
//!
//! INVARIANTS:
//! - capacity >= 1, hashes >= 1, 0 < error_rate < 1
//! - The bit vector holds exactly `capacity` bits for the filter's lifetime
//! - No false negatives: after `add(e)`, `contains(e)` returns true
//!
//! All bit access happens under one coarse mutex per filter. Hash positions
//! are computed before the lock is taken.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use bitvec::prelude::*;
use parking_lot::Mutex;
use tracing::{debug, trace};

use super::config::{BloomConfig, FilterSizing};
use super::hash_functions::compute_hash_positions;
use super::parameters::FilterParams;
use crate::error::{FilterError, FilterResult};
use crate::metrics::{MetricsRecorder, NoOpMetrics};
use crate::serialization::BitArrayDto;

/// Bloom filter for probabilistic membership testing
///
/// A Bloom filter is a space-efficient probabilistic data structure that
/// can test whether an element is a member of a set. False positives are
/// possible, but false negatives are not.
///
/// The filter is `Sync`: share it behind an `Arc` and call `add`,
/// `contains` and `clear` from any thread.
pub struct BloomFilter {
    params: FilterParams,
    /// Bit array storing the filter state
    bits: Mutex<BitVec<u8, Lsb0>>,
    metrics: Arc<dyn MetricsRecorder>,
}

impl BloomFilter {
    /// Create a filter sized for `expected_elements` at `error_rate`
    pub fn new(expected_elements: usize, error_rate: f64) -> FilterResult<Self> {
        Ok(Self::from_params(FilterParams::from_estimate(
            expected_elements,
            error_rate,
        )?))
    }

    /// Create a filter with an explicit bit count and hash count
    pub fn new_with_shape(capacity: usize, hashes: usize) -> FilterResult<Self> {
        Ok(Self::from_params(FilterParams::from_shape(capacity, hashes)?))
    }

    /// Create a filter from validated configuration
    pub fn from_config(config: &BloomConfig) -> FilterResult<Self> {
        match config.sizing {
            FilterSizing::Estimated {
                expected_elements,
                error_rate,
            } => Self::new(expected_elements, error_rate),
            FilterSizing::Explicit {
                capacity,
                hash_count,
            } => Self::new_with_shape(capacity, hash_count),
        }
    }

    fn from_params(params: FilterParams) -> Self {
        debug!(
            capacity = params.capacity,
            hashes = params.hashes,
            expected_elements = params.expected_elements,
            error_rate = params.error_rate,
            "bloom filter created"
        );

        Self {
            params,
            bits: Mutex::new(bitvec![u8, Lsb0; 0; params.capacity]),
            metrics: Arc::new(NoOpMetrics),
        }
    }

    /// Rebuild a filter from stored parameters and bits
    pub(crate) fn from_parts(params: FilterParams, bits: BitVec<u8, Lsb0>) -> FilterResult<Self> {
        params.validate()?;
        if bits.len() != params.capacity {
            return Err(FilterError::LengthMismatch {
                declared: bits.len(),
                capacity: params.capacity,
            });
        }

        Ok(Self {
            params,
            bits: Mutex::new(bits),
            metrics: Arc::new(NoOpMetrics),
        })
    }

    /// Attach a metrics recorder
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsRecorder>) -> Self {
        metrics.record_filter_created(
            self.params.capacity,
            self.params.hashes,
            self.params.expected_elements,
        );
        self.metrics = metrics;
        self
    }

    /// Add a text element (UTF-8 encoded)
    ///
    /// Returns `true` if at least one bit went from clear to set. A `false`
    /// return means the element was already represented, which collisions
    /// can also cause for a genuinely new element.
    pub fn add(&self, element: &str) -> bool {
        self.add_bytes(element.as_bytes())
    }

    /// Add raw bytes
    pub fn add_bytes(&self, data: &[u8]) -> bool {
        let start = Instant::now();
        let positions = self.compute_hash(data);

        let mut added = false;
        {
            let mut bits = self.bits.lock();
            for pos in positions {
                if !bits[pos] {
                    bits.set(pos, true);
                    added = true;
                }
            }
        }

        self.metrics.record_add(start.elapsed(), added);
        added
    }

    /// Test whether a text element might be in the filter
    ///
    /// Returns:
    /// - `true` if the element might be in the set (could be false positive)
    /// - `false` if the element is definitely NOT in the set (never false negative)
    pub fn contains(&self, element: &str) -> bool {
        self.contains_bytes(element.as_bytes())
    }

    /// Test whether raw bytes might be in the filter
    pub fn contains_bytes(&self, data: &[u8]) -> bool {
        let start = Instant::now();
        let positions = self.compute_hash(data);

        let found = {
            let bits = self.bits.lock();
            positions.iter().all(|&pos| bits[pos])
        };

        self.metrics.record_lookup(start.elapsed(), found);
        found
    }

    /// Clear the filter (reset all bits to 0)
    ///
    /// Parameters are untouched. Concurrent readers observe either the
    /// full pre-clear state or the cleared state.
    pub fn clear(&self) {
        self.bits.lock().fill(false);
        self.metrics.record_clear();
        trace!(capacity = self.params.capacity, "bloom filter cleared");
    }

    /// Release held resources
    ///
    /// An in-memory filter holds none, so this is an idempotent no-op kept
    /// for parity with filters backed by external storage.
    pub fn dispose(&self) {
        trace!("dispose called on in-memory bloom filter");
    }

    /// Compute the bit positions for `data` in this filter
    pub fn compute_hash(&self, data: &[u8]) -> Vec<usize> {
        compute_hash_positions(data, self.params.capacity, self.params.hashes)
    }

    /// Encode the bit vector into its wire object, under the filter lock
    pub fn to_wire(&self) -> FilterResult<BitArrayDto> {
        let dto = self.with_bits(BitArrayDto::encode)?;
        self.metrics.record_encode(
            dto.length.div_ceil(8),
            dto.payload.len(),
            dto.is_compressed(),
        );
        Ok(dto)
    }

    /// Run `f` against the bits while holding the lock
    pub(crate) fn with_bits<R>(&self, f: impl FnOnce(&BitSlice<u8, Lsb0>) -> R) -> R {
        let bits = self.bits.lock();
        f(bits.as_bitslice())
    }

    /// Copy of the current bit vector
    pub fn snapshot_bits(&self) -> BitVec<u8, Lsb0> {
        self.bits.lock().clone()
    }

    /// Get the number of bits set in the filter
    pub fn bits_set(&self) -> usize {
        self.bits.lock().count_ones()
    }

    /// Get the resolved parameters
    pub fn params(&self) -> FilterParams {
        self.params
    }

    /// Get the filter size in bits
    pub fn capacity(&self) -> usize {
        self.params.capacity
    }

    /// Get the number of hash functions
    pub fn hashes(&self) -> usize {
        self.params.hashes
    }

    pub fn expected_elements(&self) -> usize {
        self.params.expected_elements
    }

    pub fn error_rate(&self) -> f64 {
        self.params.error_rate
    }
}

impl Clone for BloomFilter {
    fn clone(&self) -> Self {
        self.metrics.record_filter_created(
            self.params.capacity,
            self.params.hashes,
            self.params.expected_elements,
        );
        Self {
            params: self.params,
            bits: Mutex::new(self.snapshot_bits()),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

impl fmt::Debug for BloomFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BloomFilter")
            .field("params", &self.params)
            .field("bits_set", &self.bits_set())
            .finish()
    }
}

impl fmt::Display for BloomFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Capacity:{},Hashes:{},ExpectedElements:{},ErrorRate:{}",
            self.params.capacity,
            self.params.hashes,
            self.params.expected_elements,
            self.params.error_rate
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Metrics;

    #[test]
    fn test_bloom_filter_new_resolves_parameters() {
        let filter = BloomFilter::new(100, 0.01).unwrap();

        assert_eq!(filter.capacity(), 959, "Filter size should be 959 bits");
        assert_eq!(filter.hashes(), 7, "Filter should have 7 hash functions");
        assert_eq!(filter.expected_elements(), 100);
        assert_eq!(filter.error_rate(), 0.01);
        assert_eq!(filter.bits_set(), 0, "All bits should be zero initially");
    }

    #[test]
    fn test_bloom_filter_new_with_shape_back_derives() {
        let filter = BloomFilter::new_with_shape(1000, 7).unwrap();

        assert_eq!(filter.capacity(), 1000);
        assert_eq!(filter.hashes(), 7);
        assert_eq!(filter.expected_elements(), 100);
        assert!(filter.error_rate() > 0.0 && filter.error_rate() < 1.0);
    }

    #[test]
    fn test_bloom_filter_rejects_invalid_construction() {
        assert!(BloomFilter::new(0, 0.01).is_err());
        assert!(BloomFilter::new(100, 0.0).is_err());
        assert!(BloomFilter::new(100, 1.0).is_err());
        assert!(BloomFilter::new_with_shape(0, 7).is_err());
        assert!(BloomFilter::new_with_shape(1000, 0).is_err());
    }

    #[test]
    fn test_bloom_filter_add_sets_bits() {
        let filter = BloomFilter::new_with_shape(1000, 7).unwrap();

        assert!(filter.add("test_element_0xABCD1234"));
        assert!(filter.bits_set() > 0, "After add, some bits should be set");
        assert!(
            filter.bits_set() <= 7,
            "At most k=7 bits should be set for one element"
        );
    }

    #[test]
    fn test_bloom_filter_add_twice_reports_not_new() {
        let filter = BloomFilter::new(100, 0.01).unwrap();

        assert!(filter.add("one"), "First add must set new bits");
        let bits_before = filter.bits_set();
        assert!(!filter.add("one"), "Second add must not set new bits");
        assert_eq!(filter.bits_set(), bits_before);
    }

    #[test]
    fn test_bloom_filter_contains_after_add() {
        let filter = BloomFilter::new(100, 0.01).unwrap();
        filter.add("one");
        filter.add("two");

        assert!(filter.contains("one"));
        assert!(filter.contains("two"));
    }

    #[test]
    fn test_bloom_filter_empty_contains_nothing() {
        let filter = BloomFilter::new(100, 0.01).unwrap();

        assert!(!filter.contains("one"));
        assert!(!filter.contains(""));
    }

    #[test]
    fn test_bloom_filter_empty_element_is_valid() {
        let filter = BloomFilter::new(100, 0.01).unwrap();

        assert!(filter.add(""));
        assert!(filter.contains(""));
    }

    #[test]
    fn test_text_and_bytes_agree() {
        let filter = BloomFilter::new(100, 0.01).unwrap();
        filter.add("héllo");

        assert!(filter.contains_bytes("héllo".as_bytes()));
    }

    #[test]
    fn test_bloom_filter_no_false_negatives_bulk() {
        let filter = BloomFilter::new_with_shape(10000, 7).unwrap();
        let elements: Vec<String> = (0..1000).map(|i| format!("address_{:04x}", i)).collect();

        for elem in &elements {
            filter.add(elem);
        }

        for elem in &elements {
            assert!(filter.contains(elem), "False negative for {}", elem);
        }
    }

    #[test]
    fn test_bloom_filter_clear_keeps_parameters() {
        let filter = BloomFilter::new(100, 0.01).unwrap();
        filter.add("one");
        filter.add("two");

        filter.clear();

        assert_eq!(filter.bits_set(), 0);
        assert!(!filter.contains("one"));
        assert!(!filter.contains("two"));
        assert_eq!(filter.capacity(), 959);
        assert_eq!(filter.hashes(), 7);
        assert_eq!(filter.expected_elements(), 100);
        assert_eq!(filter.error_rate(), 0.01);
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let filter = BloomFilter::new(100, 0.01).unwrap();
        filter.add("one");

        filter.dispose();
        filter.dispose();

        assert!(filter.contains("one"));
    }

    #[test]
    fn test_display_format() {
        let filter = BloomFilter::new(100, 0.01).unwrap();

        assert_eq!(
            filter.to_string(),
            "Capacity:959,Hashes:7,ExpectedElements:100,ErrorRate:0.01"
        );
    }

    #[test]
    fn test_clone_is_independent() {
        let filter = BloomFilter::new(100, 0.01).unwrap();
        filter.add("one");

        let copy = filter.clone();
        copy.add("two");

        assert!(copy.contains("one"));
        assert!(copy.contains("two"));
        assert!(!filter.contains("two"));
    }

    #[test]
    fn test_bloom_filter_rejects_unrepresentable_sizes() {
        assert!(matches!(
            BloomFilter::new(usize::MAX, 0.01),
            Err(FilterError::OutOfRange { .. })
        ));
        assert!(matches!(
            BloomFilter::new_with_shape(1, 50),
            Err(FilterError::OutOfRange {
                parameter: "error_rate",
                ..
            })
        ));
    }

    #[test]
    fn test_clone_counts_as_created_filter() {
        let metrics = Arc::new(Metrics::new());
        let filter = BloomFilter::new_with_shape(1000, 7)
            .unwrap()
            .with_metrics(metrics.clone());

        let _copy = filter.clone();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.filters_created, 2);
        assert_eq!(snapshot.bytes_allocated, 250);
    }

    #[test]
    fn test_to_wire_uses_capacity_length() {
        let filter = BloomFilter::new_with_shape(10, 2).unwrap();
        filter.add("one");

        let dto = filter.to_wire().unwrap();
        assert_eq!(dto.length, 10);
        assert_eq!(dto.payload.len(), 2);
        assert_eq!(dto.decode().unwrap(), filter.snapshot_bits());
    }

    #[test]
    fn test_from_parts_rejects_wrong_length() {
        let params = FilterParams::from_shape(16, 2).unwrap();
        let result = BloomFilter::from_parts(params, bitvec![u8, Lsb0; 0; 8]);

        assert!(matches!(
            result,
            Err(FilterError::LengthMismatch {
                declared: 8,
                capacity: 16
            })
        ));
    }

    #[test]
    fn test_metrics_are_recorded() {
        let metrics = Arc::new(Metrics::new());
        let filter = BloomFilter::new(100, 0.01)
            .unwrap()
            .with_metrics(metrics.clone());

        filter.add("one");
        filter.add("one");
        filter.contains("one");
        filter.contains("absent");
        filter.clear();
        filter.to_wire().unwrap();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.filters_created, 1);
        assert_eq!(snapshot.adds, 2);
        assert_eq!(snapshot.adds_new, 1);
        assert_eq!(snapshot.lookups, 2);
        assert_eq!(snapshot.clears, 1);
        assert_eq!(snapshot.encodes, 1);
        assert_eq!(snapshot.encodes_compressed, 1);
    }
}
