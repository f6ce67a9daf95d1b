//! Optimal Bloom filter parameter calculation
//!
//! Formulas:
//! - m = ceil(-n*ln(p) / (ln(2)^2))  -- optimal bits
//! - k = ceil(ln(2) * m / n)         -- optimal hash functions
//! - n = ceil(ln(2) * m / k)         -- load a given (m, k) is optimal for
//! - p = (1 - e^(-k*n/m))^k          -- false positive probability

use std::f64::consts::LN_2;

use bitvec::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{FilterError, FilterResult};

/// Largest bit count a filter can hold
pub const MAX_CAPACITY: usize = BitSlice::<u8, Lsb0>::MAX_BITS;

/// Calculate the optimal size of the filter in bits for `n` expected
/// elements and a tolerable false positive rate `p`.
///
/// Saturates at `usize::MAX`; see `exact_capacity` for the unclamped value.
pub fn best_capacity(n: usize, p: f64) -> usize {
    exact_capacity(n, p) as usize
}

fn exact_capacity(n: usize, p: f64) -> f64 {
    (-(n as f64 * p.ln()) / (LN_2 * LN_2)).ceil()
}

/// Calculate the number of hash functions minimizing the false positive
/// rate for `n` elements in `m` bits.
pub fn best_hash_count(n: usize, m: usize) -> usize {
    ((LN_2 * m as f64) / n as f64).ceil() as usize
}

/// Calculate the number of elements for which `k` hashes over `m` bits is
/// the optimal configuration.
pub fn best_expected_elements(k: usize, m: usize) -> usize {
    ((LN_2 * m as f64) / k as f64).ceil() as usize
}

/// Calculate the best-case (uniform hashing) false positive probability
/// of a filter with `k` hashes and `m` bits holding `inserted_elements`.
pub fn best_error_rate(k: usize, m: usize, inserted_elements: f64) -> f64 {
    let exponent = -(k as f64) * inserted_elements / m as f64;
    (1.0 - exponent.exp()).powf(k as f64)
}

/// Fully resolved filter parameters
///
/// Either pair may be supplied by the caller; the other is derived once
/// here and never recomputed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterParams {
    /// Number of bits in the filter (m)
    pub capacity: usize,
    /// Number of positions derived per element (k)
    pub hashes: usize,
    /// Expected number of elements (n)
    pub expected_elements: usize,
    /// Target false positive rate (p)
    pub error_rate: f64,
}

impl FilterParams {
    /// Resolve parameters from an expected load and target error rate
    pub fn from_estimate(expected_elements: usize, error_rate: f64) -> FilterResult<Self> {
        validate_expected_elements(expected_elements)?;
        validate_error_rate(error_rate)?;

        let exact = exact_capacity(expected_elements, error_rate);
        if !exact.is_finite() || exact > MAX_CAPACITY as f64 {
            return Err(FilterError::out_of_range(
                "expected_elements",
                expected_elements,
                "derived capacity exceeds the maximum bit vector length",
            ));
        }
        let capacity = exact as usize;
        let hashes = best_hash_count(expected_elements, capacity);

        Ok(Self {
            capacity,
            hashes,
            expected_elements,
            error_rate,
        })
    }

    /// Resolve parameters from an explicit bit count and hash count
    ///
    /// The error rate is evaluated once against the back-derived expected
    /// load, not against any live insertion count.
    pub fn from_shape(capacity: usize, hashes: usize) -> FilterResult<Self> {
        validate_capacity(capacity)?;
        validate_hashes(hashes)?;

        let expected_elements = best_expected_elements(hashes, capacity);
        let error_rate = best_error_rate(hashes, capacity, expected_elements as f64);
        // Extreme shapes round the derived rate to 1.0
        validate_error_rate(error_rate)?;

        Ok(Self {
            capacity,
            hashes,
            expected_elements,
            error_rate,
        })
    }

    /// Check stored parameters (e.g. restored from a document)
    ///
    /// Only the domain of each field is checked; the four values are not
    /// required to satisfy the derivation formulas.
    pub fn validate(&self) -> FilterResult<()> {
        validate_capacity(self.capacity)?;
        validate_hashes(self.hashes)?;
        validate_expected_elements(self.expected_elements)?;
        validate_error_rate(self.error_rate)
    }
}

fn validate_expected_elements(expected_elements: usize) -> FilterResult<()> {
    if expected_elements < 1 {
        return Err(FilterError::out_of_range(
            "expected_elements",
            expected_elements,
            "expected_elements must be > 0",
        ));
    }
    Ok(())
}

fn validate_error_rate(error_rate: f64) -> FilterResult<()> {
    // Written so NaN is rejected too
    if !(error_rate > 0.0 && error_rate < 1.0) {
        return Err(FilterError::out_of_range(
            "error_rate",
            error_rate,
            "error_rate must be between 0 and 1, exclusive",
        ));
    }
    Ok(())
}

fn validate_capacity(capacity: usize) -> FilterResult<()> {
    if capacity < 1 {
        return Err(FilterError::out_of_range(
            "capacity",
            capacity,
            "capacity must be > 0",
        ));
    }
    if capacity > MAX_CAPACITY {
        return Err(FilterError::out_of_range(
            "capacity",
            capacity,
            "capacity exceeds the maximum bit vector length",
        ));
    }
    Ok(())
}

fn validate_hashes(hashes: usize) -> FilterResult<()> {
    if hashes < 1 {
        return Err(FilterError::out_of_range(
            "hashes",
            hashes,
            "hashes must be > 0",
        ));
    }
    Ok(())
}
