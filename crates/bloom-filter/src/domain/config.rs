//! Bloom filter configuration and validation
//!
//! # Example
//!
//! ```ignore
//! use bloom_filter::domain::BloomConfigBuilder;
//!
//! let config = BloomConfigBuilder::new()
//!     .expected_elements(10_000)
//!     .error_rate(0.001)
//!     .build()
//!     .expect("Valid config");
//! ```

use serde::{Deserialize, Serialize};

use super::parameters::FilterParams;
use crate::error::{FilterError, FilterResult};

/// Which parameter pair sizes the filter
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterSizing {
    /// Derive capacity and hash count from expected load and error rate
    Estimated {
        expected_elements: usize,
        error_rate: f64,
    },
    /// Use capacity and hash count as given
    Explicit { capacity: usize, hash_count: usize },
}

/// Bloom filter configuration
///
/// Loadable from JSON, e.g.
/// `{"sizing":{"estimated":{"expected_elements":100,"error_rate":0.01}}}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BloomConfig {
    pub sizing: FilterSizing,
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            sizing: FilterSizing::Estimated {
                expected_elements: 100,
                error_rate: 0.01,
            },
        }
    }
}

impl BloomConfig {
    /// Configuration sized from expected load and error rate
    pub fn estimated(expected_elements: usize, error_rate: f64) -> FilterResult<Self> {
        let config = Self {
            sizing: FilterSizing::Estimated {
                expected_elements,
                error_rate,
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Configuration with explicit capacity and hash count
    pub fn explicit(capacity: usize, hash_count: usize) -> FilterResult<Self> {
        let config = Self {
            sizing: FilterSizing::Explicit {
                capacity,
                hash_count,
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON configuration document
    pub fn from_json_str(json: &str) -> FilterResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the full parameter set this configuration describes
    pub fn resolve(&self) -> FilterResult<FilterParams> {
        match self.sizing {
            FilterSizing::Estimated {
                expected_elements,
                error_rate,
            } => FilterParams::from_estimate(expected_elements, error_rate),
            FilterSizing::Explicit {
                capacity,
                hash_count,
            } => FilterParams::from_shape(capacity, hash_count),
        }
    }

    pub fn validate(&self) -> FilterResult<()> {
        self.resolve().map(|_| ())
    }
}

/// Builder for BloomConfig with validation
///
/// Exactly one pair must be supplied: `expected_elements` with
/// `error_rate`, or `capacity` with `hash_count`. Supplying nothing yields
/// the default configuration.
#[derive(Default)]
pub struct BloomConfigBuilder {
    expected_elements: Option<usize>,
    error_rate: Option<f64>,
    capacity: Option<usize>,
    hash_count: Option<usize>,
}

impl BloomConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the expected number of elements
    pub fn expected_elements(mut self, n: usize) -> Self {
        self.expected_elements = Some(n);
        self
    }

    /// Set the target false positive rate, in (0, 1)
    pub fn error_rate(mut self, p: f64) -> Self {
        self.error_rate = Some(p);
        self
    }

    /// Set the filter size in bits
    pub fn capacity(mut self, m: usize) -> Self {
        self.capacity = Some(m);
        self
    }

    /// Set the number of hash positions per element
    pub fn hash_count(mut self, k: usize) -> Self {
        self.hash_count = Some(k);
        self
    }

    /// Build the BloomConfig, validating all parameters
    pub fn build(self) -> FilterResult<BloomConfig> {
        match (
            self.expected_elements,
            self.error_rate,
            self.capacity,
            self.hash_count,
        ) {
            (Some(n), Some(p), None, None) => BloomConfig::estimated(n, p),
            (None, None, Some(m), Some(k)) => BloomConfig::explicit(m, k),
            (None, None, None, None) => Ok(BloomConfig::default()),
            _ => Err(FilterError::InvalidParameters(
                "supply either expected_elements and error_rate, or capacity and hash_count"
                    .to_string(),
            )),
        }
    }
}
