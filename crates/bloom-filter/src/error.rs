//! Error types for the Bloom filter crate

use thiserror::Error;

/// Result alias used throughout the crate
pub type FilterResult<T> = Result<T, FilterError>;

/// Errors that can occur while building, encoding or decoding a filter
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("{parameter} out of range: {value} ({reason})")]
    OutOfRange {
        parameter: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("Invalid filter parameters: {0}")]
    InvalidParameters(String),

    #[error("Cannot compress: {0}")]
    Compression(String),

    #[error("Unable to decompress: {0}")]
    Decompression(String),

    #[error("Decoded bit length {declared} does not match capacity {capacity}")]
    LengthMismatch { declared: usize, capacity: usize },

    #[error("Invalid bit string character {found:?} at index {index}")]
    InvalidBitString { index: usize, found: char },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl FilterError {
    pub(crate) fn out_of_range(
        parameter: &'static str,
        value: impl ToString,
        reason: &'static str,
    ) -> Self {
        Self::OutOfRange {
            parameter,
            value: value.to_string(),
            reason,
        }
    }
}

impl From<serde_json::Error> for FilterError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for FilterError {
    fn from(err: bincode::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
