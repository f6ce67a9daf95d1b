//! # Bloom Filter
//!
//! Probabilistic set membership: "definitely not a member" with certainty,
//! "probably a member" with a bounded false positive rate, never a false
//! negative.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): Pure business logic, no I/O
//!   - `parameters`: capacity / hash count / expected load / error rate math
//!   - `hash_functions`: MurmurHash3 + Kirsch-Mitzenmacher position expansion
//!   - `BloomFilter`: mutex-guarded bit vector with add/contains/clear
//!   - `BloomConfig` / `BloomConfigBuilder`: validated sizing configuration
//!
//! - **Serialization Layer** (`serialization/`): wire formats
//!   - `BitArrayDto`: `{ "b", "l" }` object, Brotli compressed from 257 bits
//!   - bit-string rendering and whole-filter JSON / binary documents
//!
//! - **Ports Layer** (`ports/`): `MembershipFilter` trait
//!
//! ## Invariants
//!
//! - capacity >= 1, hashes >= 1, 0 < error_rate < 1, fixed after construction
//! - No false negatives - if added, contains() MUST return true
//! - Decoding reproduces the encoded bit vector exactly
//!
//! ## Usage Example
//!
//! ```ignore
//! use bloom_filter::{BitsEncoding, BloomFilter};
//!
//! let filter = BloomFilter::new(100, 0.01)?;
//! assert_eq!(filter.capacity(), 959);
//! assert_eq!(filter.hashes(), 7);
//!
//! filter.add("one");
//! assert!(filter.contains("one"));
//!
//! let json = filter.to_json(BitsEncoding::Packed)?;
//! let restored = BloomFilter::from_json(&json, BitsEncoding::Packed)?;
//! assert!(restored.contains("one"));
//! ```

pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod serialization;

// Re-exports for convenience
pub use domain::{BloomConfig, BloomConfigBuilder, BloomFilter, FilterParams, FilterSizing};
pub use error::{FilterError, FilterResult};
pub use metrics::{Metrics, MetricsRecorder, MetricsSnapshot, NoOpMetrics};
pub use ports::MembershipFilter;
pub use serialization::{BitArrayDto, BitsEncoding, COMPRESS_THRESHOLD};
