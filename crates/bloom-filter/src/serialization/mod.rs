//! Serialization Layer - wire formats for filter state
//!
//! - `bit_array`: compact `{ "b": payload, "l": length }` wire object,
//!   Brotli-compressed at or above `COMPRESS_THRESHOLD` bits
//! - `bit_string`: human-readable `"0110..."` rendering
//! - `document`: whole-filter JSON / binary documents
//!
//! RULES:
//! - Encode/decode are pure; locking is the caller's concern
//! - Decoding never yields a partially populated filter

pub mod bit_array;
pub mod bit_string;
pub mod document;

pub use bit_array::{pack_bits, unpack_bits, BitArrayDto, COMPRESS_THRESHOLD};
pub use bit_string::{from_bit_string, to_bit_string};
pub use document::{BitStringDocument, BitsEncoding, FilterDocument, PackedDocument};
