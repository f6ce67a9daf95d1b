//! Whole-filter documents
//!
//! A document carries the four scalar parameters next to the bit vector:
//!
//! ```text
//! {"Capacity":959,"Hashes":7,"ExpectedElements":100,"ErrorRate":0.01,
//!  "HashBits":{"b":"G74BAK...","l":959}}
//! ```
//!
//! Scalars are restored as stored, not re-derived, so a filter read back
//! reports exactly what the writer reported.

use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::bit_array::BitArrayDto;
use super::bit_string::{from_bit_string, to_bit_string};
use crate::domain::{BloomFilter, FilterParams};
use crate::error::{FilterError, FilterResult};

/// How `HashBits` is rendered in a JSON document
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BitsEncoding {
    /// Compact `{ "b", "l" }` wire object
    #[default]
    Packed,
    /// `'0'`/`'1'` string
    BitString,
}

/// Serialized filter with bits rendered as `B`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FilterDocument<B> {
    pub capacity: usize,
    pub hashes: usize,
    pub expected_elements: usize,
    pub error_rate: f64,
    pub hash_bits: B,
}

/// Document using the compact wire object
pub type PackedDocument = FilterDocument<BitArrayDto>;

/// Document using the bit-string rendering
pub type BitStringDocument = FilterDocument<String>;

impl<B> FilterDocument<B> {
    pub fn new(params: FilterParams, hash_bits: B) -> Self {
        Self {
            capacity: params.capacity,
            hashes: params.hashes,
            expected_elements: params.expected_elements,
            error_rate: params.error_rate,
            hash_bits,
        }
    }

    pub fn params(&self) -> FilterParams {
        FilterParams {
            capacity: self.capacity,
            hashes: self.hashes,
            expected_elements: self.expected_elements,
            error_rate: self.error_rate,
        }
    }
}

impl TryFrom<PackedDocument> for BloomFilter {
    type Error = FilterError;

    fn try_from(document: PackedDocument) -> FilterResult<Self> {
        let bits = document.hash_bits.decode()?;
        BloomFilter::from_parts(document.params(), bits)
    }
}

impl TryFrom<BitStringDocument> for BloomFilter {
    type Error = FilterError;

    fn try_from(document: BitStringDocument) -> FilterResult<Self> {
        let bits = from_bit_string(&document.hash_bits)?;
        BloomFilter::from_parts(document.params(), bits)
    }
}

impl Serialize for BloomFilter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let hash_bits = self.to_wire().map_err(S::Error::custom)?;
        PackedDocument::new(self.params(), hash_bits).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BloomFilter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let document = PackedDocument::deserialize(deserializer)?;
        BloomFilter::try_from(document).map_err(D::Error::custom)
    }
}

impl BloomFilter {
    /// Serialize the filter to a JSON document
    pub fn to_json(&self, encoding: BitsEncoding) -> FilterResult<String> {
        let json = match encoding {
            BitsEncoding::Packed => serde_json::to_string(self)?,
            BitsEncoding::BitString => {
                let hash_bits = self.with_bits(to_bit_string);
                serde_json::to_string(&BitStringDocument::new(self.params(), hash_bits))?
            }
        };
        Ok(json)
    }

    /// Restore a filter from a JSON document written with `encoding`
    pub fn from_json(json: &str, encoding: BitsEncoding) -> FilterResult<Self> {
        match encoding {
            BitsEncoding::Packed => {
                let document: PackedDocument = serde_json::from_str(json)?;
                Self::try_from(document)
            }
            BitsEncoding::BitString => {
                let document: BitStringDocument = serde_json::from_str(json)?;
                Self::try_from(document)
            }
        }
    }

    /// Serialize the filter to a compact binary document
    pub fn to_bytes(&self) -> FilterResult<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Restore a filter from a binary document
    pub fn from_bytes(bytes: &[u8]) -> FilterResult<Self> {
        let document: PackedDocument = bincode::deserialize(bytes)?;
        Self::try_from(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_filter() -> BloomFilter {
        let filter = BloomFilter::new(100, 0.01).unwrap();
        filter.add("one");
        filter.add("two");
        filter
    }

    #[test]
    fn test_json_document_shape() {
        let json = sample_filter().to_json(BitsEncoding::Packed).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["Capacity"], 959);
        assert_eq!(value["Hashes"], 7);
        assert_eq!(value["ExpectedElements"], 100);
        assert_eq!(value["ErrorRate"], 0.01);
        assert_eq!(value["HashBits"]["l"], 959);
        assert!(value["HashBits"]["b"].is_string());
    }

    #[test]
    fn test_json_round_trip_packed() {
        let filter = sample_filter();
        let json = filter.to_json(BitsEncoding::Packed).unwrap();
        let restored = BloomFilter::from_json(&json, BitsEncoding::Packed).unwrap();

        assert!(restored.contains("one"));
        assert!(restored.contains("two"));
        assert_eq!(restored.params(), filter.params());
        assert_eq!(restored.snapshot_bits(), filter.snapshot_bits());
    }

    #[test]
    fn test_json_round_trip_bit_string() {
        let filter = sample_filter();
        let json = filter.to_json(BitsEncoding::BitString).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["HashBits"].as_str().map(str::len), Some(959));

        let restored = BloomFilter::from_json(&json, BitsEncoding::BitString).unwrap();
        assert!(restored.contains("one"));
        assert!(restored.contains("two"));
        assert_eq!(restored.snapshot_bits(), filter.snapshot_bits());
    }

    #[test]
    fn test_binary_round_trip() {
        let filter = sample_filter();
        let bytes = filter.to_bytes().unwrap();
        let restored = BloomFilter::from_bytes(&bytes).unwrap();

        assert_eq!(restored.params(), filter.params());
        assert_eq!(restored.snapshot_bits(), filter.snapshot_bits());
    }

    #[test]
    fn test_rejects_length_disagreeing_with_capacity() {
        let json = r#"{"Capacity":16,"Hashes":2,"ExpectedElements":6,"ErrorRate":0.1,"HashBits":{"b":"AAE=","l":10}}"#;

        let result = BloomFilter::from_json(json, BitsEncoding::Packed);
        assert!(matches!(
            result,
            Err(FilterError::LengthMismatch {
                declared: 10,
                capacity: 16
            })
        ));
    }

    #[test]
    fn test_rejects_invalid_scalars() {
        let json = r#"{"Capacity":10,"Hashes":0,"ExpectedElements":6,"ErrorRate":0.1,"HashBits":{"b":"AAE=","l":10}}"#;

        let result = BloomFilter::from_json(json, BitsEncoding::Packed);
        assert!(matches!(result, Err(FilterError::OutOfRange { .. })));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let result = BloomFilter::from_json("{\"Capacity\":", BitsEncoding::Packed);
        assert!(matches!(result, Err(FilterError::Serialization(_))));
    }

    #[test]
    fn test_serde_deserialize_surfaces_domain_errors() {
        let json = r#"{"Capacity":16,"Hashes":2,"ExpectedElements":6,"ErrorRate":0.1,"HashBits":{"b":"AAE=","l":10}}"#;

        let result: Result<BloomFilter, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
