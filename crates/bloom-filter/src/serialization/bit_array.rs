//! Compact bit array wire object
//!
//! Bits are packed eight per byte, position `i` in byte `i / 8` at bit
//! `i % 8`. Vectors of `COMPRESS_THRESHOLD` bits or more are Brotli
//! compressed; smaller ones are stored raw. The threshold is the only
//! thing distinguishing the two payload forms on the wire.

use std::io::Read;

use bitvec::prelude::*;
use brotli::enc::BrotliEncoderParams;
use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as};
use tracing::{debug, warn};

use crate::error::{FilterError, FilterResult};

/// Bit length at which payloads switch to the compressed form
pub const COMPRESS_THRESHOLD: usize = 257;

const BROTLI_QUALITY: i32 = 11;
const BROTLI_WINDOW: i32 = 24;
const BROTLI_BUFFER_SIZE: usize = 4096;

/// Wire representation of a bit vector
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitArrayDto {
    /// Packed bits, raw or compressed depending on `length`
    #[serde(rename = "b")]
    #[serde_as(as = "Base64")]
    pub payload: Vec<u8>,
    /// Exact number of bits encoded
    #[serde(rename = "l")]
    pub length: usize,
}

impl BitArrayDto {
    /// Encode a bit vector
    pub fn encode(bits: &BitSlice<u8, Lsb0>) -> FilterResult<Self> {
        let length = bits.len();
        let packed = pack_bits(bits);
        let raw_bytes = packed.len();

        let payload = if length >= COMPRESS_THRESHOLD {
            compress(&packed)?
        } else {
            packed
        };

        debug!(
            length,
            raw_bytes,
            payload_bytes = payload.len(),
            compressed = length >= COMPRESS_THRESHOLD,
            "encoded bit array"
        );

        Ok(Self { payload, length })
    }

    /// Decode back into a bit vector of exactly `length` bits
    pub fn decode(&self) -> FilterResult<BitVec<u8, Lsb0>> {
        if self.length > BitSlice::<u8, Lsb0>::MAX_BITS {
            warn!(length = self.length, "declared bit length exceeds bit vector limit");
            return Err(FilterError::Decompression(format!(
                "declared length {} exceeds maximum {}",
                self.length,
                BitSlice::<u8, Lsb0>::MAX_BITS
            )));
        }

        let bytes = if self.is_compressed() {
            decompress(&self.payload, packed_len(self.length))?
        } else {
            self.payload.clone()
        };

        Ok(unpack_bits(&bytes, self.length))
    }

    /// Whether `payload` holds Brotli output
    pub fn is_compressed(&self) -> bool {
        self.length >= COMPRESS_THRESHOLD
    }
}

/// Number of bytes needed to pack `bits` bits
pub fn packed_len(bits: usize) -> usize {
    bits.div_ceil(8)
}

/// Pack bits into bytes; padding bits in the last byte are always zero
pub fn pack_bits(bits: &BitSlice<u8, Lsb0>) -> Vec<u8> {
    let mut bytes = vec![0u8; packed_len(bits.len())];
    for i in bits.iter_ones() {
        bytes[i / 8] |= 1 << (i % 8);
    }
    bytes
}

/// Unpack bytes into exactly `length` bits
///
/// Short input is padded with clear bits, excess input is ignored.
pub fn unpack_bits(bytes: &[u8], length: usize) -> BitVec<u8, Lsb0> {
    let mut bits = BitVec::<u8, Lsb0>::from_slice(bytes);
    bits.resize(length, false);
    bits
}

fn compress(bytes: &[u8]) -> FilterResult<Vec<u8>> {
    let mut params = BrotliEncoderParams::default();
    params.quality = BROTLI_QUALITY;
    params.lgwin = BROTLI_WINDOW;

    let mut input = bytes;
    let mut output = Vec::new();
    brotli::BrotliCompress(&mut input, &mut output, &params)
        .map_err(|e| FilterError::Compression(e.to_string()))?;

    Ok(output)
}

/// Decompress into exactly `expected` bytes
fn decompress(payload: &[u8], expected: usize) -> FilterResult<Vec<u8>> {
    let mut decoder = brotli::Decompressor::new(payload, BROTLI_BUFFER_SIZE);
    // Grows with actual output; `expected` comes from an untrusted document
    let mut output = Vec::new();

    // One extra byte is enough to detect an oversized payload
    if let Err(e) = (&mut decoder)
        .take(expected as u64 + 1)
        .read_to_end(&mut output)
    {
        warn!(error = %e, payload_bytes = payload.len(), "brotli payload rejected");
        return Err(FilterError::Decompression(e.to_string()));
    }

    if output.len() != expected {
        warn!(
            expected,
            actual = output.len(),
            "decompressed size disagrees with declared length"
        );
        return Err(FilterError::Decompression(format!(
            "expected {} bytes, got {}",
            expected,
            output.len()
        )));
    }

    Ok(output)
}
