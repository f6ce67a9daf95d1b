//! Human-readable bit vector rendering
//!
//! Position `i` is character `i`: `'1'` for a set bit, `'0'` otherwise.

use bitvec::prelude::*;

use crate::error::{FilterError, FilterResult};

/// Render bits as a `'0'`/`'1'` string
pub fn to_bit_string(bits: &BitSlice<u8, Lsb0>) -> String {
    bits.iter()
        .by_vals()
        .map(|bit| if bit { '1' } else { '0' })
        .collect()
}

/// Parse a `'0'`/`'1'` string back into bits
pub fn from_bit_string(text: &str) -> FilterResult<BitVec<u8, Lsb0>> {
    let mut bits = BitVec::with_capacity(text.len());
    for (index, found) in text.chars().enumerate() {
        match found {
            '0' => bits.push(false),
            '1' => bits.push(true),
            _ => return Err(FilterError::InvalidBitString { index, found }),
        }
    }
    Ok(bits)
}
