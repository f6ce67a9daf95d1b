//! Hash functions for Bloom filter
//!
//! Uses MurmurHash3 (32-bit) with two seeds and the Kirsch-Mitzenmacher
//! construction to derive k positions from two base hashes.
//!
//! The position derivation is part of the persisted format: filters
//! written by one process are read by another, so every step below must
//! stay bit-for-bit stable.

use std::io::Cursor;

/// Seed for the first base hash
const SEED_PRIMARY: u32 = 0;

/// Seed for the second base hash
const SEED_SECONDARY: u32 = 1;

/// Hash bytes with 32-bit MurmurHash3
pub fn murmur_hash(data: &[u8], seed: u32) -> u32 {
    let mut cursor = Cursor::new(data);
    // Reading from an in-memory cursor cannot fail
    murmur3::murmur3_32(&mut cursor, seed).unwrap_or(0)
}

/// Logical right shift of a 32-bit value
///
/// Any shift of at least one clears the top bit, so the result is
/// non-negative when read back as a signed 32-bit integer.
pub fn right_move(value: u32, pos: u32) -> u32 {
    value.checked_shr(pos).unwrap_or(0)
}

/// Compute `k` bit positions in `[0, m)` for `data`
///
/// Enhanced double hashing: `g(i) = h1 + i*h2 + i^2` in wrapping 32-bit
/// arithmetic, shifted right by one and reduced modulo `m`. Duplicate
/// positions are possible and harmless.
pub fn compute_hash_positions(data: &[u8], m: usize, k: usize) -> Vec<usize> {
    debug_assert!(m > 0, "capacity must be positive");

    let h1 = murmur_hash(data, SEED_PRIMARY);
    let h2 = murmur_hash(data, SEED_SECONDARY);

    (0..k)
        .map(|i| {
            // Truncation past u32::MAX is fine: the arithmetic wraps anyway
            let i = i as u32;
            let combined = h1
                .wrapping_add(i.wrapping_mul(h2))
                .wrapping_add(i.wrapping_mul(i));
            right_move(combined, 1) as usize % m
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_murmur3_known_vectors() {
        assert_eq!(murmur_hash(b"", 0), 0);
        assert_eq!(murmur_hash(b"", 1), 0x514E_28B7);
    }

    #[test]
    fn test_murmur3_different_seed_different_output() {
        let element = b"test_element_0xABCD";

        assert_ne!(
            murmur_hash(element, SEED_PRIMARY),
            murmur_hash(element, SEED_SECONDARY),
            "Different seeds must produce different outputs"
        );
    }

    #[test]
    fn test_right_move_clears_sign_bit() {
        assert_eq!(right_move(0xFFFF_FFFF, 1), 0x7FFF_FFFF);
        assert_eq!(right_move(0x8000_0000, 1), 0x4000_0000);
        assert_eq!(right_move(0xFFFF_FFFF, 0), 0xFFFF_FFFF);
        assert_eq!(right_move(0xFFFF_FFFF, 32), 0);
        assert_eq!(right_move(0x0000_0010, 3), 0x0000_0002);
    }

    #[test]
    fn test_empty_input_positions_are_fixed() {
        let m = 1_000_003;
        let positions = compute_hash_positions(b"", m, 3);

        // h1 = 0 and h2 = 0x514E28B7 for the empty input
        let second = right_move(0x514E_28B7u32.wrapping_add(1), 1) as usize % m;
        let third = right_move(0x514E_28B7u32.wrapping_mul(2).wrapping_add(4), 1) as usize % m;

        assert_eq!(positions, vec![0, second, third]);
    }

    #[test]
    fn test_positions_deterministic() {
        let a = compute_hash_positions(b"element", 959, 7);
        let b = compute_hash_positions(b"element", 959, 7);

        assert_eq!(a, b, "Same input must produce same positions");
    }

    #[test]
    fn test_produces_k_positions_within_bounds() {
        let m = 10_000;
        let k = 7;

        let positions = compute_hash_positions(b"test_element_0xABCD", m, k);

        assert_eq!(positions.len(), k, "Should produce k positions");
        for pos in &positions {
            assert!(*pos < m, "Position {} should be < m={}", pos, m);
        }

        let unique: std::collections::HashSet<_> = positions.iter().collect();
        assert!(
            unique.len() >= 3,
            "Hash functions should produce varied positions"
        );
    }

    #[test]
    fn test_single_bit_capacity() {
        let positions = compute_hash_positions(b"anything", 1, 5);
        assert_eq!(positions, vec![0; 5]);
    }

    #[test]
    fn test_hash_uniformity() {
        let m = 1000;
        let k = 7;
        let mut counts = vec![0usize; 10];

        for i in 0..1000 {
            let element = format!("element_{}", i);
            for pos in compute_hash_positions(element.as_bytes(), m, k) {
                counts[pos / 100] += 1;
            }
        }

        // Each bucket should see roughly 1000*7/10 = 700 positions
        let expected = 700;
        let min_acceptable = expected / 2;
        let max_acceptable = expected * 3 / 2;

        for (i, count) in counts.iter().enumerate() {
            assert!(
                *count >= min_acceptable && *count <= max_acceptable,
                "Bucket {} has {} entries, expected ~{}",
                i,
                count,
                expected
            );
        }
    }
}
