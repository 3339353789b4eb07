//! Key hashing for the open-addressing table.
//!
//! A multiplicative string hash in the style of CPython's old string hash:
//! seeded from the first byte, mixed with a large odd multiplier per byte,
//! and finished by folding in the key length. Deterministic and cheap; it
//! has no cryptographic properties and is not stable across versions.

/// Per-byte multiplier.
const MULTIPLIER: i32 = 1_000_003;

/// Hash a key to the 32-bit signed value stored in each table entry.
///
/// Bytes are treated as unsigned. The empty key hashes to `0`.
#[inline]
pub fn key_hash(key: &[u8]) -> i32 {
    let mut hash = match key.first() {
        Some(&b) => (b as i32) << 7,
        None => 0,
    };
    for &b in key {
        hash = hash.wrapping_mul(MULTIPLIER) ^ b as i32;
    }
    hash ^ key.len() as i32
}
