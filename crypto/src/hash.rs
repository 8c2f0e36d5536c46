//! Keccak-256 hashing.

use sha3::{Digest, Keccak256};

/// Compute the 256-bit Keccak hash of arbitrary data.
///
/// This is the pre-standard Keccak padding, not NIST SHA3-256.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn keccak256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}
