//! Wallet address derivation from secp256k1 public keys.
//!
//! Address = last 20 bytes of Keccak-256(uncompressed public key without the
//! leading `0x04` tag byte).

use k256::ecdsa::{SigningKey, VerifyingKey};
use tally_types::WalletAddress;

use crate::hash::keccak256;

/// Derive the canonical wallet address of a public key.
pub fn address_from_verifying_key(key: &VerifyingKey) -> WalletAddress {
    let point = key.to_encoded_point(false);
    let digest = keccak256(&point.as_bytes()[1..]);
    let mut account = [0u8; 20];
    account.copy_from_slice(&digest[12..]);
    WalletAddress::from_bytes(account)
}

/// Derive the wallet address that `key` signs for.
pub fn address_from_signing_key(key: &SigningKey) -> WalletAddress {
    address_from_verifying_key(key.verifying_key())
}
