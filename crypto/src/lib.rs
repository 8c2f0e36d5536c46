//! Cryptographic primitives for ballot authentication.
//!
//! - **secp256k1 ECDSA** public-key recovery (the curve wallet clients sign with)
//! - **Keccak-256** for the personal-message prefix hash and address derivation
//! - Address derivation: last 20 bytes of Keccak-256 over the uncompressed public key

pub mod address;
pub mod error;
pub mod hash;
pub mod personal;

pub use address::{address_from_signing_key, address_from_verifying_key};
pub use error::CryptoError;
pub use hash::keccak256;
pub use personal::{
    decode_signature_hex, hash_personal_message, recover_personal_signer, sign_personal_message,
    SIGNATURE_LEN,
};
