//! Personal-message signatures, as produced by browser and mobile wallets.
//!
//! The signed digest is
//! `keccak256("\x19Ethereum Signed Message:\n" ++ len(message) ++ message)`
//! where `len` is the decimal byte length of the UTF-8 message. Signatures are
//! 65 bytes: `r ‖ s ‖ v`, with `v` either `27/28` or `0/1`.

use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use tally_types::WalletAddress;

use crate::address::address_from_verifying_key;
use crate::hash::keccak256_multi;
use crate::CryptoError;

/// Length in bytes of a recoverable signature.
pub const SIGNATURE_LEN: usize = 65;

const PERSONAL_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n";

/// Compute the prefixed digest a wallet signs for `message`.
pub fn hash_personal_message(message: &[u8]) -> [u8; 32] {
    let len = message.len().to_string();
    keccak256_multi(&[PERSONAL_PREFIX, len.as_bytes(), message])
}

/// Decode a hex signature string (optional `0x` prefix) into raw bytes.
pub fn decode_signature_hex(raw: &str) -> Result<Vec<u8>, CryptoError> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let bytes = hex::decode(digits)
        .map_err(|e| CryptoError::InvalidSignature(format!("not hex: {e}")))?;
    if bytes.len() != SIGNATURE_LEN {
        return Err(CryptoError::InvalidSignature(format!(
            "expected {SIGNATURE_LEN} bytes, got {}",
            bytes.len()
        )));
    }
    Ok(bytes)
}

/// Recover the wallet address that produced `signature` over `message`.
///
/// High-`s` signatures are folded onto their low-`s` twin before recovery so
/// that any signature a wallet client would accept is recoverable here.
pub fn recover_personal_signer(
    message: &[u8],
    signature: &[u8],
) -> Result<WalletAddress, CryptoError> {
    if signature.len() != SIGNATURE_LEN {
        return Err(CryptoError::InvalidSignature(format!(
            "expected {SIGNATURE_LEN} bytes, got {}",
            signature.len()
        )));
    }

    let parity = match signature[64] {
        v @ (0 | 1) => v,
        v @ (27 | 28) => v - 27,
        v => {
            return Err(CryptoError::InvalidSignature(format!(
                "unsupported recovery byte {v}"
            )))
        }
    };
    let mut recovery_id = RecoveryId::from_byte(parity)
        .ok_or_else(|| CryptoError::InvalidSignature(format!("bad recovery id {parity}")))?;

    let mut sig = Signature::from_slice(&signature[..64])
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
    if let Some(low_s) = sig.normalize_s() {
        sig = low_s;
        recovery_id = RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced());
    }

    let digest = hash_personal_message(message);
    let key = VerifyingKey::recover_from_prehash(&digest, &sig, recovery_id)
        .map_err(|e| CryptoError::InvalidSignature(format!("recovery failed: {e}")))?;
    Ok(address_from_verifying_key(&key))
}

/// Sign `message` the way a wallet client does. Returns `r ‖ s ‖ v` with
/// `v` in `27/28`.
pub fn sign_personal_message(
    message: &[u8],
    key: &SigningKey,
) -> Result<[u8; SIGNATURE_LEN], CryptoError> {
    let digest = hash_personal_message(message);
    let (sig, recovery_id) = key
        .sign_prehash_recoverable(&digest)
        .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
    let mut out = [0u8; SIGNATURE_LEN];
    out[..64].copy_from_slice(&sig.to_bytes());
    out[64] = recovery_id.to_byte() + 27;
    Ok(out)
}
