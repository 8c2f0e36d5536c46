//! Wallet address type in canonical lowercase `0x` form.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

/// An account address as produced by wallet-signing clients.
///
/// Always stored in canonical form: `0x` followed by 40 lowercase hex digits.
/// Comparisons between a claimed wallet and a recovered signer are therefore
/// plain string equality.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct WalletAddress(String);

impl WalletAddress {
    /// The prefix every address carries.
    pub const PREFIX: &'static str = "0x";

    /// Number of hex digits after the prefix (20 bytes).
    pub const HEX_LEN: usize = 40;

    /// Parse an address in any letter casing, normalizing to lowercase.
    pub fn parse(raw: &str) -> Result<Self, TypesError> {
        let lowered = raw.trim().to_ascii_lowercase();
        let Some(digits) = lowered.strip_prefix(Self::PREFIX) else {
            return Err(TypesError::InvalidAddress(format!(
                "{raw}: missing 0x prefix"
            )));
        };
        if digits.len() != Self::HEX_LEN {
            return Err(TypesError::InvalidAddress(format!(
                "{raw}: expected {} hex digits, got {}",
                Self::HEX_LEN,
                digits.len()
            )));
        }
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(TypesError::InvalidAddress(format!(
                "{raw}: non-hex character"
            )));
        }
        Ok(Self(lowered))
    }

    /// Build an address from the 20 raw account bytes.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        let mut s = String::with_capacity(2 + Self::HEX_LEN);
        s.push_str(Self::PREFIX);
        for b in bytes {
            s.push_str(&format!("{b:02x}"));
        }
        Self(s)
    }

    /// Return the canonical address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for WalletAddress {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for WalletAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
