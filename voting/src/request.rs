//! Inbound vote request shape and its validation.
//!
//! Fields are checked in declaration order and the first failure wins, with
//! the offending field reported as `path`. String fields are trimmed before
//! use, including `signedMessage`: the signature is verified over the
//! trimmed text.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tally_crypto::decode_signature_hex;
use tally_types::{Ballot, SignedVote, WalletAddress};

use crate::ballot::parse_ballot;
use crate::VoteError;

/// Body of a vote request as it arrives over the wire.
///
/// Fields are kept loosely typed so a missing or mistyped field is reported
/// against its name instead of as an opaque decode failure.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VoteRequest {
    pub signature: Option<Value>,
    #[serde(rename = "signedMessage")]
    pub signed_message: Option<Value>,
    pub wallet: Option<Value>,
}

/// A request that passed shape validation.
#[derive(Clone, Debug)]
pub struct ValidatedVote {
    pub vote: SignedVote,
    pub ballot: Ballot,
}

impl VoteRequest {
    pub fn new(
        signature: impl Into<String>,
        signed_message: impl Into<String>,
        wallet: impl Into<String>,
    ) -> Self {
        Self {
            signature: Some(Value::String(signature.into())),
            signed_message: Some(Value::String(signed_message.into())),
            wallet: Some(Value::String(wallet.into())),
        }
    }

    pub fn validate(&self) -> Result<ValidatedVote, VoteError> {
        let signature_hex = required_string(&self.signature, "signature")?;
        let signed_message = required_string(&self.signed_message, "signedMessage")?;
        let wallet_raw = required_string(&self.wallet, "wallet")?;

        let signature = decode_signature_hex(&signature_hex).map_err(|_| {
            VoteError::malformed(
                "\"signature\" must be a 65-byte hex string",
                "signature",
            )
        })?;
        let wallet = WalletAddress::parse(&wallet_raw).map_err(|_| {
            VoteError::malformed("\"wallet\" must be a valid wallet address", "wallet")
        })?;
        let ballot = parse_ballot(&signed_message)?;

        Ok(ValidatedVote {
            vote: SignedVote {
                wallet,
                signed_message,
                signature,
            },
            ballot,
        })
    }
}

fn required_string(value: &Option<Value>, field: &str) -> Result<String, VoteError> {
    match value {
        None | Some(Value::Null) => Err(VoteError::malformed(
            format!("\"{field}\" is required"),
            field,
        )),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Err(VoteError::malformed(
                    format!("\"{field}\" is not allowed to be empty"),
                    field,
                ))
            } else {
                Ok(trimmed.to_string())
            }
        }
        Some(_) => Err(VoteError::malformed(
            format!("\"{field}\" must be a string"),
            field,
        )),
    }
}
