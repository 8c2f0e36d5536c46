//! Signature check: the claimed wallet must be the one that signed the ballot.

use tally_crypto::recover_personal_signer;
use tally_types::{SignedVote, WalletAddress};
use tracing::warn;

use crate::VoteError;

/// Recover the signer of `vote.signed_message` and require it to be
/// `vote.wallet`. Both sides are canonical lowercase, so casing in the
/// original request never matters.
pub fn authenticate(vote: &SignedVote) -> Result<WalletAddress, VoteError> {
    let recovered = recover_personal_signer(vote.signed_message.as_bytes(), &vote.signature)
        .map_err(|e| VoteError::InvalidSignature(e.to_string()))?;
    if recovered != vote.wallet {
        warn!(claimed = %vote.wallet, %recovered, "signature does not match claimed wallet");
        return Err(VoteError::SignatureMismatch {
            claimed: vote.wallet.clone(),
            recovered,
        });
    }
    Ok(recovered)
}
