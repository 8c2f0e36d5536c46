//! Ephemeral vote intent types. Neither is persisted on its own.

use serde::{Deserialize, Serialize};

use crate::{ParticipantId, ProjectId, WalletAddress};

/// Structured vote intent recovered from a signed message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    #[serde(rename = "projectId")]
    pub project_id: ProjectId,
    #[serde(rename = "participantId")]
    pub participant_id: ParticipantId,
}

/// One authenticated vote attempt: the claimed wallet, the exact message the
/// wallet signed, and the signature over it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedVote {
    pub wallet: WalletAddress,
    pub signed_message: String,
    pub signature: Vec<u8>,
}
