use thiserror::Error;

use tally_oracle::OracleError;
use tally_store::StoreError;
use tally_types::{ParticipantId, ProjectId, Timestamp, TokenAmount, WalletAddress};

use crate::ballot::BallotError;
use crate::eligibility::EligibilityError;

/// Every way a vote attempt can fail. None of them leaves a partial write.
#[derive(Debug, Error)]
pub enum VoteError {
    #[error("{message}")]
    RequestMalformed {
        message: String,
        path: Option<String>,
    },

    #[error("malformed ballot: {0}")]
    MalformedBallot(#[from] BallotError),

    #[error("balance oracle unavailable: {reason}")]
    OracleUnavailable { reason: String, retryable: bool },

    #[error("balance oracle rejected request ({status}): {message}")]
    OracleRejected {
        status: u16,
        message: String,
        body: serde_json::Value,
    },

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("signature recovers {recovered}, not the claimed wallet {claimed}")]
    SignatureMismatch {
        claimed: WalletAddress,
        recovered: WalletAddress,
    },

    #[error("voting has not started (opens at {starts_at})")]
    VotingNotStarted { starts_at: Timestamp },

    #[error("voting has ended (closed at {ended_at})")]
    VotingEnded { ended_at: Timestamp },

    #[error("insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: TokenAmount, need: TokenAmount },

    #[error("project {0} not found")]
    ProjectNotFound(ProjectId),

    #[error("participant {0} not found")]
    ParticipantNotFound(ParticipantId),

    #[error("wallet {0} has already voted on this project")]
    AlreadyVoted(WalletAddress),

    #[error("{0} timed out")]
    Timeout(&'static str),

    #[error("project {0} kept changing underneath the write, giving up")]
    Contention(ProjectId),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl VoteError {
    pub fn malformed(message: impl Into<String>, path: &str) -> Self {
        VoteError::RequestMalformed {
            message: message.into(),
            path: Some(path.to_string()),
        }
    }

    /// Whether the same request may succeed if sent again later.
    pub fn is_retryable(&self) -> bool {
        match self {
            VoteError::Timeout(_) | VoteError::Contention(_) => true,
            VoteError::OracleUnavailable { retryable, .. } => *retryable,
            _ => false,
        }
    }

    /// Whether this is a server-side fault rather than a verdict on the vote.
    pub fn is_internal(&self) -> bool {
        matches!(self, VoteError::Store(_) | VoteError::Internal(_))
    }
}

impl From<OracleError> for VoteError {
    fn from(e: OracleError) -> Self {
        match e {
            OracleError::Rejected {
                status,
                message,
                body,
            } => VoteError::OracleRejected {
                status,
                message,
                body,
            },
            other => VoteError::OracleUnavailable {
                retryable: other.is_retryable(),
                reason: other.to_string(),
            },
        }
    }
}

impl From<EligibilityError> for VoteError {
    fn from(e: EligibilityError) -> Self {
        match e {
            EligibilityError::VotingNotStarted { starts_at } => {
                VoteError::VotingNotStarted { starts_at }
            }
            EligibilityError::VotingEnded { ended_at } => VoteError::VotingEnded { ended_at },
            EligibilityError::InsufficientBalance { have, need } => {
                VoteError::InsufficientBalance { have, need }
            }
        }
    }
}
