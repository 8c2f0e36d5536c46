//! RPC error types and the mapping from vote outcomes to HTTP responses.

use axum::http::StatusCode;
use serde_json::{json, Value};
use tally_voting::VoteError;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// Status code and JSON body for a failed vote.
///
/// Internal faults are logged here and reach the caller only as a generic
/// message.
pub fn error_body(err: &VoteError) -> (StatusCode, Value) {
    match err {
        VoteError::RequestMalformed { message, path } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            message_body(message, path.as_deref()),
        ),
        VoteError::MalformedBallot(e) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            message_body(&e.to_string(), Some("signedMessage")),
        ),
        VoteError::OracleRejected { status, body, .. } => (
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
            body.clone(),
        ),
        VoteError::OracleUnavailable { reason, .. } => {
            tracing::warn!(%reason, "balance oracle unavailable");
            (
                StatusCode::BAD_GATEWAY,
                message_body("Balance oracle unavailable", None),
            )
        }
        VoteError::Timeout(_) | VoteError::Contention(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            message_body("Service busy, please retry", None),
        ),
        VoteError::InvalidSignature(_) | VoteError::SignatureMismatch { .. } => (
            StatusCode::UNAUTHORIZED,
            message_body("Signature Failed", None),
        ),
        VoteError::VotingNotStarted { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            message_body("Voting didn't start yet!", None),
        ),
        VoteError::VotingEnded { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            message_body("Voting ended!", None),
        ),
        VoteError::InsufficientBalance { need, .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            message_body(&format!("You need atleast {need} Etb Token To Vote"), None),
        ),
        VoteError::ProjectNotFound(_) => (
            StatusCode::NOT_FOUND,
            message_body("Project Not Found!", None),
        ),
        VoteError::ParticipantNotFound(_) => (
            StatusCode::NOT_FOUND,
            message_body("Participant Not Found!", None),
        ),
        VoteError::AlreadyVoted(_) => (
            StatusCode::CONFLICT,
            message_body("You Already Vote This Project!", None),
        ),
        VoteError::Store(_) | VoteError::Internal(_) => {
            error!(error = %err, "vote failed on internal fault");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                message_body("Internal Server Error", None),
            )
        }
    }
}

/// Short label for the rejected-votes metric.
pub fn rejection_reason(err: &VoteError) -> &'static str {
    match err {
        VoteError::RequestMalformed { .. } | VoteError::MalformedBallot(_) => "malformed",
        VoteError::OracleRejected { .. } => "oracle_rejected",
        VoteError::OracleUnavailable { .. } => "oracle_unavailable",
        VoteError::Timeout(_) => "timeout",
        VoteError::Contention(_) => "contention",
        VoteError::InvalidSignature(_) | VoteError::SignatureMismatch { .. } => "signature",
        VoteError::VotingNotStarted { .. } => "not_started",
        VoteError::VotingEnded { .. } => "ended",
        VoteError::InsufficientBalance { .. } => "insufficient_balance",
        VoteError::ProjectNotFound(_) => "project_not_found",
        VoteError::ParticipantNotFound(_) => "participant_not_found",
        VoteError::AlreadyVoted(_) => "already_voted",
        VoteError::Store(_) | VoteError::Internal(_) => "internal",
    }
}

pub(crate) fn message_body(message: &str, path: Option<&str>) -> Value {
    match path {
        Some(path) => json!({ "message": message, "path": path }),
        None => json!({ "message": message }),
    }
}
