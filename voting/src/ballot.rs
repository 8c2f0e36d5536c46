//! Ballot payload parsing.
//!
//! The message a wallet signs is a JSON object naming the project and the
//! participant: `{"projectId": "...", "participantId": "..."}`. Extra keys
//! are ignored.

use serde_json::Value;
use tally_types::{Ballot, ParticipantId, ProjectId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BallotError {
    #[error("signed message is not valid JSON: {0}")]
    NotJson(String),

    #[error("signed message is not a JSON object")]
    NotAnObject,

    #[error("signed message is missing \"{0}\"")]
    MissingField(&'static str),

    #[error("\"{0}\" must be a non-empty string")]
    InvalidField(&'static str),
}

/// Decode the signed message into a [`Ballot`].
pub fn parse_ballot(signed_message: &str) -> Result<Ballot, BallotError> {
    let value: Value =
        serde_json::from_str(signed_message).map_err(|e| BallotError::NotJson(e.to_string()))?;
    let Value::Object(obj) = value else {
        return Err(BallotError::NotAnObject);
    };

    let project_id = required_str(&obj, "projectId")?;
    let participant_id = required_str(&obj, "participantId")?;

    Ok(Ballot {
        project_id: ProjectId::new(project_id),
        participant_id: ParticipantId::new(participant_id),
    })
}

fn required_str(
    obj: &serde_json::Map<String, Value>,
    field: &'static str,
) -> Result<String, BallotError> {
    match obj.get(field) {
        None | Some(Value::Null) => Err(BallotError::MissingField(field)),
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(_) => Err(BallotError::InvalidField(field)),
    }
}
