//! The project aggregate: a time-bounded ballot with its participants and
//! the append-only history of accepted votes.
//!
//! Field names on the wire follow the document layout the project store has
//! always used (`start_date`, `voteCount`, `alreadyVoted`, ...).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::{Timestamp, TokenAmount, TypesError, WalletAddress};

/// Identifier of a project.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a participant, unique within its project.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Someone (or something) that can be voted for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    #[serde(default)]
    pub name: String,
    /// Cumulative weight of every vote naming this participant.
    #[serde(rename = "voteCount", default)]
    pub vote_count: TokenAmount,
}

impl Participant {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ParticipantId::new(id),
            name: name.into(),
            vote_count: TokenAmount::zero(),
        }
    }
}

/// One accepted vote. Never modified or removed once appended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub wallet: WalletAddress,
    /// Voting weight at the time of the vote.
    #[serde(rename = "tokenHave")]
    pub weight: TokenAmount,
    pub vote_date: Timestamp,
    #[serde(rename = "participantId")]
    pub participant_id: ParticipantId,
}

/// A project ballot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(rename = "alreadyVoted", default)]
    pub vote_history: Vec<VoteRecord>,
    /// Optimistic-concurrency version, bumped by every successful save.
    #[serde(default)]
    pub version: u64,
}

impl Project {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        start_date: Timestamp,
        end_date: Timestamp,
        participants: Vec<Participant>,
    ) -> Self {
        Self {
            id: ProjectId::new(id),
            name: name.into(),
            description: None,
            start_date,
            end_date,
            participants,
            vote_history: Vec::new(),
            version: 0,
        }
    }

    /// Check the structural invariants of the aggregate.
    ///
    /// - non-empty id
    /// - `start_date < end_date`
    /// - participant ids unique
    /// - at most one vote record per wallet, each naming a known participant
    pub fn validate(&self) -> Result<(), TypesError> {
        if self.id.as_str().trim().is_empty() {
            return Err(TypesError::InvalidProject("empty project id".into()));
        }
        if self.start_date >= self.end_date {
            return Err(TypesError::InvalidProject(format!(
                "{}: start_date {} is not before end_date {}",
                self.id, self.start_date, self.end_date
            )));
        }
        let mut seen = HashSet::new();
        for p in &self.participants {
            if !seen.insert(&p.id) {
                return Err(TypesError::InvalidProject(format!(
                    "{}: duplicate participant {}",
                    self.id, p.id
                )));
            }
        }
        let mut voters = HashSet::new();
        for record in &self.vote_history {
            if !voters.insert(&record.wallet) {
                return Err(TypesError::InvalidProject(format!(
                    "{}: wallet {} voted more than once",
                    self.id, record.wallet
                )));
            }
            if !seen.contains(&record.participant_id) {
                return Err(TypesError::InvalidProject(format!(
                    "{}: vote record names unknown participant {}",
                    self.id, record.participant_id
                )));
            }
        }
        Ok(())
    }

    /// Whether `wallet` appears anywhere in the vote history.
    pub fn has_voted(&self, wallet: &WalletAddress) -> bool {
        self.vote_history.iter().any(|r| &r.wallet == wallet)
    }

    pub fn participant(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.id == id)
    }

    pub fn participant_mut(&mut self, id: &ParticipantId) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|p| &p.id == id)
    }

    /// Exact sum of the weights of every vote record naming `participant`.
    pub fn recorded_weight_for(&self, participant: &ParticipantId) -> TokenAmount {
        let mut total = TokenAmount::zero();
        for record in self
            .vote_history
            .iter()
            .filter(|r| &r.participant_id == participant)
        {
            total += &record.weight;
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Project {
        Project::new(
            "p1",
            "Grants round",
            Timestamp::from_millis(1000),
            Timestamp::from_millis(2000),
            vec![Participant::new("a", "Alice"), Participant::new("b", "Bob")],
        )
    }

    fn wallet(byte: u8) -> WalletAddress {
        WalletAddress::from_bytes([byte; 20])
    }

    #[test]
    fn valid_project_passes() {
        sample().validate().unwrap();
    }

    #[test]
    fn start_must_precede_end() {
        let mut p = sample();
        p.end_date = p.start_date;
        assert!(p.validate().is_err());
    }

    #[test]
    fn duplicate_participants_rejected() {
        let mut p = sample();
        p.participants.push(Participant::new("a", "Alice again"));
        assert!(p.validate().is_err());
    }

    #[test]
    fn duplicate_voter_rejected() {
        let mut p = sample();
        for _ in 0..2 {
            p.vote_history.push(VoteRecord {
                wallet: wallet(1),
                weight: TokenAmount::from_u64(1),
                vote_date: Timestamp::from_millis(1500),
                participant_id: ParticipantId::new("a"),
            });
        }
        assert!(p.validate().is_err());
    }

    #[test]
    fn has_voted_and_recorded_weight() {
        let mut p = sample();
        p.vote_history.push(VoteRecord {
            wallet: wallet(1),
            weight: TokenAmount::parse("0.5").unwrap(),
            vote_date: Timestamp::from_millis(1500),
            participant_id: ParticipantId::new("a"),
        });
        p.vote_history.push(VoteRecord {
            wallet: wallet(2),
            weight: TokenAmount::parse("2").unwrap(),
            vote_date: Timestamp::from_millis(1600),
            participant_id: ParticipantId::new("a"),
        });
        assert!(p.has_voted(&wallet(1)));
        assert!(!p.has_voted(&wallet(3)));
        assert_eq!(
            p.recorded_weight_for(&ParticipantId::new("a")).to_string(),
            "2.5"
        );
        assert!(p.recorded_weight_for(&ParticipantId::new("b")).is_zero());
    }

    #[test]
    fn json_uses_document_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("alreadyVoted").is_some());
        assert_eq!(json["participants"][0]["voteCount"], "0");
        assert_eq!(json["start_date"], 1000);
    }

    #[test]
    fn json_defaults_missing_collections() {
        let p: Project = serde_json::from_str(
            r#"{"id":"x","start_date":1,"end_date":2,"participants":[{"id":"a"}]}"#,
        )
        .unwrap();
        assert!(p.vote_history.is_empty());
        assert_eq!(p.version, 0);
        assert!(p.participants[0].vote_count.is_zero());
    }
}
