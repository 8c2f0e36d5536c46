//! Fundamental types for the tally vote recorder.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! wallet addresses, token amounts, millisecond timestamps, and the project aggregate
//! (participants plus the append-only vote history).

pub mod address;
pub mod amount;
pub mod ballot;
pub mod error;
pub mod project;
pub mod time;

pub use address::WalletAddress;
pub use amount::TokenAmount;
pub use ballot::{Ballot, SignedVote};
pub use error::TypesError;
pub use project::{Participant, ParticipantId, Project, ProjectId, VoteRecord};
pub use time::{Clock, SystemClock, Timestamp};
