//! The vote acceptance pipeline.
//!
//! One request, one wallet, one project:
//! request shape → ballot parse → balance oracle → eligibility → signature → ledger.
//!
//! Key principle: one wallet = one vote per project, ever, weighted by the
//! wallet's token balance at vote time. The ledger is the only stage that
//! mutates anything and it is all-or-nothing.

pub mod auth;
pub mod ballot;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod ledger;
pub mod repo;
pub mod request;
pub mod service;

pub use auth::authenticate;
pub use ballot::{parse_ballot, BallotError};
pub use config::VoteServiceConfig;
pub use eligibility::{EligibilityConfig, EligibilityError, EligibilityPolicy};
pub use error::VoteError;
pub use ledger::VoteLedger;
pub use repo::StoreAccess;
pub use request::{ValidatedVote, VoteRequest};
pub use service::VoteService;
