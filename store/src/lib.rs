//! Abstract storage traits for the tally vote recorder.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The vote pipeline depends only on the traits.

pub mod error;
pub mod project;

pub use error::StoreError;
pub use project::ProjectStore;
