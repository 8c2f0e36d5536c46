//! LMDB storage backend for the tally vote recorder.
//!
//! Implements [`tally_store::ProjectStore`] using the `heed` LMDB bindings.
//! Projects are stored as JSON documents keyed by project id. LMDB allows a
//! single writer at a time, so the version check and the write in `save`
//! run inside one write transaction and cannot interleave with another save.

pub mod environment;
pub mod error;
pub mod integrity;
pub mod project;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use integrity::{check_data_dir, check_integrity, IntegrityReport};
pub use project::LmdbProjectStore;
