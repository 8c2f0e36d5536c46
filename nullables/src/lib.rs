//! Nullable infrastructure for deterministic testing.
//!
//! Inspired by the "A-frame architecture" pattern from RsNano.
//! Every external dependency of the vote pipeline (clock, balance oracle,
//! project store) sits behind a trait. This crate provides test-friendly
//! implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically (latency, outages, conflicts)
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod oracle;
pub mod store;

pub use clock::NullClock;
pub use oracle::NullBalanceOracle;
pub use store::NullProjectStore;
