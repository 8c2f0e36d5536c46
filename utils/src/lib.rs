//! Shared utilities for the tally vote recorder.

pub mod logging;

pub use logging::{init_logging, LogFormat, UnknownLogFormat};
