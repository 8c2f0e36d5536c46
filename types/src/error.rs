//! Top-level error type shared across crates.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TypesError {
    #[error("invalid wallet address: {0}")]
    InvalidAddress(String),

    #[error("invalid token amount: {0}")]
    InvalidAmount(String),

    #[error("invalid project: {0}")]
    InvalidProject(String),
}
