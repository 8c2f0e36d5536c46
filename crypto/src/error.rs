use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),
}
