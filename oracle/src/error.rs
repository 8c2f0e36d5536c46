use thiserror::Error;

#[derive(Clone, Debug, Error)]
pub enum OracleError {
    /// The oracle answered with a structured error. Relayed to the voter as-is.
    #[error("oracle rejected request ({status}): {message}")]
    Rejected {
        status: u16,
        message: String,
        body: serde_json::Value,
    },

    #[error("oracle request timed out: {0}")]
    Timeout(String),

    #[error("oracle unreachable: {0}")]
    Unreachable(String),

    #[error("HTTP request to oracle failed: {0}")]
    RequestFailed(String),

    #[error("invalid response from oracle: {0}")]
    InvalidResponse(String),

    #[error("oracle client misconfigured: {0}")]
    Config(String),
}

impl OracleError {
    /// Whether retrying the same request later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, OracleError::Timeout(_) | OracleError::Unreachable(_))
    }
}
