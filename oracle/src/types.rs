//! Oracle configuration and response interpretation.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tally_types::TokenAmount;

use crate::OracleError;

/// Default timeout for a balance request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connection timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// How to reach the oracle.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Base URL, e.g. `https://tokens.example.org`.
    pub base_url: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl OracleConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// URL of the balance endpoint for `wallet`.
    pub fn balance_url(&self, wallet: &str) -> String {
        format!(
            "{}/api/token/balanceOf/{}",
            self.base_url.trim_end_matches('/'),
            wallet
        )
    }
}

/// Extract the voting weight from a successful response body.
///
/// `tokenHave` may be a decimal string or a JSON number. Missing, `null`,
/// `""`, `0` and `false` all mean zero; anything else that is not a
/// non-negative decimal is an invalid response.
pub fn weight_from_body(body: &serde_json::Value) -> Result<TokenAmount, OracleError> {
    let Some(obj) = body.as_object() else {
        return Err(OracleError::InvalidResponse(
            "balance response is not a JSON object".into(),
        ));
    };
    match obj.get("tokenHave") {
        None | Some(serde_json::Value::Null) | Some(serde_json::Value::Bool(false)) => {
            Ok(TokenAmount::zero())
        }
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(TokenAmount::zero()),
        Some(serde_json::Value::String(s)) => TokenAmount::parse(s)
            .map_err(|e| OracleError::InvalidResponse(format!("tokenHave: {e}"))),
        Some(serde_json::Value::Number(n)) => TokenAmount::parse(&n.to_string())
            .map_err(|e| OracleError::InvalidResponse(format!("tokenHave: {e}"))),
        Some(other) => Err(OracleError::InvalidResponse(format!(
            "tokenHave has unexpected type: {other}"
        ))),
    }
}

/// Classify a non-success response.
///
/// A JSON object carrying a string `message` is the oracle speaking for
/// itself and is relayed; anything else means the oracle is not healthy.
pub fn error_from_response(status: u16, body: &[u8]) -> OracleError {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) {
        if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
            return OracleError::Rejected {
                status,
                message: message.to_string(),
                body: value.clone(),
            };
        }
    }
    OracleError::RequestFailed(format!("HTTP status {status}"))
}
