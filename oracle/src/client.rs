//! HTTP client for the balance oracle.

use async_trait::async_trait;
use tally_types::{TokenAmount, WalletAddress};
use tracing::debug;

use crate::types::{error_from_response, weight_from_body, OracleConfig};
use crate::{BalanceOracle, OracleError};

/// Client for the oracle's balance endpoint.
///
/// Sends `GET {base_url}/api/token/balanceOf/{wallet}` and parses the response.
pub struct HttpBalanceOracle {
    /// HTTP client (reusable connection pool).
    http_client: reqwest::Client,
    config: OracleConfig,
}

impl HttpBalanceOracle {
    /// Create a client with the configured timeouts.
    pub fn new(config: OracleConfig) -> Result<Self, OracleError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| OracleError::Config(e.to_string()))?;
        Ok(Self {
            http_client,
            config,
        })
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }
}

#[async_trait]
impl BalanceOracle for HttpBalanceOracle {
    async fn get_balance(&self, wallet: &WalletAddress) -> Result<TokenAmount, OracleError> {
        let url = self.config.balance_url(wallet.as_str());
        debug!(%wallet, %url, "querying balance oracle");

        let response = self.http_client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                OracleError::Timeout(e.to_string())
            } else if e.is_connect() {
                OracleError::Unreachable(format!("connection failed: {e}"))
            } else {
                OracleError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                OracleError::Timeout(e.to_string())
            } else {
                OracleError::RequestFailed(format!("failed to read body: {e}"))
            }
        })?;

        if !status.is_success() {
            return Err(error_from_response(status.as_u16(), &body));
        }

        let value: serde_json::Value = serde_json::from_slice(&body).map_err(|e| {
            OracleError::InvalidResponse(format!("failed to parse balance response: {e}"))
        })?;
        weight_from_body(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn client_creation() {
        let client = HttpBalanceOracle::new(OracleConfig::new("http://127.0.0.1:1")).unwrap();
        assert_eq!(client.config().base_url, "http://127.0.0.1:1");
    }

    #[tokio::test]
    async fn unreachable_oracle_is_retryable() {
        let mut cfg = OracleConfig::new("http://127.0.0.1:1");
        cfg.connect_timeout = Duration::from_millis(200);
        cfg.timeout = Duration::from_millis(500);
        let client = HttpBalanceOracle::new(cfg).unwrap();
        let err = client
            .get_balance(&WalletAddress::from_bytes([1; 20]))
            .await
            .unwrap_err();
        assert!(err.is_retryable(), "got {err:?}");
    }
}
