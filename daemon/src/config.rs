//! Daemon configuration.
//!
//! Loaded from a TOML file via [`ServiceConfig::from_toml_file`] or built
//! from defaults, then overridden by environment variables and CLI flags.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tally_oracle::OracleConfig;
use tally_types::TokenAmount;
use tally_utils::LogFormat;
use tally_voting::{EligibilityConfig, VoteServiceConfig};
use thiserror::Error;

/// Environment variables the original deployment used, honoured when the
/// corresponding `TALLY_*` setting is not given.
pub const LEGACY_MIN_TOKEN_VAR: &str = "VOTING_MIN_TOKEN";
pub const LEGACY_ORACLE_URL_VAR: &str = "BASE_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Address the HTTP API binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Base URL of the balance oracle.
    #[serde(default = "default_oracle_base_url")]
    pub oracle_base_url: String,

    /// Minimum balance needed to vote. Unset means no minimum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_vote_tokens: Option<TokenAmount>,

    #[serde(default = "default_oracle_timeout_ms")]
    pub oracle_timeout_ms: u64,

    #[serde(default = "default_oracle_connect_timeout_ms")]
    pub oracle_connect_timeout_ms: u64,

    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,

    #[serde(default = "default_max_save_attempts")]
    pub max_save_attempts: u32,

    /// LMDB data directory.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// LMDB map size in bytes.
    #[serde(default = "default_map_size")]
    pub map_size: usize,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Defaults ───────────────────────────────────────────────────────────

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

fn default_oracle_base_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_oracle_timeout_ms() -> u64 {
    10_000
}

fn default_oracle_connect_timeout_ms() -> u64 {
    5_000
}

fn default_store_timeout_ms() -> u64 {
    5_000
}

fn default_max_save_attempts() -> u32 {
    3
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./tally_data")
}

fn default_map_size() -> usize {
    1 << 30
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ServiceConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Fill settings from the original deployment's variables. Only
    /// settings still at their defaults are touched.
    pub fn apply_legacy_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.min_vote_tokens.is_none() {
            if let Some(raw) = lookup(LEGACY_MIN_TOKEN_VAR).filter(|v| !v.trim().is_empty()) {
                let amount = TokenAmount::parse(&raw).map_err(|e| {
                    ConfigError::Invalid(format!("{LEGACY_MIN_TOKEN_VAR}: {e}"))
                })?;
                self.min_vote_tokens = Some(amount);
            }
        }
        if self.oracle_base_url == default_oracle_base_url() {
            if let Some(url) = lookup(LEGACY_ORACLE_URL_VAR).filter(|v| !v.trim().is_empty()) {
                self.oracle_base_url = url.trim().to_string();
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.oracle_base_url.starts_with("http://")
            || self.oracle_base_url.starts_with("https://"))
        {
            return Err(ConfigError::Invalid(format!(
                "oracle_base_url must be an http(s) URL, got \"{}\"",
                self.oracle_base_url
            )));
        }
        if self.max_save_attempts == 0 {
            return Err(ConfigError::Invalid("max_save_attempts must be at least 1".into()));
        }
        if self.oracle_timeout_ms == 0 || self.store_timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeouts must be non-zero".into()));
        }
        Ok(())
    }

    pub fn oracle_config(&self) -> OracleConfig {
        OracleConfig {
            base_url: self.oracle_base_url.clone(),
            timeout: Duration::from_millis(self.oracle_timeout_ms),
            connect_timeout: Duration::from_millis(self.oracle_connect_timeout_ms),
        }
    }

    pub fn vote_service_config(&self) -> VoteServiceConfig {
        VoteServiceConfig {
            eligibility: EligibilityConfig {
                min_vote_tokens: self.min_vote_tokens.clone(),
            },
            oracle_timeout: Duration::from_millis(self.oracle_timeout_ms),
            store_timeout: Duration::from_millis(self.store_timeout_ms),
            max_save_attempts: self.max_save_attempts,
        }
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("ServiceConfig is always serializable to TOML")
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            oracle_base_url: default_oracle_base_url(),
            min_vote_tokens: None,
            oracle_timeout_ms: default_oracle_timeout_ms(),
            oracle_connect_timeout_ms: default_oracle_connect_timeout_ms(),
            store_timeout_ms: default_store_timeout_ms(),
            max_save_attempts: default_max_save_attempts(),
            data_dir: default_data_dir(),
            map_size: default_map_size(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = ServiceConfig::default();
        let parsed = ServiceConfig::from_toml_str(&config.to_toml_string()).expect("should parse");
        assert_eq!(parsed.listen_addr, config.listen_addr);
        assert_eq!(parsed.max_save_attempts, 3);
        assert!(parsed.min_vote_tokens.is_none());
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = ServiceConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.store_timeout_ms, 5_000);
        assert_eq!(config.log_format, LogFormat::Human);
        config.validate().unwrap();
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            oracle_base_url = "https://tokens.example.org"
            min_vote_tokens = "0.5"
            log_format = "json"
        "#;
        let config = ServiceConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.oracle_base_url, "https://tokens.example.org");
        assert_eq!(config.min_vote_tokens, Some(TokenAmount::parse("0.5").unwrap()));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.oracle_timeout_ms, 10_000); // default
    }

    #[test]
    fn numeric_threshold_accepted() {
        let config = ServiceConfig::from_toml_str("min_vote_tokens = 50").unwrap();
        assert_eq!(config.min_vote_tokens, Some(TokenAmount::from_u64(50)));
    }

    #[test]
    fn legacy_env_fills_unset_values() {
        let env: HashMap<&str, &str> =
            HashMap::from([("VOTING_MIN_TOKEN", "50"), ("BASE_URL", "https://app.example")]);
        let mut config = ServiceConfig::default();
        config
            .apply_legacy_env(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.min_vote_tokens, Some(TokenAmount::from_u64(50)));
        assert_eq!(config.oracle_base_url, "https://app.example");
    }

    #[test]
    fn legacy_env_does_not_override_file() {
        let mut config =
            ServiceConfig::from_toml_str("min_vote_tokens = \"7\"").expect("should parse");
        config
            .apply_legacy_env(|k| (k == "VOTING_MIN_TOKEN").then(|| "50".to_string()))
            .unwrap();
        assert_eq!(config.min_vote_tokens, Some(TokenAmount::from_u64(7)));
    }

    #[test]
    fn bad_legacy_threshold_is_an_error() {
        let mut config = ServiceConfig::default();
        let result = config.apply_legacy_env(|k| (k == "VOTING_MIN_TOKEN").then(|| "lots".into()));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_non_http_oracle() {
        let config = ServiceConfig {
            oracle_base_url: "ftp://x".into(),
            ..ServiceConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_returns_read_error() {
        let result = ServiceConfig::from_toml_file(std::path::Path::new("/nonexistent/tally.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
