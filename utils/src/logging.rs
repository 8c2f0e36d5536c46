//! Structured logging initialisation for the tally daemon.
//!
//! Two output formats are supported:
//! - [`LogFormat::Human`]: coloured, human-readable lines (development).
//! - [`LogFormat::Json`]: newline-delimited JSON (production / log aggregation).
//!
//! The filter level can be overridden at runtime via the `RUST_LOG`
//! environment variable.  When `RUST_LOG` is not set, the caller-supplied
//! `level` string is used (e.g. `"info"`, `"debug,tally_voting=trace"`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::{fmt as layer_fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Selects the output format for structured logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Pretty-printed, coloured output for local development.
    #[default]
    Human,
    /// Newline-delimited JSON for production and log aggregation pipelines.
    Json,
}

#[derive(Debug, Error)]
#[error("unknown log format \"{0}\" (expected \"human\" or \"json\")")]
pub struct UnknownLogFormat(String);

impl FromStr for LogFormat {
    type Err = UnknownLogFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human" | "text" => Ok(LogFormat::Human),
            "json" => Ok(LogFormat::Json),
            other => Err(UnknownLogFormat(other.to_string())),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogFormat::Human => "human",
            LogFormat::Json => "json",
        })
    }
}

/// Initialise the global tracing subscriber.
///
/// # Panics
///
/// Panics if a global subscriber has already been set (i.e. this function
/// was called twice in the same process).
pub fn init_logging(format: LogFormat, level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Human => {
            tracing_subscriber::registry()
                .with(filter)
                .with(layer_fmt::layer().with_target(true))
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    layer_fmt::layer()
                        .json()
                        .with_target(true)
                        .with_current_span(false),
                )
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_formats() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(" Human ".parse::<LogFormat>().unwrap(), LogFormat::Human);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&LogFormat::Json).unwrap(), "\"json\"");
        let parsed: LogFormat = serde_json::from_str("\"human\"").unwrap();
        assert_eq!(parsed, LogFormat::Human);
    }
}
