//! Settings for the vote pipeline, supplied at construction time.

use std::time::Duration;

use crate::eligibility::EligibilityConfig;

/// Default bound on a single oracle call.
pub const DEFAULT_ORACLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default bound on a single repository call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// How many times the ledger reloads and retries after a version conflict.
pub const DEFAULT_MAX_SAVE_ATTEMPTS: u32 = 3;

#[derive(Clone, Debug)]
pub struct VoteServiceConfig {
    pub eligibility: EligibilityConfig,
    pub oracle_timeout: Duration,
    pub store_timeout: Duration,
    pub max_save_attempts: u32,
}

impl Default for VoteServiceConfig {
    fn default() -> Self {
        Self {
            eligibility: EligibilityConfig::default(),
            oracle_timeout: DEFAULT_ORACLE_TIMEOUT,
            store_timeout: DEFAULT_STORE_TIMEOUT,
            max_save_attempts: DEFAULT_MAX_SAVE_ATTEMPTS,
        }
    }
}
