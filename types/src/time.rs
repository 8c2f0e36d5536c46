//! Timestamp type used throughout the workspace.
//!
//! Timestamps are Unix epoch milliseconds (UTC), the resolution voting windows
//! are defined in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// A Unix timestamp in milliseconds since epoch (UTC).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch (time zero).
    pub const EPOCH: Self = Self(0);

    pub fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Get the current system time as a `Timestamp`.
    ///
    /// A clock set before the epoch reads as the epoch.
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self(millis)
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    pub fn saturating_add_millis(self, millis: u64) -> Self {
        Self(self.0.saturating_add(millis))
    }

    pub fn saturating_sub_millis(self, millis: u64) -> Self {
        Self(self.0.saturating_sub(millis))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Source of wall-clock time.
///
/// Injected into the vote pipeline so tests can pin "now" to a window boundary.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// The real system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}
