//! Nullable clock: deterministic time for testing.

use std::sync::atomic::{AtomicU64, Ordering};

use tally_types::{Clock, Timestamp};

/// A deterministic clock for testing.
///
/// Time only advances when you tell it to.
pub struct NullClock {
    current: AtomicU64,
}

impl NullClock {
    pub fn new(initial: Timestamp) -> Self {
        Self {
            current: AtomicU64::new(initial.as_millis()),
        }
    }

    /// Advance time by a number of milliseconds.
    pub fn advance(&self, millis: u64) {
        self.current.fetch_add(millis, Ordering::SeqCst);
    }

    /// Set the time to a specific value.
    pub fn set(&self, at: Timestamp) {
        self.current.store(at.as_millis(), Ordering::SeqCst);
    }
}

impl Clock for NullClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.current.load(Ordering::SeqCst))
    }
}
