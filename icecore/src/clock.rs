//! Wall-clock abstraction.
//!
//! Credential synthesis and cache expiry both depend on "now". Reading it
//! through [`Clock`] lets tests pin time to a fixed instant and step it
//! forward explicitly.

use chrono::{DateTime, Duration, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// Source of the current UTC time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
///
/// Stored as milliseconds since the Unix epoch so it can be shared between
/// tasks without a lock.
#[derive(Debug)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            millis: AtomicI64::new(start.timestamp_millis()),
        }
    }

    /// Clock fixed at the given Unix time in seconds.
    pub fn at_unix(secs: i64) -> Self {
        Self {
            millis: AtomicI64::new(secs.saturating_mul(1000)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.millis
            .fetch_add(by.num_milliseconds(), Ordering::SeqCst);
    }

    pub fn set(&self, to: DateTime<Utc>) {
        self.millis.store(to.timestamp_millis(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let millis = self.millis.load(Ordering::SeqCst);
        DateTime::from_timestamp_millis(millis).unwrap_or(DateTime::UNIX_EPOCH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_reasonable() {
        let ts = SystemClock.now().timestamp();
        // Should be after 2024-01-01 (1704067200)
        assert!(ts > 1704067200, "Timestamp {} is too old", ts);
    }

    #[test]
    fn test_manual_clock_advances_only_when_told() {
        let clock = ManualClock::at_unix(1_700_000_000);
        assert_eq!(clock.now().timestamp(), 1_700_000_000);
        assert_eq!(clock.now().timestamp(), 1_700_000_000);

        clock.advance(Duration::hours(2));
        assert_eq!(clock.now().timestamp(), 1_700_007_200);

        clock.set(DateTime::from_timestamp(1_800_000_000, 0).unwrap());
        assert_eq!(clock.now().timestamp(), 1_800_000_000);
    }
}
