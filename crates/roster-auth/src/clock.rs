//! Time source for token issuance and expiry checks.

use std::fmt;

use chrono::{DateTime, Utc};

/// Supplies the current time to [`JwtService`](crate::JwtService).
pub trait Clock: Send + Sync + fmt::Debug {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// The wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A manually driven clock for tests.
///
/// Resolution is one second, matching JWT `iat`/`exp`.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug)]
pub struct FixedClock {
    seconds: std::sync::atomic::AtomicI64,
}

#[cfg(any(test, feature = "test-utils"))]
impl FixedClock {
    /// Start the clock at `now`.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            seconds: std::sync::atomic::AtomicI64::new(now.timestamp()),
        }
    }

    /// Start the clock at a unix timestamp.
    #[must_use]
    pub fn at_timestamp(seconds: i64) -> Self {
        Self {
            seconds: std::sync::atomic::AtomicI64::new(seconds),
        }
    }

    /// Move the clock forward (or back, for negative durations).
    pub fn advance(&self, by: chrono::Duration) {
        self.seconds
            .fetch_add(by.num_seconds(), std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        let seconds = self.seconds.load(std::sync::atomic::Ordering::SeqCst);
        DateTime::from_timestamp(seconds, 0).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_advances() {
        let clock = FixedClock::at_timestamp(1_700_000_000);
        assert_eq!(clock.now().timestamp(), 1_700_000_000);

        clock.advance(chrono::Duration::seconds(61));
        assert_eq!(clock.now().timestamp(), 1_700_000_061);
    }

    #[test]
    fn system_clock_is_current() {
        let before = Utc::now();
        let now = SystemClock.now();
        assert!(now >= before);
    }
}
