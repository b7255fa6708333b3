//! Clock implementations and epoch-day arithmetic.
//!
//! [`SystemClock`] reads the host wall clock. [`ManualClock`] is advanced
//! explicitly and drives tests and the simulator.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::constants::SECONDS_PER_DAY;
use crate::traits::Clock;

/// Epoch day of a Unix timestamp: `timestamp / 86_400`, truncating.
///
/// Two timestamps inside the same 86,400-second window share an epoch day
/// regardless of time of day.
///
/// # Examples
///
/// ```
/// use lode_core::clock::epoch_day;
/// assert_eq!(epoch_day(0), 0);
/// assert_eq!(epoch_day(86_399), 0);
/// assert_eq!(epoch_day(86_400), 1);
/// ```
pub fn epoch_day(timestamp: u64) -> u64 {
    timestamp / SECONDS_PER_DAY
}

/// Host wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

/// Manually advanced clock.
///
/// Shareable across threads; every read observes the latest `set`/`advance`.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    /// Create a clock reading `start` Unix seconds.
    pub fn new(start: u64) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    /// Create a clock at the first second of epoch day `day`.
    pub fn at_day(day: u64) -> Self {
        Self::new(day.saturating_mul(SECONDS_PER_DAY))
    }

    /// Set the current time.
    pub fn set(&self, timestamp: u64) {
        self.now.store(timestamp, Ordering::SeqCst);
    }

    /// Move the clock forward by `secs` seconds.
    pub fn advance_secs(&self, secs: u64) {
        let _ = self
            .now
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |t| {
                Some(t.saturating_add(secs))
            });
    }

    /// Move the clock forward by whole days.
    pub fn advance_days(&self, days: u64) {
        self.advance_secs(days.saturating_mul(SECONDS_PER_DAY));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::at_day(100);
        assert_eq!(clock.today(), 100);
        clock.advance_secs(SECONDS_PER_DAY - 1);
        assert_eq!(clock.today(), 100);
        clock.advance_secs(1);
        assert_eq!(clock.today(), 101);
        clock.advance_days(9);
        assert_eq!(clock.today(), 110);
    }

    #[test]
    fn manual_clock_saturates() {
        let clock = ManualClock::new(u64::MAX - 1);
        clock.advance_days(5);
        assert_eq!(clock.now(), u64::MAX);
    }

    #[test]
    fn system_clock_is_past_2020() {
        // 2020-01-01 is epoch day 18262.
        assert!(SystemClock.today() > 18_262);
    }

    proptest! {
        #[test]
        fn epoch_day_is_floor_division(ts in 0u64..=u64::MAX) {
            let day = epoch_day(ts);
            prop_assert!(day * SECONDS_PER_DAY <= ts);
            prop_assert!(ts - day * SECONDS_PER_DAY < SECONDS_PER_DAY);
        }
    }
}
