//! # Clock Module
//!
//! Source of "now" for every timestamp the ledger records.
//! Timestamps are local wall-clock time truncated to whole seconds.

use chrono::{Duration, Local, NaiveDateTime, Timelike};
use std::sync::Mutex;

/// Supplies the current local time
pub trait Clock: Send + Sync {
    /// Current local time, seconds precision
    fn now(&self) -> NaiveDateTime;
}

/// Drop sub-second precision
pub fn truncate_to_seconds(at: NaiveDateTime) -> NaiveDateTime {
    at.with_nanosecond(0).unwrap_or(at)
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        truncate_to_seconds(Local::now().naive_local())
    }
}

/// Manually driven clock for tests and simulations
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(at: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(truncate_to_seconds(at)),
        }
    }

    /// Jump to a specific instant
    pub fn set(&self, at: NaiveDateTime) {
        let mut guard = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *guard = truncate_to_seconds(at);
    }

    /// Move forward by `by`
    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_system_clock_has_no_subsecond_part() {
        assert_eq!(SystemClock.now().nanosecond(), 0);
    }

    #[test]
    fn test_fixed_clock_advance() {
        let clock = FixedClock::new(at(9, 0, 0));
        clock.advance(Duration::days(1));
        assert_eq!(clock.now(), at(9, 0, 0) + Duration::days(1));

        clock.set(at(23, 59, 59));
        assert_eq!(clock.now(), at(23, 59, 59));
    }
}
