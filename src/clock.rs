//! Time source abstraction for the alarm scheduler.
//!
//! Alarms are minute-granular: the scheduler only ever asks "what time is it
//! right now, as a time of day". [`Clock`] is the single seam through which it
//! asks, so firing logic can be driven deterministically with a [`ManualClock`]
//! while production wiring uses [`WallClock`].

use std::sync::Mutex;

use chrono::{Local, NaiveTime};

/// # Source of the current local time of day.
///
/// Implementations must be cheap to call; the scheduler polls on every tick.
pub trait Clock: Send + Sync + 'static {
    /// Returns the current local time of day.
    fn now(&self) -> NaiveTime;
}

/// # System clock.
///
/// Reads the host's local time. This is the production implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct WallClock;

impl Clock for WallClock {
    fn now(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// # Manually advanced clock.
///
/// Holds a fixed time of day until [`set`](ManualClock::set) moves it. Used to
/// drive firing logic deterministically in tests and simulations.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<NaiveTime>,
}

impl ManualClock {
    /// Creates a clock frozen at `now`.
    pub fn new(now: NaiveTime) -> Self {
        Self { now: Mutex::new(now) }
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: NaiveTime) {
        let mut slot = self.now.lock().unwrap_or_else(|p| p.into_inner());
        *slot = now;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveTime {
        *self.now.lock().unwrap_or_else(|p| p.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_manual_clock_holds_and_moves() {
        let clock = ManualClock::new(t(8, 0));
        assert_eq!(clock.now(), t(8, 0));
        assert_eq!(clock.now(), t(8, 0), "manual clock must not advance on its own");

        clock.set(t(8, 1));
        assert_eq!(clock.now(), t(8, 1));
    }
}
