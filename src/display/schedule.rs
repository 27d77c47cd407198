//! # Refresh Schedule
//!
//! Fixed-period task timing for the dashboard's redraw work.
//!
//! A schedule is polled from the UI thread on every frame. It fires when its
//! period has elapsed and reports how long the UI may sleep before it is due
//! again. Schedules are plain values owned by the window's app state, so they
//! stop when the window goes away.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct RefreshSchedule {
    period: Duration,
    next_due: Instant,
}

impl RefreshSchedule {
    /// Create a schedule that is due immediately
    pub fn new(period: Duration, now: Instant) -> Self {
        Self {
            period,
            next_due: now,
        }
    }

    /// Create a schedule from a period in milliseconds
    pub fn from_millis(period_ms: u64, now: Instant) -> Self {
        Self::new(Duration::from_millis(period_ms), now)
    }

    /// Fire if due, and arm the next deadline one period from `now`
    ///
    /// Missed periods are not replayed.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        if now < self.next_due {
            return false;
        }
        self.next_due = now + self.period;
        true
    }

    /// Time left before the schedule is due
    pub fn time_until_due(&self, now: Instant) -> Duration {
        self.next_due.saturating_duration_since(now)
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERIOD: Duration = Duration::from_millis(100);

    #[test]
    fn test_due_immediately() {
        let now = Instant::now();
        let mut schedule = RefreshSchedule::new(PERIOD, now);
        assert_eq!(schedule.time_until_due(now), Duration::ZERO);
        assert!(schedule.fire_if_due(now));
    }

    #[test]
    fn test_does_not_fire_twice_within_period() {
        let start = Instant::now();
        let mut schedule = RefreshSchedule::new(PERIOD, start);

        assert!(schedule.fire_if_due(start));
        assert!(!schedule.fire_if_due(start + Duration::from_millis(50)));
        assert_eq!(
            schedule.time_until_due(start + Duration::from_millis(50)),
            Duration::from_millis(50)
        );
        assert!(schedule.fire_if_due(start + PERIOD));
    }

    #[test]
    fn test_missed_periods_fire_once() {
        let start = Instant::now();
        let mut schedule = RefreshSchedule::from_millis(100, start);
        assert!(schedule.fire_if_due(start));

        let late = start + Duration::from_millis(1000);
        assert!(schedule.fire_if_due(late));
        assert!(!schedule.fire_if_due(late + Duration::from_millis(10)));
        assert_eq!(schedule.time_until_due(late), PERIOD);
    }
}
