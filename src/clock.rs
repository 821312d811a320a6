//! Clock abstraction so grace-period and timestamp logic can be tested
//! without sleeping real wall-clock time.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

/// Source of both a monotonic instant (for aging the change queue) and a
/// wall-clock timestamp (for the restart-trigger annotation).
pub trait Clock: Send + Sync {
    /// A monotonic instant usable for measuring elapsed durations.
    fn now(&self) -> Instant;
    /// The current wall-clock time, formatted for the restart-trigger
    /// annotation (`Mon _2 15:04:05`-equivalent, see
    /// [`format_restart_timestamp`]).
    fn restart_timestamp(&self) -> String;
}

/// Formats a timestamp the way `original_source/src/controller/meta_deployment.go`
/// does via Go's `time.Stamp` layout: short weekday, space-padded day,
/// 24-hour clock, no year or timezone.
pub fn format_restart_timestamp(at: DateTime<Utc>) -> String {
    at.format("%b %e %H:%M:%S").to_string()
}

/// Clock backed by the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn restart_timestamp(&self) -> String {
        format_restart_timestamp(Utc::now())
    }
}

/// Deterministic clock for tests: `now()` and `restart_timestamp()` only
/// change when explicitly advanced.
#[derive(Debug, Clone)]
pub struct TestClock {
    inner: Arc<Mutex<TestClockState>>,
}

#[derive(Debug)]
struct TestClockState {
    started_at: Instant,
    elapsed: Duration,
    wall: DateTime<Utc>,
}

impl TestClock {
    /// Creates a test clock anchored at a fixed wall-clock time.
    #[must_use]
    pub fn new(wall: DateTime<Utc>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(TestClockState {
                started_at: Instant::now(),
                elapsed: Duration::ZERO,
                wall,
            })),
        }
    }

    /// Advances both the monotonic and wall-clock readings by `step`.
    pub fn advance(&self, step: Duration) {
        let mut state = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        state.elapsed += step;
        state.wall += chrono::Duration::from_std(step).unwrap_or_default();
    }
}

impl Clock for TestClock {
    fn now(&self) -> Instant {
        let state = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        state.started_at + state.elapsed
    }

    fn restart_timestamp(&self) -> String {
        let state = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        format_restart_timestamp(state.wall)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn format_matches_go_stamp_shape() {
        let at = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 3).unwrap();
        assert_eq!(format_restart_timestamp(at), "Mar  7 09:05:03");
    }

    #[test]
    fn test_clock_advances_both_readings() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let clock = TestClock::new(start);
        let t0 = clock.now();
        clock.advance(Duration::from_secs(5));
        assert_eq!(clock.now() - t0, Duration::from_secs(5));
        assert_eq!(clock.restart_timestamp(), "Jan  1 00:00:05");
    }
}
