//! A single debounced change entry, grounded on
//! `original_source/src/controller/change.go`.

use std::time::{Duration, Instant};

use super::identity::{FullName, Kind};

/// An observed change to a tracked object, pending a debounce drain.
#[derive(Debug, Clone)]
pub struct Change {
    full_name: FullName,
    created_at: Instant,
    observations: u32,
}

impl Change {
    /// Records a first observation of a change to `full_name` at `now`.
    #[must_use]
    pub fn new(full_name: FullName, now: Instant) -> Self {
        Self {
            full_name,
            created_at: now,
            observations: 1,
        }
    }

    /// The changed object's identity.
    #[must_use]
    pub fn full_name(&self) -> &FullName {
        &self.full_name
    }

    /// The object kind, forwarded from its identity.
    #[must_use]
    pub fn kind(&self) -> Kind {
        self.full_name.kind()
    }

    /// How many times this change has been observed since it was first
    /// queued (re-observing the same key bumps this without resetting
    /// `created_at`).
    #[must_use]
    pub fn observations(&self) -> u32 {
        self.observations
    }

    /// Bumps the observation count for a repeat observation of the same
    /// key within the same debounce window.
    pub fn observe_again(&mut self) {
        self.observations = self.observations.saturating_add(1);
    }

    /// Elapsed time since this change was first observed.
    #[must_use]
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_grows_with_elapsed_time() {
        let fname = FullName::new(Kind::ConfigMap, "ns", "cfg");
        let t0 = Instant::now();
        let change = Change::new(fname, t0);
        let t1 = t0 + Duration::from_millis(250);
        assert_eq!(change.age(t1), Duration::from_millis(250));
    }

    #[test]
    fn observe_again_increments_without_resetting_age() {
        let fname = FullName::new(Kind::ConfigMap, "ns", "cfg");
        let t0 = Instant::now();
        let mut change = Change::new(fname, t0);
        change.observe_again();
        change.observe_again();
        assert_eq!(change.observations(), 3);
        assert_eq!(change.age(t0), Duration::ZERO);
    }
}
