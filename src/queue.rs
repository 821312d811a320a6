//! The debounced change queue, grounded on
//! `original_source/src/controller/config_agent.go`'s `trackResourceChange`
//! and `processChanges(applicable func(*Change) bool)`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::model::{Change, FullName};

/// Observed changes waiting for a debounce drain.
#[derive(Debug, Default)]
pub struct ChangeQueue {
    entries: HashMap<FullName, Change>,
}

impl ChangeQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of changes currently queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records an observation of a change to `full_name` at `now`. A
    /// repeat observation within the same debounce window bumps the
    /// entry's observation count without resetting its age.
    pub fn observe(&mut self, full_name: FullName, now: Instant) {
        self.entries
            .entry(full_name.clone())
            .and_modify(Change::observe_again)
            .or_insert_with(|| Change::new(full_name, now));
    }

    /// Removes and returns every queued change for which `predicate`
    /// holds, sorted so config changes precede workload changes observed
    /// in the same drain (resolving the source's open ordering question
    /// in the direction it invites — see SPEC_FULL.md §9), and ties
    /// broken by insertion age.
    pub fn drain(&mut self, predicate: impl Fn(&Change) -> bool) -> Vec<Change> {
        let keys = self.applicable(&predicate);
        keys.into_iter().filter_map(|key| self.entries.remove(&key)).collect()
    }

    /// Returns the keys of every queued change matching `predicate`,
    /// without removing them — used by the reconciler, which must
    /// consult the *current*, not-yet-drained queue state while deciding
    /// which workloads need an update (mirrors
    /// `processChanges`/`updateDeployment` in the source controller,
    /// where the change map is only pruned after every decision for the
    /// round has been made).
    #[must_use]
    pub fn applicable(&self, predicate: impl Fn(&Change) -> bool) -> Vec<FullName> {
        let mut keys: Vec<FullName> = self
            .entries
            .iter()
            .filter(|(_, change)| predicate(change))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort_by_key(|key| (key.kind().is_workload(), key.to_string()));
        keys
    }

    /// The observation count currently recorded for `name`, if queued.
    #[must_use]
    pub fn observations_of(&self, name: &FullName) -> Option<u32> {
        self.entries.get(name).map(Change::observations)
    }

    /// Removes a single entry, e.g. once its processing has completed.
    pub fn remove(&mut self, name: &FullName) -> Option<Change> {
        self.entries.remove(name)
    }
}

/// Debounce predicates matching `original_source`'s two drain modes.
pub mod predicate {
    use super::{Change, Duration, Instant};

    /// A change is ready once its age reaches the grace period — the
    /// regular per-tick drain predicate.
    pub fn aged(now: Instant, grace_period: Duration) -> impl Fn(&Change) -> bool {
        move |change| change.age(now) >= grace_period
    }

    /// A change is memory-sensitive once it has been re-observed at
    /// least once. Used only on the final shutdown drain, so debounced
    /// churn isn't silently dropped when the process exits.
    pub fn memory_sensitive() -> impl Fn(&Change) -> bool {
        |change| change.observations() > 1
    }
}
