//! In-memory representation of a tracked config object, grounded on
//! `original_source/src/controller/config.go`.

use std::collections::BTreeSet;

use crate::model::FullName;

/// A config tracked by the graph store. `checksum` is `None` while the
/// config is *pending* — referenced by a workload but not yet observed —
/// matching `Config.Pending()` in the source controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigNode {
    checksum: Option<String>,
    workloads: BTreeSet<FullName>,
}

impl ConfigNode {
    /// Creates a pending config node with no known checksum yet, tracked
    /// because some workload references it.
    #[must_use]
    pub fn pending() -> Self {
        Self {
            checksum: None,
            workloads: BTreeSet::new(),
        }
    }

    /// Creates a config node with an already-known checksum.
    #[must_use]
    pub fn with_checksum(checksum: String) -> Self {
        Self {
            checksum: Some(checksum),
            workloads: BTreeSet::new(),
        }
    }

    /// `true` while no checksum has been observed yet.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.checksum.is_none()
    }

    /// The last-observed checksum, if any.
    #[must_use]
    pub fn checksum(&self) -> Option<&str> {
        self.checksum.as_deref()
    }

    /// Sets the checksum, returning whether it actually changed (and so a
    /// change should be queued).
    pub fn update_checksum(&mut self, checksum: String) -> bool {
        let changed = self.checksum.as_deref() != Some(checksum.as_str());
        self.checksum = Some(checksum);
        changed
    }

    /// Reverts to pending (no known checksum) while keeping the workload
    /// links intact — used when the underlying object is deleted but a
    /// workload still references it.
    pub fn clear_checksum(&mut self) {
        self.checksum = None;
    }

    /// The workloads currently referencing this config.
    #[must_use]
    pub fn workloads(&self) -> &BTreeSet<FullName> {
        &self.workloads
    }

    /// Links a workload to this config.
    pub fn add_workload(&mut self, workload: FullName) {
        self.workloads.insert(workload);
    }

    /// Unlinks a workload from this config.
    pub fn remove_workload(&mut self, workload: &FullName) {
        self.workloads.remove(workload);
    }

    /// A config is garbage once nothing tracks it and it never became
    /// part of the confirmed checksum set — mirrors `Config.Unused()`.
    #[must_use]
    pub fn is_unused(&self) -> bool {
        self.is_pending() && self.workloads.is_empty()
    }
}
