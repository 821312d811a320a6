//! In-memory representation of a tracked workload, grounded on
//! `original_source/src/controller/deployment.go`.

use std::collections::BTreeMap;

use crate::model::FullName;

/// A workload tracked by the graph store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadNode {
    referenced_configs: Vec<FullName>,
    applied_checksums: BTreeMap<String, String>,
}

impl WorkloadNode {
    /// Creates a workload node from its initial referenced configs and
    /// applied-checksum annotation.
    #[must_use]
    pub fn new(referenced_configs: Vec<FullName>, applied_checksums: BTreeMap<String, String>) -> Self {
        Self {
            referenced_configs,
            applied_checksums,
        }
    }

    /// Configs this workload currently references, in sorted order.
    #[must_use]
    pub fn referenced_configs(&self) -> &[FullName] {
        &self.referenced_configs
    }

    /// Checksums this workload has recorded as already applied.
    #[must_use]
    pub fn applied_checksums(&self) -> &BTreeMap<String, String> {
        &self.applied_checksums
    }

    /// Updates the referenced-config set and applied-checksum map,
    /// returning whether either actually changed — mirrors
    /// `Deployment.UpdateFromMeta`'s changed-bool return.
    pub fn update_from(
        &mut self,
        referenced_configs: Vec<FullName>,
        applied_checksums: BTreeMap<String, String>,
    ) -> bool {
        let refs_changed = self.referenced_configs != referenced_configs;
        let checksums_changed = self.applied_checksums != applied_checksums;
        self.referenced_configs = referenced_configs;
        self.applied_checksums = applied_checksums;
        refs_changed || checksums_changed
    }

    /// Records that `checksum` has now been applied for `config`.
    pub fn record_applied(&mut self, config: FullName, checksum: String) {
        self.applied_checksums.insert(config.to_string(), checksum);
    }

    /// Replaces the applied-checksum map wholesale, e.g. after a
    /// successful patch confirms the new state.
    pub fn set_applied_checksums(&mut self, applied_checksums: BTreeMap<String, String>) {
        self.applied_checksums = applied_checksums;
    }

    /// Drops applied-checksum entries for configs no longer referenced.
    pub fn prune_applied_checksums(&mut self) {
        let referenced: std::collections::BTreeSet<String> = self
            .referenced_configs
            .iter()
            .map(std::string::ToString::to_string)
            .collect();
        self.applied_checksums
            .retain(|key, _| referenced.contains(key));
    }
}
