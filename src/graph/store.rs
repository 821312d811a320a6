//! The single-writer in-memory bidirectional graph between workloads and
//! the configs they reference, grounded on the tracking/cleanup methods
//! of `original_source/src/controller/config_agent.go`
//! (`trackConfig`, `trackDeployment`, `linkConfigToDeployment`,
//! `cleanupDeployment`, `cleanupConfig`).

use std::collections::{BTreeMap, HashMap};

use crate::model::FullName;

use super::config_node::ConfigNode;
use super::workload_node::WorkloadNode;

/// Owns every tracked [`ConfigNode`] and [`WorkloadNode`]. Intended to be
/// owned exclusively by the reconciler task — no internal locking.
#[derive(Debug, Default)]
pub struct GraphStore {
    configs: HashMap<FullName, ConfigNode>,
    workloads: HashMap<FullName, WorkloadNode>,
}

impl GraphStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked configs (pending or checksummed).
    #[must_use]
    pub fn configs_len(&self) -> usize {
        self.configs.len()
    }

    /// Number of tracked (enabled) workloads.
    #[must_use]
    pub fn workloads_len(&self) -> usize {
        self.workloads.len()
    }

    /// Looks up a workload's current state.
    #[must_use]
    pub fn workload(&self, full_name: &FullName) -> Option<&WorkloadNode> {
        self.workloads.get(full_name)
    }

    /// Looks up a workload's current state mutably.
    pub fn workload_mut(&mut self, full_name: &FullName) -> Option<&mut WorkloadNode> {
        self.workloads.get_mut(full_name)
    }

    /// Looks up a config's current state.
    #[must_use]
    pub fn config(&self, full_name: &FullName) -> Option<&ConfigNode> {
        self.configs.get(full_name)
    }

    /// Records an observed checksum for a config, creating the node if a
    /// workload had already referenced it as pending. Returns `true` if
    /// the checksum actually changed (a real content change, not a
    /// first-sight observation producing the same pending state).
    pub fn track_config(&mut self, full_name: FullName, checksum: String) -> bool {
        self.configs
            .entry(full_name)
            .or_insert_with(ConfigNode::pending)
            .update_checksum(checksum)
    }

    /// Records or updates a workload. If `enabled` is `false` — the
    /// opt-in annotation was removed or never present — this is treated
    /// as a full removal, matching the spec's "opt-out flip is a
    /// deletion" rule. Otherwise, new config references are attached
    /// *before* stale ones are detached, so a config referenced both
    /// before and after this update is never transiently unlinked.
    ///
    /// Returns `true` if tracked state actually changed.
    pub fn track_workload(
        &mut self,
        full_name: FullName,
        enabled: bool,
        referenced_configs: Vec<FullName>,
        applied_checksums: BTreeMap<String, String>,
    ) -> bool {
        if !enabled {
            let existed = self.workloads.contains_key(&full_name);
            self.remove_workload(&full_name);
            return existed;
        }

        for config in &referenced_configs {
            self.configs
                .entry(config.clone())
                .or_insert_with(ConfigNode::pending)
                .add_workload(full_name.clone());
        }

        match self.workloads.get_mut(&full_name) {
            Some(existing) => {
                let previous_refs = existing.referenced_configs().to_vec();
                let changed = existing.update_from(referenced_configs.clone(), applied_checksums);

                for old in &previous_refs {
                    if !referenced_configs.contains(old) {
                        self.detach(old, &full_name);
                    }
                }
                existing.prune_applied_checksums();
                changed
            }
            None => {
                self.workloads
                    .insert(full_name, WorkloadNode::new(referenced_configs, applied_checksums));
                true
            }
        }
    }

    /// Removes a workload entirely and unlinks it from every config it
    /// referenced, pruning configs that become unused as a result.
    pub fn remove_workload(&mut self, full_name: &FullName) {
        let Some(node) = self.workloads.remove(full_name) else {
            return;
        };
        for config in node.referenced_configs().to_vec() {
            self.detach(&config, full_name);
        }
    }

    /// Removes a config object's observed state. If it is still
    /// referenced by a workload, it reverts to pending rather than
    /// disappearing, preserving the bidirectional-consistency invariant;
    /// otherwise it is dropped entirely.
    pub fn remove_config(&mut self, full_name: &FullName) {
        let still_referenced = self
            .configs
            .get(full_name)
            .is_some_and(|node| !node.workloads().is_empty());

        if still_referenced {
            if let Some(node) = self.configs.get_mut(full_name) {
                node.clear_checksum();
            }
        } else {
            self.configs.remove(full_name);
        }
    }

    /// The workloads currently referencing `config`, used to fan a config
    /// change out to its dependents.
    #[must_use]
    pub fn affected_workloads(&self, config: &FullName) -> Vec<FullName> {
        self.configs
            .get(config)
            .map(|node| node.workloads().iter().cloned().collect())
            .unwrap_or_default()
    }

    /// The workloads a queued change to `name` should re-evaluate:
    /// `name`'s dependents if it is a tracked config, `name` itself if it
    /// is a tracked workload, or `None` if `name` is neither — an
    /// orphaned change whose subject has since been cleaned up, mirrors
    /// `affectedDeployments` returning `nil` in the source controller.
    #[must_use]
    pub fn affected_workloads_for(&self, name: &FullName) -> Option<Vec<FullName>> {
        if let Some(node) = self.configs.get(name) {
            return Some(node.workloads().iter().cloned().collect());
        }
        if self.workloads.contains_key(name) {
            return Some(vec![name.clone()]);
        }
        None
    }

    fn detach(&mut self, config: &FullName, workload: &FullName) {
        let Some(node) = self.configs.get_mut(config) else {
            return;
        };
        node.remove_workload(workload);
        if node.is_unused() {
            self.configs.remove(config);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Kind;

    fn fname(kind: Kind, name: &str) -> FullName {
        FullName::new(kind, "ns", name)
    }

    #[test]
    fn tracking_workload_creates_pending_configs() {
        let mut store = GraphStore::new();
        let workload = fname(Kind::Deployment, "api");
        let config = fname(Kind::ConfigMap, "settings");
        store.track_workload(workload.clone(), true, vec![config.clone()], BTreeMap::new());

        assert_eq!(store.configs_len(), 1);
        assert!(store.config(&config).unwrap().is_pending());
        assert_eq!(store.affected_workloads(&config), vec![workload]);
    }

    #[test]
    fn attach_before_detach_keeps_shared_config_linked() {
        let mut store = GraphStore::new();
        let workload = fname(Kind::Deployment, "api");
        let shared = fname(Kind::ConfigMap, "shared");
        let dropped = fname(Kind::ConfigMap, "dropped");

        store.track_workload(
            workload.clone(),
            true,
            vec![shared.clone(), dropped.clone()],
            BTreeMap::new(),
        );
        store.track_workload(workload.clone(), true, vec![shared.clone()], BTreeMap::new());

        assert!(store.config(&shared).is_some());
        assert!(store.config(&dropped).is_none());
        assert_eq!(store.affected_workloads(&shared), vec![workload]);
    }

    #[test]
    fn opt_out_removes_workload_entirely() {
        let mut store = GraphStore::new();
        let workload = fname(Kind::Deployment, "api");
        let config = fname(Kind::ConfigMap, "settings");
        store.track_workload(workload.clone(), true, vec![config.clone()], BTreeMap::new());
        let changed = store.track_workload(workload.clone(), false, vec![], BTreeMap::new());

        assert!(changed);
        assert!(store.workload(&workload).is_none());
        assert!(store.config(&config).is_none());
    }

    #[test]
    fn removing_config_still_referenced_reverts_to_pending() {
        let mut store = GraphStore::new();
        let workload = fname(Kind::Deployment, "api");
        let config = fname(Kind::ConfigMap, "settings");
        store.track_workload(workload, true, vec![config.clone()], BTreeMap::new());
        store.track_config(config.clone(), "abc123".to_string());

        store.remove_config(&config);

        assert!(store.config(&config).unwrap().is_pending());
    }

    #[test]
    fn removing_unreferenced_config_drops_it() {
        let mut store = GraphStore::new();
        let config = fname(Kind::ConfigMap, "orphan");
        store.track_config(config.clone(), "abc123".to_string());
        store.remove_config(&config);
        assert!(store.config(&config).is_none());
    }

    #[test]
    fn removing_workload_prunes_now_unused_configs() {
        let mut store = GraphStore::new();
        let workload = fname(Kind::Deployment, "api");
        let config = fname(Kind::ConfigMap, "settings");
        store.track_workload(workload.clone(), true, vec![config.clone()], BTreeMap::new());
        store.remove_workload(&workload);
        assert!(store.config(&config).is_none());
        assert!(store.workload(&workload).is_none());
    }
}
