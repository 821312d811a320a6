//! The per-workload update decision, grounded on
//! `original_source/src/controller/deployment.go`'s `NeedsUpdate` and
//! `config_agent.go`'s `updateDeployment`.

use std::collections::{BTreeMap, BTreeSet};

use crate::graph::GraphStore;
use crate::model::FullName;
use crate::queue::ChangeQueue;

/// The outcome of re-evaluating one workload: the applied-checksum map
/// to persist and whether a restart should be triggered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateDecision {
    /// The new applied-checksums map to write to the annotation.
    pub applied_checksums: BTreeMap<String, String>,
    /// Whether the pod template's restart-trigger annotation should be
    /// bumped.
    pub restart: bool,
}

/// `true` if `workload`'s tracked state diverges from what it has
/// recorded as applied — a drifted checksum, a pending-no-more config, or
/// a stale applied-checksum entry for a config it no longer references.
/// Mirrors `Deployment.NeedsUpdate`.
#[must_use]
pub fn needs_update(store: &GraphStore, workload: &FullName) -> bool {
    let Some(node) = store.workload(workload) else {
        return false;
    };

    for config_name in node.referenced_configs() {
        let Some(config) = store.config(config_name) else {
            continue;
        };
        if config.is_pending() {
            continue;
        }
        if config.checksum() != node.applied_checksums().get(&config_name.to_string()).map(String::as_str) {
            return true;
        }
    }

    let referenced: BTreeSet<String> = node
        .referenced_configs()
        .iter()
        .map(std::string::ToString::to_string)
        .collect();
    node.applied_checksums()
        .keys()
        .any(|key| !referenced.contains(key))
}

/// Computes the new applied-checksums map and restart decision for
/// `workload`, without mutating the store. Mirrors `updateDeployment`'s
/// per-config loop:
///
/// - a config still pending, or already matching its applied checksum,
///   needs no action;
/// - a config with a prior applied entry that now mismatches is a
///   genuine drift — always restarts;
/// - a config with *no* prior applied entry is a newly-seen reference:
///   normally its current checksum is just the one already baked into
///   the workload's spec (no restart needed), *unless* the change queue
///   shows it was observed more than once — meaning it was added and
///   then mutated before the controller reacted, a race that would
///   otherwise be missed (see SPEC_FULL.md §4.5 and the source's
///   `updateDeployment` comment).
///
/// Stale applied-checksum entries for configs no longer referenced are
/// purged from the result.
#[must_use]
pub fn decide_workload_update(
    store: &GraphStore,
    queue: &ChangeQueue,
    workload: &FullName,
) -> Option<UpdateDecision> {
    let node = store.workload(workload)?;
    let mut applied = node.applied_checksums().clone();
    let mut restart = false;

    for config_name in node.referenced_configs() {
        let Some(config) = store.config(config_name) else {
            continue;
        };
        if config.is_pending() {
            continue;
        }
        let checksum = config.checksum().unwrap_or_default().to_string();
        let key = config_name.to_string();

        if applied.get(&key) == Some(&checksum) {
            continue;
        }

        if applied.contains_key(&key) {
            restart = true;
        } else if queue.observations_of(config_name).is_some_and(|count| count > 1) {
            restart = true;
        }

        applied.insert(key, checksum);
    }

    let referenced: BTreeSet<String> = node
        .referenced_configs()
        .iter()
        .map(std::string::ToString::to_string)
        .collect();
    applied.retain(|key, _| referenced.contains(key));

    Some(UpdateDecision { applied_checksums: applied, restart })
}
