//! SPEC_FULL.md §8 scenario 1: a workload with a prior applied checksum
//! whose referenced config drifts must restart once the change ages past
//! the grace period.

use std::collections::BTreeMap;
use std::time::Duration;

use super::test_helpers::{config_name, config_updated, spawn_harness, wait_for_a_tick, workload_name, workload_updated};

const GRACE: Duration = Duration::from_secs(5);

#[tokio::test]
async fn fresh_drift_triggers_exactly_one_restart_patch() {
    let harness = spawn_harness(GRACE, vec![]);
    let config = config_name("settings");
    let workload = workload_name("api");

    let mut applied = BTreeMap::new();
    applied.insert(config.to_string(), "old".to_string());
    harness
        .handle
        .send(workload_updated("api", "v1", true, vec![config.clone()], applied))
        .await;
    harness.handle.send(config_updated("settings", "v1", "new")).await;

    harness.clock.advance(GRACE);
    wait_for_a_tick().await;

    let calls = harness.patches.patches();
    assert_eq!(calls.len(), 1, "exactly one patch should have been issued");
    assert_eq!(calls[0].workload, workload);
    assert!(calls[0].patch.get("spec").is_some(), "a checksum overwrite must restart the pod template");
    assert_eq!(
        calls[0].patch["metadata"]["annotations"]
            ["com.xing.deployment-restart.applied-config-checksums"]
            .as_str()
            .expect("annotation value is a JSON string"),
        serde_json::to_string(&BTreeMap::from([(config.to_string(), "new".to_string())])).expect("serializable"),
    );

    harness.handle.stop().await;
}
