//! SPEC_FULL.md §8 scenario 2: a workload that references a config for
//! the first time, with no prior applied checksum, must record the
//! current checksum without restarting.

use std::collections::BTreeMap;
use std::time::Duration;

use super::test_helpers::{config_name, config_updated, spawn_harness, wait_for_a_tick, workload_updated};

const GRACE: Duration = Duration::from_secs(5);

#[tokio::test]
async fn freshly_referenced_config_updates_checksum_without_restarting() {
    let harness = spawn_harness(GRACE, vec![]);
    let config = config_name("settings");

    harness.handle.send(config_updated("settings", "v1", "abc")).await;
    harness
        .handle
        .send(workload_updated("api", "v1", true, vec![config.clone()], BTreeMap::new()))
        .await;

    harness.clock.advance(GRACE);
    wait_for_a_tick().await;

    let calls = harness.patches.patches();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].patch.get("spec").is_none(), "a first-sight reference must not restart");
    assert_eq!(
        calls[0].patch["metadata"]["annotations"]
            ["com.xing.deployment-restart.applied-config-checksums"]
            .as_str()
            .expect("annotation value is a JSON string"),
        serde_json::to_string(&BTreeMap::from([(config.to_string(), "abc".to_string())])).expect("serializable"),
    );

    harness.handle.stop().await;
}
