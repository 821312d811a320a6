//! SPEC_FULL.md §8 scenario 3: a config referenced for the first time
//! but mutated twice before the first drain must still restart, even
//! though it has no prior applied-checksum entry — the change queue's
//! `observations > 1` is the signal that a first-sight reference missed
//! a subsequent content change.

use std::collections::BTreeMap;
use std::time::Duration;

use super::test_helpers::{config_name, config_updated, spawn_harness, wait_for_a_tick, workload_updated};

const GRACE: Duration = Duration::from_secs(5);

#[tokio::test]
async fn config_mutated_twice_before_drain_restarts_even_without_prior_applied_entry() {
    let harness = spawn_harness(GRACE, vec![]);
    let config = config_name("settings");

    harness
        .handle
        .send(workload_updated("api", "v1", true, vec![config.clone()], BTreeMap::new()))
        .await;
    harness.handle.send(config_updated("settings", "v1", "v1sum")).await;
    harness.handle.send(config_updated("settings", "v2", "v2sum")).await;

    harness.clock.advance(GRACE);
    wait_for_a_tick().await;

    let calls = harness.patches.patches();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].patch.get("spec").is_some(), "a race before the first drain must still restart");
    assert_eq!(
        calls[0].patch["metadata"]["annotations"]
            ["com.xing.deployment-restart.applied-config-checksums"]
            .as_str()
            .expect("annotation value is a JSON string"),
        serde_json::to_string(&BTreeMap::from([(config.to_string(), "v2sum".to_string())])).expect("serializable"),
    );

    harness.handle.stop().await;
}
