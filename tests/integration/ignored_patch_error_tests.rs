//! SPEC_FULL.md §8 scenario 6: a patch error that matches a configured
//! ignore-list substring is absorbed, not fatal — the controller keeps
//! running and a later observed drift still produces a retry.

use std::collections::BTreeMap;
use std::time::Duration;

use super::test_helpers::{config_name, config_updated, spawn_harness, wait_for_a_tick, workload_updated};

const GRACE: Duration = Duration::from_secs(5);

#[tokio::test]
async fn ignored_patch_error_is_absorbed_and_a_later_drift_still_retries() {
    let harness = spawn_harness(GRACE, vec!["ignore-me".to_string()]);
    let config = config_name("settings");

    let mut applied = BTreeMap::new();
    applied.insert(config.to_string(), "old".to_string());
    harness
        .handle
        .send(workload_updated("api", "v1", true, vec![config.clone()], applied))
        .await;
    harness.handle.send(config_updated("settings", "v1", "new")).await;

    harness.patches.fail_with("ignore-me: admission webhook temporarily unavailable");
    harness.clock.advance(GRACE);
    wait_for_a_tick().await;

    assert_eq!(harness.patches.call_count(), 1, "the ignored error must still have been attempted");

    harness.patches.stop_failing();
    harness.handle.send(config_updated("settings", "v2", "newer")).await;
    harness.clock.advance(GRACE);
    wait_for_a_tick().await;

    assert_eq!(harness.patches.call_count(), 2, "a later drift must still be retried after an ignored failure");
    harness.handle.stop().await;
}
