//! SPEC_FULL.md §8 scenario 5: removing a workload's opt-in annotation
//! is an immediate graph deletion, never a patch — the workload and any
//! config it alone referenced disappear from the store without ever
//! reaching the patch pipeline.

use std::collections::BTreeMap;
use std::time::Duration;

use super::test_helpers::{config_name, spawn_harness, workload_updated};

const GRACE: Duration = Duration::from_secs(5);

#[tokio::test]
async fn opting_out_deletes_the_workload_without_issuing_a_patch() {
    let harness = spawn_harness(GRACE, vec![]);
    let config = config_name("settings");

    harness
        .handle
        .send(workload_updated("api", "v1", true, vec![config.clone()], BTreeMap::new()))
        .await;
    harness
        .handle
        .send(workload_updated("api", "v2", false, vec![], BTreeMap::new()))
        .await;

    harness.clock.advance(GRACE);
    tokio::time::sleep(Duration::from_millis(40)).await;
    harness.handle.stop().await;

    assert_eq!(harness.patches.call_count(), 0, "opting out must never go through the patch pipeline");
}
