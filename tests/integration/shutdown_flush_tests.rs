//! SPEC_FULL.md §8 scenario 4: stopping the reconciler before a change
//! has aged must still flush it if it was observed more than once —
//! otherwise the next process would see no drift and skip the restart
//! forever.

use std::collections::BTreeMap;
use std::time::Duration;

use super::test_helpers::{config_name, config_updated, spawn_harness, workload_updated};

/// A grace period long enough that it could never age out during this
/// test — the flush has to come from the shutdown drain, not the tick.
const LONG_GRACE: Duration = Duration::from_secs(3600);

#[tokio::test]
async fn stopping_before_grace_period_still_flushes_churn_observed_twice() {
    let harness = spawn_harness(LONG_GRACE, vec![]);
    let config = config_name("settings");

    let mut applied = BTreeMap::new();
    applied.insert(config.to_string(), "old".to_string());
    harness
        .handle
        .send(workload_updated("api", "v1", true, vec![config.clone()], applied))
        .await;
    harness.handle.send(config_updated("settings", "v1", "mid")).await;
    harness.handle.send(config_updated("settings", "v2", "new")).await;

    // Give the inbox a moment to drain before issuing a stop; no grace
    // period advance, since the shutdown drain must not need one.
    tokio::time::sleep(Duration::from_millis(20)).await;
    harness.handle.stop().await;

    let calls = harness.patches.patches();
    assert_eq!(calls.len(), 1, "shutdown must flush exactly the one re-observed change");
    assert!(calls[0].patch.get("spec").is_some());
    assert_eq!(
        calls[0].patch["metadata"]["annotations"]
            ["com.xing.deployment-restart.applied-config-checksums"]
            .as_str()
            .expect("annotation value is a JSON string"),
        serde_json::to_string(&BTreeMap::from([(config.to_string(), "new".to_string())])).expect("serializable"),
    );
}
