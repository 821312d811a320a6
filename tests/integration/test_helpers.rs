//! Shared test helpers for the end-to-end reconciler scenarios in
//! SPEC_FULL.md §8: spawning a real [`Reconciler`] task (not a white-box
//! construction) against a [`RecordingPatchClient`] and a [`TestClock`],
//! so these tests exercise the same `tokio::select!` loop the binary
//! runs instead of calling its private methods directly.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};

use deployment_restart_controller::clock::TestClock;
use deployment_restart_controller::metrics::Metrics;
use deployment_restart_controller::model::{FullName, Kind, MetaConfig, MetaDeployment};
use deployment_restart_controller::patch::RecordingPatchClient;
use deployment_restart_controller::reconciler::{self, ReconcilerConfig, ReconcilerHandle};
use deployment_restart_controller::watcher::{MetaResource, WatchEvent};

/// A spawned reconciler plus its test doubles, ready to receive events.
pub struct Harness {
    pub handle: ReconcilerHandle,
    pub patches: Arc<RecordingPatchClient>,
    pub clock: Arc<TestClock>,
}

/// Spawns a reconciler with a fast tick period so integration tests don't
/// need to wait long in real time, `grace_period` and `ignored_errors`
/// left to the caller.
pub fn spawn_harness(grace_period: Duration, ignored_errors: Vec<String>) -> Harness {
    let patches = Arc::new(RecordingPatchClient::new());
    let clock = Arc::new(TestClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
    let (handle, _fatal_rx) = reconciler::spawn(
        patches.clone(),
        Arc::new(Metrics::new().expect("well-formed static metric definitions")),
        clock.clone(),
        ReconcilerConfig {
            check_period: Duration::from_millis(5),
            grace_period,
            ignored_errors,
        },
    );
    Harness { handle, patches, clock }
}

/// Sleeps long enough in real wall-clock time for at least one tick of a
/// reconciler spawned with [`spawn_harness`]'s 5ms check period to fire.
pub async fn wait_for_a_tick() {
    tokio::time::sleep(Duration::from_millis(40)).await;
}

pub fn config_name(name: &str) -> FullName {
    FullName::new(Kind::ConfigMap, "ns", name)
}

pub fn workload_name(name: &str) -> FullName {
    FullName::new(Kind::Deployment, "ns", name)
}

pub fn config_updated(name: &str, version: &str, checksum: &str) -> WatchEvent {
    WatchEvent::Updated(MetaResource::Config(MetaConfig::new(
        config_name(name),
        version.to_string(),
        checksum.to_string(),
    )))
}

pub fn workload_updated(
    name: &str,
    version: &str,
    enabled: bool,
    referenced: Vec<FullName>,
    applied: BTreeMap<String, String>,
) -> WatchEvent {
    WatchEvent::Updated(MetaResource::Deployment(MetaDeployment::new(
        workload_name(name),
        version.to_string(),
        enabled,
        referenced,
        applied,
    )))
}
