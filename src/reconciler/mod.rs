//! The single-writer reconciliation loop: owns the graph store and
//! change queue, consumes watch events and periodic ticks, and emits
//! patches. Grounded on
//! `original_source/src/controller/config_agent.go`'s `updateLoop`.
#![allow(clippy::cast_precision_loss)]

mod decision;
mod patch_builder;

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::clock::Clock;
use crate::errors::AppError;
use crate::graph::GraphStore;
use crate::metrics::Metrics;
use crate::model::{Change, FullName};
use crate::patch::{self, PatchClient};
use crate::queue::{predicate, ChangeQueue};
use crate::watcher::{MetaResource, WatchEvent};

/// Tunables the reconciler needs at spawn time, mapped 1:1 from the CLI
/// surface in SPEC_FULL.md §4.7.
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// How often the periodic `Tick` event fires.
    pub check_period: Duration,
    /// How old a change must be before it is eligible for the normal
    /// (non-shutdown) drain.
    pub grace_period: Duration,
    /// Substrings matched against a patch error's `Display` output to
    /// decide whether it should be absorbed rather than treated as
    /// fatal.
    pub ignored_errors: Vec<String>,
}

/// A live handle to a spawned reconciler task.
pub struct ReconcilerHandle {
    watch_tx: mpsc::Sender<WatchEvent>,
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl ReconcilerHandle {
    /// Feeds a single watch event into the reconciler's inbox. Silently
    /// drops the event if the reconciler has already stopped.
    pub async fn send(&self, event: WatchEvent) {
        if self.watch_tx.send(event).await.is_err() {
            warn!("reconciler inbox closed, dropping event");
        }
    }

    /// Requests a graceful stop (triggering the final memory-sensitive
    /// drain) and waits for the reconciler task to exit.
    pub async fn stop(self) {
        self.cancel.cancel();
        let _ = self.join.await;
    }
}

/// Spawns the reconciler as a background task.
///
/// Returns the handle plus a oneshot receiver that resolves with the
/// triggering error if the reconciler had to stop itself because of an
/// unrecoverable patch failure — see SPEC_FULL.md §4.5's fatal-patch
/// escalation. The receiver is dropped without a value on a clean stop.
pub fn spawn(
    patch_client: Arc<dyn PatchClient>,
    metrics: Arc<Metrics>,
    clock: Arc<dyn Clock>,
    config: ReconcilerConfig,
) -> (ReconcilerHandle, oneshot::Receiver<AppError>) {
    let (watch_tx, watch_rx) = mpsc::channel(1024);
    let cancel = CancellationToken::new();
    let (fatal_tx, fatal_rx) = oneshot::channel();

    let task_cancel = cancel.clone();
    let join = tokio::spawn(async move {
        let mut reconciler = Reconciler {
            store: GraphStore::new(),
            queue: ChangeQueue::new(),
            versions: HashMap::new(),
            patch_client,
            metrics,
            clock,
            check_period: config.check_period,
            grace_period: config.grace_period,
            ignored_errors: config.ignored_errors,
        };
        reconciler.run(watch_rx, task_cancel, fatal_tx).await;
    });

    (ReconcilerHandle { watch_tx, cancel, join }, fatal_rx)
}

struct Reconciler {
    store: GraphStore,
    queue: ChangeQueue,
    /// Last-observed version token per resource, used to drop idempotent
    /// re-deliveries from the watcher before they touch the graph or the
    /// change queue.
    versions: HashMap<FullName, String>,
    patch_client: Arc<dyn PatchClient>,
    metrics: Arc<Metrics>,
    clock: Arc<dyn Clock>,
    check_period: Duration,
    grace_period: Duration,
    ignored_errors: Vec<String>,
}

impl Reconciler {
    async fn run(
        &mut self,
        mut watch_rx: mpsc::Receiver<WatchEvent>,
        cancel: CancellationToken,
        fatal_tx: oneshot::Sender<AppError>,
    ) {
        let mut ticker = tokio::time::interval(self.check_period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        let mut fatal = loop {
            tokio::select! {
                event = watch_rx.recv() => {
                    match event {
                        Some(event) => self.handle_event(event),
                        None => warn!("reconciler inbox closed (all senders dropped)"),
                    }
                }
                _ = ticker.tick() => {
                    let now = self.clock.now();
                    let grace_period = self.grace_period;
                    let result = self.process_changes(predicate::aged(now, grace_period)).await;
                    self.metrics.changes_waiting_total.set(self.queue.len() as f64);
                    if result.is_some() {
                        break result;
                    }
                }
                () = cancel.cancelled() => {
                    break None;
                }
            }
        };

        info!("reconciler stopping, running final drain");
        if let Some(err) = self.process_changes(predicate::memory_sensitive()).await {
            fatal = Some(err);
        }

        if let Some(err) = fatal {
            let _ = fatal_tx.send(err);
        }
    }

    fn handle_event(&mut self, event: WatchEvent) {
        match event {
            WatchEvent::Updated(resource) => {
                let name = resource.full_name().clone();
                if self.versions.get(&name).map(String::as_str) == Some(resource.version()) {
                    return;
                }
                self.versions.insert(name, resource.version().to_string());
                self.dispatch_update(resource);
                self.metrics.resource_versions_total.inc();
            }
            WatchEvent::Deleted(resource) => {
                let name = resource.full_name().clone();
                self.versions.remove(&name);
                self.dispatch_delete(&resource);
            }
        }

        self.metrics.configs_total.set(self.store.configs_len() as f64);
        self.metrics.deployments_total.set(self.store.workloads_len() as f64);
    }

    fn dispatch_update(&mut self, resource: MetaResource) {
        match resource {
            MetaResource::Config(meta) => {
                let name = meta.full_name().clone();
                let changed = self.store.track_config(name.clone(), meta.checksum().to_string());
                if changed {
                    self.queue.observe(name, self.clock.now());
                }
            }
            MetaResource::Deployment(meta) => {
                let name = meta.full_name().clone();
                if meta.enabled() {
                    let changed = self.store.track_workload(
                        name.clone(),
                        true,
                        meta.referenced_configs().to_vec(),
                        meta.applied_checksums().clone(),
                    );
                    if changed {
                        self.queue.observe(name, self.clock.now());
                    }
                } else {
                    self.store.remove_workload(&name);
                    self.queue.remove(&name);
                }
            }
        }
    }

    fn dispatch_delete(&mut self, resource: &MetaResource) {
        let name = resource.full_name().clone();
        match resource {
            MetaResource::Config(_) => self.store.remove_config(&name),
            MetaResource::Deployment(_) => self.store.remove_workload(&name),
        }
        self.queue.remove(&name);
    }

    /// Drains every queued change matching `predicate`, re-evaluates the
    /// workloads they affect, and issues patches for those that drifted.
    /// Returns the triggering error if a non-ignored patch failure
    /// occurred — the caller is responsible for stopping the reconciler
    /// in that case, but (mirroring the source controller) this method
    /// still finishes deciding every workload in the current round
    /// before reporting it.
    async fn process_changes(&mut self, predicate: impl Fn(&Change) -> bool) -> Option<AppError> {
        let applicable = self.queue.applicable(predicate);
        if applicable.is_empty() {
            return None;
        }

        let mut to_update: BTreeSet<FullName> = BTreeSet::new();
        for name in &applicable {
            match self.store.affected_workloads_for(name) {
                Some(workloads) => {
                    for workload in workloads {
                        if decision::needs_update(&self.store, &workload) {
                            to_update.insert(workload);
                        }
                    }
                }
                None => warn!(resource = %name, "orphaned resource change ignored"),
            }
        }

        let mut fatal = None;
        for workload in &to_update {
            if let Some(decision) = decision::decide_workload_update(&self.store, &self.queue, workload) {
                let patch = patch_builder::build(&decision.applied_checksums, decision.restart, self.clock.as_ref());
                match patch::apply(self.patch_client.as_ref(), workload, patch).await {
                    Ok(()) => {
                        if let Some(node) = self.store.workload_mut(workload) {
                            node.set_applied_checksums(decision.applied_checksums.clone());
                        }
                        self.metrics.deployment_annotation_updates_total.inc();
                        if decision.restart {
                            self.metrics.deployment_restarts_total.inc();
                        }
                    }
                    Err(err) => {
                        if self.is_ignored(&err) {
                            warn!(workload = %workload, %err, "patch error ignored per configuration");
                        } else {
                            error!(workload = %workload, %err, "unrecoverable patch error, stopping reconciler");
                            fatal = Some(err);
                        }
                    }
                }
            }
            self.queue.remove(workload);
        }

        self.metrics.changes_processed_total.inc_by(applicable.len() as f64);
        for name in &applicable {
            self.queue.remove(name);
        }

        fatal
    }

    fn is_ignored(&self, err: &AppError) -> bool {
        let text = err.to_string();
        self.ignored_errors.iter().any(|pattern| text.contains(pattern.as_str()))
    }
}
