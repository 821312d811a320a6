//! The resource-watcher boundary: the real cluster watch stream is out of
//! scope (SPEC_FULL.md §6), so this module only defines the trait a real
//! integration would implement plus an in-process replay watcher for
//! tests and the `--replay` debug mode.

use tokio::sync::mpsc;

use crate::model::{FullName, MetaConfig, MetaDeployment};

/// A resource observed by the watcher, already flattened by an adapter.
///
/// Grounded on `original_source/src/controller/interfaces/meta_classes.go`'s
/// `MetaResource` interface: a tagged variant over the two shapes instead
/// of deep inheritance (SPEC_FULL.md §9).
#[derive(Debug, Clone)]
pub enum MetaResource {
    /// A config object (`ConfigMap`/`Secret`).
    Config(MetaConfig),
    /// A workload object (`Deployment`/`StatefulSet`).
    Deployment(MetaDeployment),
}

impl MetaResource {
    /// The resource's identity, regardless of shape.
    #[must_use]
    pub fn full_name(&self) -> &FullName {
        match self {
            Self::Config(meta) => meta.full_name(),
            Self::Deployment(meta) => meta.full_name(),
        }
    }

    /// The resource's opaque version token, regardless of shape.
    #[must_use]
    pub fn version(&self) -> &str {
        match self {
            Self::Config(meta) => meta.version(),
            Self::Deployment(meta) => meta.version(),
        }
    }
}

/// A single watch notification.
#[derive(Debug, Clone)]
pub enum WatchEvent {
    /// The resource was created or updated.
    Updated(MetaResource),
    /// The resource was deleted.
    Deleted(MetaResource),
}

/// Streams [`WatchEvent`]s into the reconciler's inbox. A real platform
/// integration drives this from a cluster API watch connection; this
/// crate ships only [`FeedWatcher`], a replay implementation.
pub trait ResourceWatcher {
    /// Consumes the watcher, returning the receiving half of its event
    /// stream.
    fn events(self) -> mpsc::Receiver<WatchEvent>;
}

/// Replays a fixed, in-process list of events — used by integration
/// tests and by a `--replay <file>` debug mode that deserializes a
/// recorded event feed instead of connecting to a live cluster.
pub struct FeedWatcher {
    events: Vec<WatchEvent>,
}

impl FeedWatcher {
    /// Builds a watcher that replays `events` in order, then closes.
    #[must_use]
    pub fn new(events: Vec<WatchEvent>) -> Self {
        Self { events }
    }
}

impl ResourceWatcher for FeedWatcher {
    fn events(self) -> mpsc::Receiver<WatchEvent> {
        let (tx, rx) = mpsc::channel(self.events.len().max(1));
        tokio::spawn(async move {
            for event in self.events {
                if tx.send(event).await.is_err() {
                    break;
                }
            }
        });
        rx
    }
}
