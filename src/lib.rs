#![forbid(unsafe_code)]

//! `deployment-restart-controller` — cluster-side reconciler that restarts
//! workloads when a referenced config object changes.
//!
//! The reconciler is a single-writer engine: one task owns the in-memory
//! graph, the debounced change queue, and the applied-checksum bookkeeping.
//! Everything else — resource adapters, the patch client, the metrics
//! endpoint — is a narrow boundary the reconciler task talks to over
//! channels or a small trait.

pub mod adapters;
pub mod clock;
pub mod errors;
pub mod graph;
pub mod metrics;
pub mod model;
pub mod patch;
pub mod queue;
pub mod reconciler;
pub mod replay;
pub mod watcher;

pub use errors::{AppError, Result};
