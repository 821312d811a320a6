//! Prometheus metrics and the HTTP endpoint that serves them, grounded on
//! `original_source/src/controller/metrics.go` (seven series under the
//! `deployment_restart_controller` namespace, pre-registered at zero) and
//! `src/mcp/sse.rs`'s `axum::serve(...).with_graceful_shutdown(...)`
//! pattern for the server itself.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::{Router, http::StatusCode, response::IntoResponse};
use prometheus::{Counter, Encoder, Gauge, Registry, TextEncoder};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::AppError;

const NAMESPACE: &str = "deployment_restart_controller";

/// The controller's full metric set. Cheap to clone (internally
/// `Arc`-backed by `prometheus`'s own types); one instance is built at
/// startup and shared between the reconciler and the metrics server.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    /// Count of distinct resource versions observed, ever.
    pub resource_versions_total: Counter,
    /// Currently tracked config count.
    pub configs_total: Gauge,
    /// Currently tracked workload count.
    pub deployments_total: Gauge,
    /// Changes currently sitting in the debounce queue.
    pub changes_waiting_total: Gauge,
    /// Count of applied-checksum annotation patches issued.
    pub deployment_annotation_updates_total: Counter,
    /// Count of restart-trigger patches issued.
    pub deployment_restarts_total: Counter,
    /// Count of drained changes processed, successfully or not.
    pub changes_processed_total: Counter,
}

impl Metrics {
    /// Builds and registers every series, pre-initialized to zero so they
    /// appear in the very first scrape.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Metrics` if a series name/help string is
    /// malformed or a collector is registered twice against the same
    /// registry — both only ever a programming error, never runtime
    /// input, but propagated rather than unwrapped.
    pub fn new() -> Result<Self, AppError> {
        let registry = Registry::new();

        let resource_versions_total = Counter::new(
            format!("{NAMESPACE}_resource_versions_total"),
            "Total number of distinct resource versions observed",
        )?;
        let configs_total = Gauge::new(
            format!("{NAMESPACE}_configs_total"),
            "Number of configs currently tracked",
        )?;
        let deployments_total = Gauge::new(
            format!("{NAMESPACE}_deployments_total"),
            "Number of workloads currently tracked",
        )?;
        let changes_waiting_total = Gauge::new(
            format!("{NAMESPACE}_changes_waiting_total"),
            "Number of changes currently queued for debounce",
        )?;
        let deployment_annotation_updates_total = Counter::new(
            format!("{NAMESPACE}_deployment_annotation_updates_total"),
            "Total number of applied-checksum annotation patches issued",
        )?;
        let deployment_restarts_total = Counter::new(
            format!("{NAMESPACE}_deployment_restarts_total"),
            "Total number of restart-trigger patches issued",
        )?;
        let changes_processed_total = Counter::new(
            format!("{NAMESPACE}_changes_processed_total"),
            "Total number of drained changes processed",
        )?;

        for collector in [
            Box::new(resource_versions_total.clone()) as Box<dyn prometheus::core::Collector>,
            Box::new(configs_total.clone()),
            Box::new(deployments_total.clone()),
            Box::new(changes_waiting_total.clone()),
            Box::new(deployment_annotation_updates_total.clone()),
            Box::new(deployment_restarts_total.clone()),
            Box::new(changes_processed_total.clone()),
        ] {
            registry.register(collector)?;
        }

        Ok(Self {
            registry,
            resource_versions_total,
            configs_total,
            deployments_total,
            changes_waiting_total,
            deployment_annotation_updates_total,
            deployment_restarts_total,
            changes_processed_total,
        })
    }
}

async fn render(registry: Registry) -> impl IntoResponse {
    let families = registry.gather();
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&families, &mut buffer) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("failed to encode metrics: {err}"),
        )
            .into_response();
    }
    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, encoder.format_type().to_string())],
        buffer,
    )
        .into_response()
}

/// Serves `GET /metrics` on `addr` until `cancel` fires, then shuts down
/// gracefully.
///
/// # Errors
///
/// Returns `AppError::Metrics` if the listener cannot bind `addr`.
pub async fn serve(metrics: Arc<Metrics>, addr: SocketAddr, cancel: CancellationToken) -> Result<(), AppError> {
    let registry = metrics.registry.clone();
    let router = Router::new().route("/metrics", get(move || render(registry.clone())));

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|err| AppError::Metrics(format!("failed to bind {addr}: {err}")))?;

    info!(%addr, "metrics endpoint listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|err| AppError::Metrics(format!("metrics server failed: {err}")))
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn new_registers_all_seven_series_at_zero() {
        let metrics = Metrics::new().expect("well-formed static metric definitions");
        assert!((metrics.configs_total.get() - 0.0).abs() < f64::EPSILON);
        assert!((metrics.resource_versions_total.get() - 0.0).abs() < f64::EPSILON);
        let families = metrics.registry.gather();
        assert_eq!(families.len(), 7);
    }
}
