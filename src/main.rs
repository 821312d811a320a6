#![forbid(unsafe_code)]

//! `deployment-restart-controller` — cluster-side reconciler binary.
//!
//! Parses CLI/env tunables, initializes structured logging, wires the
//! reconciler to an HTTP patch client and a Prometheus metrics endpoint,
//! optionally drives the reconciler from a recorded `--replay` event feed,
//! and runs until a shutdown signal arrives, flushing any
//! memory-sensitive pending changes before exit.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use deployment_restart_controller::clock::SystemClock;
use deployment_restart_controller::metrics::{self, Metrics};
use deployment_restart_controller::patch::HttpPatchClient;
use deployment_restart_controller::reconciler::{self, ReconcilerConfig};
use deployment_restart_controller::replay;
use deployment_restart_controller::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

/// CLI/env surface, mirrored 1:1 from
/// `original_source/kubernetes-deployment-restart-controller.go`'s
/// `go-flags` options struct (short flags, `env` tags, `;`-delimited
/// `IGNORED_ERRORS`).
#[derive(Debug, Parser)]
#[command(
    name = "deployment-restart-controller",
    about = "Restarts workloads when a referenced config changes",
    version
)]
struct Cli {
    /// Time interval to check for pending restarts, in milliseconds.
    #[arg(short = 'c', long = "restart-check-period", env = "RESTART_CHECK_PERIOD", default_value_t = 500)]
    restart_check_period_ms: u64,

    /// Time interval to compact (debounce) restarts, in seconds.
    #[arg(short = 'r', long = "restart-grace-period", env = "RESTART_GRACE_PERIOD", default_value_t = 5)]
    restart_grace_period_secs: u64,

    /// Substrings of patch errors that should be logged and absorbed
    /// instead of stopping the controller. Repeatable on the CLI;
    /// `;`-delimited in the environment variable.
    #[arg(long = "ignored-errors", env = "IGNORED_ERRORS", value_delimiter = ';')]
    ignored_errors: Vec<String>,

    /// Verbosity level: 0 = info, 1 = debug, 2+ = trace. Ignored if
    /// `RUST_LOG` is set.
    #[arg(short = 'v', long = "verbose", env = "VERBOSE", default_value_t = 0)]
    verbose: u8,

    /// Log output format.
    #[arg(long = "log-format", value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Base URL the HTTP patch client issues `PATCH` requests against.
    #[arg(long = "patch-base-url", env = "PATCH_BASE_URL", default_value = "http://localhost:8080/apis")]
    patch_base_url: String,

    /// Address the Prometheus metrics endpoint binds to.
    #[arg(long = "metrics-addr", env = "METRICS_ADDR", default_value = "0.0.0.0:10254")]
    metrics_addr: SocketAddr,

    /// Debug mode: load a recorded JSON event feed instead of connecting
    /// to a live watcher (which is out of scope for this crate) and feed
    /// it into the reconciler's inbox at startup.
    #[arg(long = "replay")]
    replay: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format, args.verbose)?;
    info!("deployment-restart-controller bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    let check_period = Duration::from_millis(args.restart_check_period_ms);
    let grace_period = Duration::from_secs(args.restart_grace_period_secs);

    let metrics = Arc::new(Metrics::new()?);
    let patch_client = Arc::new(HttpPatchClient::new(args.patch_base_url));
    let clock = Arc::new(SystemClock);

    let (handle, fatal_rx) = reconciler::spawn(
        patch_client,
        Arc::clone(&metrics),
        clock,
        ReconcilerConfig {
            check_period,
            grace_period,
            ignored_errors: args.ignored_errors,
        },
    );

    if let Some(path) = args.replay {
        info!(path = %path.display(), "loading replay event feed");
        let events = replay::load_events(&path)?;
        info!(count = events.len(), "replaying events into reconciler inbox");
        for event in events {
            handle.send(event).await;
        }
    }

    let metrics_cancel = CancellationToken::new();
    let metrics_join = tokio::spawn(metrics::serve(metrics, args.metrics_addr, metrics_cancel.clone()));

    info!("controller ready");

    let fatal = tokio::select! {
        () = shutdown_signal() => {
            info!("shutdown signal received, starting graceful stop");
            None
        }
        result = fatal_rx => {
            result.ok()
        }
    };

    if let Some(err) = &fatal {
        error!(%err, "reconciler stopped itself after an unrecoverable patch error");
    }

    // Spawn a background listener for a second shutdown signal (force-exit).
    tokio::spawn(async {
        shutdown_signal().await;
        error!("second shutdown signal received, forcing exit");
        std::process::exit(1);
    });

    handle.stop().await;
    metrics_cancel.cancel();
    if let Ok(Err(err)) = metrics_join.await {
        error!(%err, "metrics server did not shut down cleanly");
    }

    if fatal.is_some() {
        std::process::exit(1);
    }

    info!("deployment-restart-controller stopped cleanly");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat, verbose: u8) -> Result<()> {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
