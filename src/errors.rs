//! Error types shared across the application.

use std::fmt::{Display, Formatter};

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering all domain failure modes.
#[derive(Debug)]
pub enum AppError {
    /// CLI argument or environment variable parsing/validation failure.
    Config(String),
    /// A resource adapter received an object shape it cannot interpret.
    Adapter(String),
    /// The patch client failed to apply a merge-patch to a workload.
    Patch(String),
    /// The metrics HTTP endpoint failed to bind or serve.
    Metrics(String),
    /// The reconciler loop observed an unrecoverable internal fault.
    Reconciler(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Adapter(msg) => write!(f, "adapter: {msg}"),
            Self::Patch(msg) => write!(f, "patch: {msg}"),
            Self::Metrics(msg) => write!(f, "metrics: {msg}"),
            Self::Reconciler(msg) => write!(f, "reconciler: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        Self::Patch(err.to_string())
    }
}

impl From<prometheus::Error> for AppError {
    fn from(err: prometheus::Error) -> Self {
        Self::Metrics(err.to_string())
    }
}
