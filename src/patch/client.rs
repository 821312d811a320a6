//! The patch boundary: applying a JSON merge-patch to a named workload.

use async_trait::async_trait;

use crate::model::{FullName, Kind};
use crate::AppError;

/// Applies a merge-patch to a workload by identity. Errors are opaque to
/// the reconciler; classification into "ignored" vs. "fatal" happens at
/// the reconciler boundary, not here — see SPEC_FULL.md §4.5.
#[async_trait]
pub trait PatchClient: Send + Sync {
    /// Applies `patch` (a JSON merge-patch, RFC 7396) to the workload
    /// identified by `kind`/`namespace`/`name`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Patch` if the underlying transport or the
    /// target platform rejects the patch.
    async fn patch_workload(
        &self,
        kind: Kind,
        namespace: &str,
        name: &str,
        patch: serde_json::Value,
    ) -> Result<(), AppError>;
}

/// Convenience wrapper so callers can pass a [`FullName`] directly.
pub async fn apply(
    client: &dyn PatchClient,
    workload: &FullName,
    patch: serde_json::Value,
) -> Result<(), AppError> {
    client
        .patch_workload(workload.kind(), workload.namespace(), workload.name(), patch)
        .await
}
