//! An in-memory `PatchClient` double that records every call instead of
//! issuing it, grounded on
//! `original_source/src/controller/test/dummy_k8s_client.go`'s
//! `DummyK8sClient`. Used by the reconciler's own tests and by the
//! crate's integration tests to assert on §8's testable properties and
//! end-to-end scenarios without a live cluster.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::model::{FullName, Kind};
use crate::AppError;

use super::client::PatchClient;

/// A single recorded `PatchWorkload` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPatch {
    /// The workload the patch targeted.
    pub workload: FullName,
    /// The merge-patch body that was submitted.
    pub patch: Value,
}

/// Records every patch call in order; optionally scripted to fail every
/// call with a fixed error message (mirroring `DummyK8sClient.Error`).
#[derive(Debug, Default)]
pub struct RecordingPatchClient {
    patches: Mutex<Vec<RecordedPatch>>,
    fail_with: Mutex<Option<String>>,
}

impl RecordingPatchClient {
    /// Creates a recorder that succeeds on every call.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with an error whose `Display`
    /// output contains `message`.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.fail_with.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = Some(message.into());
    }

    /// Stops failing; subsequent calls succeed again.
    pub fn stop_failing(&self) {
        *self.fail_with.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = None;
    }

    /// Every call recorded so far, in call order.
    #[must_use]
    pub fn patches(&self) -> Vec<RecordedPatch> {
        self.patches
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Number of calls recorded so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.patches.lock().unwrap_or_else(std::sync::PoisonError::into_inner).len()
    }
}

#[async_trait]
impl PatchClient for RecordingPatchClient {
    async fn patch_workload(
        &self,
        kind: Kind,
        namespace: &str,
        name: &str,
        patch: Value,
    ) -> Result<(), AppError> {
        let workload = FullName::new(kind, namespace, name);
        self.patches
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(RecordedPatch { workload, patch });

        if let Some(message) = self.fail_with.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone() {
            return Err(AppError::Patch(message));
        }
        Ok(())
    }
}
