//! Applying a merge-patch to a workload, grounded on
//! `original_source/src/controller/interfaces/k8s_client.go`'s
//! `PatchDeployment`/`PatchStatefulSet`.

mod client;
mod http;
mod recording;

pub use client::{apply, PatchClient};
pub use http::HttpPatchClient;
pub use recording::{RecordedPatch, RecordingPatchClient};
