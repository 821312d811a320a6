//! Generic HTTP-based `PatchClient`, grounded on `slack/client.rs`'s use
//! of `reqwest` for outbound calls. This is the out-of-the-box
//! implementation for talking to a real cluster API's REST endpoints (or
//! a proxy in front of one); it vendors no platform-specific SDK.

use async_trait::async_trait;
use reqwest::Client;

use crate::model::Kind;
use crate::AppError;

use super::client::PatchClient;

const MERGE_PATCH_CONTENT_TYPE: &str = "application/merge-patch+json";

/// Issues an HTTP `PATCH` against `{base_url}/{kind}s/{namespace}/{name}`
/// with a `Content-Type: application/merge-patch+json` body.
#[derive(Debug, Clone)]
pub struct HttpPatchClient {
    client: Client,
    base_url: String,
}

impl HttpPatchClient {
    /// Builds a client targeting `base_url` (no trailing slash expected).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    fn resource_url(&self, kind: Kind, namespace: &str, name: &str) -> String {
        format!("{}/{kind}s/{namespace}/{name}", self.base_url)
    }
}

#[async_trait]
impl PatchClient for HttpPatchClient {
    async fn patch_workload(
        &self,
        kind: Kind,
        namespace: &str,
        name: &str,
        patch: serde_json::Value,
    ) -> Result<(), AppError> {
        let url = self.resource_url(kind, namespace, name);
        let response = self
            .client
            .patch(url)
            .header(reqwest::header::CONTENT_TYPE, MERGE_PATCH_CONTENT_TYPE)
            .json(&patch)
            .send()
            .await?;

        if let Err(err) = response.error_for_status_ref() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Patch(format!("{err}: {body}")));
        }

        Ok(())
    }
}
