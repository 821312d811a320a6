//! Loads a recorded event feed from a JSON file for the `--replay` debug
//! mode (SPEC_FULL.md §6's `ResourceWatcher` boundary: since the real
//! cluster wire format is out of scope, this is the only concrete event
//! source this binary ships besides tests).

use std::collections::BTreeMap;
use std::path::Path;

use base64::Engine as _;
use serde::Deserialize;

use crate::adapters::workload_adapter::{deployment_from_template, ConfigReference, Container, PodTemplateSpec};
use crate::adapters::{config_from_map, secret_from_map};
use crate::model::{Kind, ObjectMeta};
use crate::watcher::{MetaResource, WatchEvent};
use crate::AppError;

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum ReplayEvent {
    Updated(ReplayResource),
    Deleted(ReplayResource),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ReplayResource {
    ConfigMap {
        namespace: String,
        name: String,
        #[serde(default, rename = "resourceVersion")]
        resource_version: String,
        #[serde(default)]
        data: BTreeMap<String, String>,
    },
    Secret {
        namespace: String,
        name: String,
        #[serde(default, rename = "resourceVersion")]
        resource_version: String,
        /// Values are base64 text, matching the wire representation a
        /// real cluster API returns for `Secret.data`.
        #[serde(default)]
        data: BTreeMap<String, String>,
    },
    Deployment {
        namespace: String,
        name: String,
        #[serde(default, rename = "resourceVersion")]
        resource_version: String,
        #[serde(default)]
        annotations: BTreeMap<String, String>,
        #[serde(default)]
        template: ReplayPodTemplate,
    },
    StatefulSet {
        namespace: String,
        name: String,
        #[serde(default, rename = "resourceVersion")]
        resource_version: String,
        #[serde(default)]
        annotations: BTreeMap<String, String>,
        #[serde(default)]
        template: ReplayPodTemplate,
    },
}

#[derive(Debug, Default, Deserialize)]
struct ReplayPodTemplate {
    #[serde(default)]
    containers: Vec<ReplayContainer>,
    #[serde(default)]
    volumes: Vec<ReplayConfigRef>,
}

#[derive(Debug, Default, Deserialize)]
struct ReplayContainer {
    #[serde(default, rename = "envFrom")]
    env_from: Vec<ReplayConfigRef>,
}

#[derive(Debug, Default, Deserialize)]
struct ReplayConfigRef {
    #[serde(default, rename = "configMapRef")]
    config_map_ref: Option<String>,
    #[serde(default, rename = "secretRef")]
    secret_ref: Option<String>,
}

impl From<ReplayConfigRef> for ConfigReference {
    fn from(value: ReplayConfigRef) -> Self {
        Self {
            config_map_ref: value.config_map_ref,
            secret_ref: value.secret_ref,
        }
    }
}

impl From<ReplayPodTemplate> for PodTemplateSpec {
    fn from(value: ReplayPodTemplate) -> Self {
        Self {
            containers: value
                .containers
                .into_iter()
                .map(|c| Container {
                    env_from: c.env_from.into_iter().map(Into::into).collect(),
                })
                .collect(),
            volumes: value.volumes.into_iter().map(Into::into).collect(),
        }
    }
}

fn decode_secret_data(data: BTreeMap<String, String>) -> Result<BTreeMap<String, Vec<u8>>, AppError> {
    data.into_iter()
        .map(|(key, value)| {
            base64::engine::general_purpose::STANDARD
                .decode(value)
                .map(|bytes| (key, bytes))
                .map_err(|err| AppError::Adapter(format!("invalid base64 secret value: {err}")))
        })
        .collect()
}

fn resource_from_replay(resource: ReplayResource) -> Result<MetaResource, AppError> {
    match resource {
        ReplayResource::ConfigMap { namespace, name, resource_version, data } => {
            let meta = ObjectMeta::new(namespace, name).with_version(resource_version);
            Ok(MetaResource::Config(config_from_map(&meta, data)))
        }
        ReplayResource::Secret { namespace, name, resource_version, data } => {
            let meta = ObjectMeta::new(namespace, name).with_version(resource_version);
            let decoded = decode_secret_data(data)?;
            Ok(MetaResource::Config(secret_from_map(&meta, decoded)))
        }
        ReplayResource::Deployment {
            namespace,
            name,
            resource_version,
            annotations,
            template,
        } => {
            let mut meta = ObjectMeta::new(namespace, name).with_version(resource_version);
            meta.annotations = annotations;
            Ok(MetaResource::Deployment(deployment_from_template(
                &meta,
                Kind::Deployment,
                &template.into(),
            )))
        }
        ReplayResource::StatefulSet {
            namespace,
            name,
            resource_version,
            annotations,
            template,
        } => {
            let mut meta = ObjectMeta::new(namespace, name).with_version(resource_version);
            meta.annotations = annotations;
            Ok(MetaResource::Deployment(deployment_from_template(
                &meta,
                Kind::StatefulSet,
                &template.into(),
            )))
        }
    }
}

/// Parses a JSON array of recorded `{action, kind, ...}` entries into a
/// replayable event feed.
///
/// # Errors
///
/// Returns `AppError::Config` if the file cannot be read, `AppError::Adapter`
/// if its contents are not valid JSON or reference malformed secret data.
pub fn load_events(path: &Path) -> Result<Vec<WatchEvent>, AppError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|err| AppError::Config(format!("cannot read replay file '{}': {err}", path.display())))?;
    let entries: Vec<ReplayEvent> = serde_json::from_str(&raw)
        .map_err(|err| AppError::Adapter(format!("invalid replay file '{}': {err}", path.display())))?;

    entries
        .into_iter()
        .map(|entry| match entry {
            ReplayEvent::Updated(resource) => resource_from_replay(resource).map(WatchEvent::Updated),
            ReplayEvent::Deleted(resource) => resource_from_replay(resource).map(WatchEvent::Deleted),
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fixture(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parses_config_map_and_deployment_events() {
        let file = write_fixture(
            r#"[
                {"action":"updated","kind":"config_map","namespace":"ns","name":"settings","data":{"key":"value"}},
                {"action":"updated","kind":"deployment","namespace":"ns","name":"api","annotations":{"com.xing.deployment-restart":"enabled"},"template":{"containers":[{"envFrom":[{"configMapRef":"settings"}]}]}}
            ]"#,
        );
        let events = load_events(file.path()).unwrap();
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn rejects_invalid_json() {
        let file = write_fixture("not json");
        assert!(load_events(file.path()).is_err());
    }
}
