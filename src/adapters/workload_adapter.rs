//! Builds [`MetaDeployment`] from a workload's metadata and pod template,
//! grounded on `original_source/src/controller/meta_deployment.go`.

use std::collections::BTreeMap;

use tracing::warn;

use crate::model::{FullName, Kind, MetaDeployment, ObjectMeta};

/// Opt-in annotation: the workload is only tracked when its value is
/// exactly `"enabled"`.
pub const ENABLED_ANNOTATION: &str = "com.xing.deployment-restart";

/// Annotation on the workload holding the last-applied checksums, as a
/// JSON object mapping a referenced config's `FullName` string to its
/// checksum at the time it was applied.
pub const APPLIED_CHECKSUMS_ANNOTATION: &str =
    "com.xing.deployment-restart.applied-config-checksums";

/// Annotation written to the pod template to force a rollout; its value
/// is a timestamp, not interpreted by the controller itself.
pub const RESTART_TRIGGER_ANNOTATION: &str = "com.xing.deployment-restart.timestamp";

/// A `configMapRef`/`secretRef` pair as it can appear in an `envFrom`
/// entry or a volume source — exactly one side is populated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigReference {
    /// Name of the referenced `ConfigMap`, if this reference is one.
    pub config_map_ref: Option<String>,
    /// Name of the referenced `Secret`, if this reference is one.
    pub secret_ref: Option<String>,
}

/// A single container's `envFrom` sources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Container {
    /// Config/secret references consumed via `envFrom`.
    pub env_from: Vec<ConfigReference>,
}

/// A pod-level volume, which may project a `ConfigMap` or `Secret`.
pub type Volume = ConfigReference;

/// The subset of a `PodTemplateSpec` the controller reads to discover
/// referenced configs: containers' `envFrom` sources and volumes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PodTemplateSpec {
    /// Containers defined in the template.
    pub containers: Vec<Container>,
    /// Volumes defined in the template.
    pub volumes: Vec<Volume>,
}

/// Builds a `MetaDeployment` for a `Deployment` or `StatefulSet`.
///
/// Extracts referenced configs from `template`'s env-from sources and
/// volumes (sorted, de-duplicated — mirroring `configNamesFromTemplate`),
/// the opt-in flag from [`ENABLED_ANNOTATION`], and the applied-checksum
/// map from [`APPLIED_CHECKSUMS_ANNOTATION`] (empty with a warning if the
/// annotation is missing or malformed, never a hard error).
#[must_use]
pub fn deployment_from_template(
    meta: &ObjectMeta,
    kind: Kind,
    template: &PodTemplateSpec,
) -> MetaDeployment {
    let full_name = FullName::new(kind, meta.namespace.clone(), meta.name.clone());
    let enabled = meta
        .annotations
        .get(ENABLED_ANNOTATION)
        .is_some_and(|value| value == "enabled");
    let referenced = referenced_configs(&meta.namespace, template);
    let applied = applied_checksums_from_annotations(&full_name, &meta.annotations);

    MetaDeployment::new(full_name, meta.resource_version.clone(), enabled, referenced, applied)
}

fn referenced_configs(namespace: &str, template: &PodTemplateSpec) -> Vec<FullName> {
    let mut names: Vec<FullName> = Vec::new();

    let mut push_ref = |reference: &ConfigReference| {
        if let Some(name) = &reference.config_map_ref {
            names.push(FullName::new(Kind::ConfigMap, namespace, name.clone()));
        }
        if let Some(name) = &reference.secret_ref {
            names.push(FullName::new(Kind::Secret, namespace, name.clone()));
        }
    };

    for container in &template.containers {
        for source in &container.env_from {
            push_ref(source);
        }
    }
    for volume in &template.volumes {
        push_ref(volume);
    }

    names.sort();
    names.dedup();
    names
}

fn applied_checksums_from_annotations(
    full_name: &FullName,
    annotations: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let Some(raw) = annotations.get(APPLIED_CHECKSUMS_ANNOTATION) else {
        return BTreeMap::new();
    };

    match serde_json::from_str::<BTreeMap<String, String>>(raw) {
        Ok(map) => map,
        Err(err) => {
            warn!(workload = %full_name, %err, "malformed applied-checksums annotation, treating as empty");
            BTreeMap::new()
        }
    }
}
