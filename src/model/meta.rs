//! Flattened, platform-agnostic views of the two watched object families.
//!
//! Real cluster objects carry far more than this; `ObjectMeta` and the two
//! `Meta*` structs below are the minimal shape the reconciler actually
//! needs, grounded on `original_source/src/controller/meta_config.go` and
//! `meta_deployment.go`.

use std::collections::BTreeMap;

use super::identity::FullName;

/// The subset of a cluster object's metadata the controller reads:
/// namespace, name, annotations, and the opaque resource version used to
/// suppress idempotent re-deliveries (`original_source`'s
/// `meta.ResourceVersion`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectMeta {
    /// Namespace the object lives in.
    pub namespace: String,
    /// Object name.
    pub name: String,
    /// Annotation map, as read from the object.
    pub annotations: BTreeMap<String, String>,
    /// Opaque version token, e.g. the platform's `resourceVersion`. Empty
    /// if the source never supplies one.
    pub resource_version: String,
}

impl ObjectMeta {
    /// Builds an empty-annotation, empty-version meta for the given
    /// namespace/name.
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            annotations: BTreeMap::new(),
            resource_version: String::new(),
        }
    }

    /// Sets an annotation, builder-style.
    #[must_use]
    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    /// Sets the resource version, builder-style.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.resource_version = version.into();
        self
    }
}

/// A single config data value. `ConfigMap` data is always UTF-8 text;
/// `Secret` data is raw bytes that the source platform implicitly
/// base64-encodes when marshaling to JSON — a behavior
/// [`crate::adapters::checksum::compute`] must reproduce explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    /// A `ConfigMap`-style UTF-8 value.
    Utf8(String),
    /// A `Secret`-style binary value.
    Binary(Vec<u8>),
}

/// A flattened config object (`ConfigMap` or `Secret`): identity plus its
/// content checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaConfig {
    full_name: FullName,
    version: String,
    checksum: String,
}

impl MetaConfig {
    /// Builds a `MetaConfig` from a precomputed checksum. Adapters are the
    /// only intended caller; see `adapters::config_adapter`.
    #[must_use]
    pub fn new(full_name: FullName, version: String, checksum: String) -> Self {
        Self { full_name, version, checksum }
    }

    /// The config's identity.
    #[must_use]
    pub fn full_name(&self) -> &FullName {
        &self.full_name
    }

    /// The opaque version token used for idempotent re-delivery
    /// suppression.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The content checksum: 16 lowercase hex characters.
    #[must_use]
    pub fn checksum(&self) -> &str {
        &self.checksum
    }
}

/// A flattened workload object (`Deployment` or `StatefulSet`): identity,
/// opt-in state, the configs it references, and the checksums it has
/// already applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaDeployment {
    full_name: FullName,
    version: String,
    enabled: bool,
    referenced_configs: Vec<FullName>,
    applied_checksums: BTreeMap<String, String>,
}

impl MetaDeployment {
    /// Builds a `MetaDeployment` from already-extracted fields. Adapters
    /// are the only intended caller; see `adapters::workload_adapter`.
    #[must_use]
    pub fn new(
        full_name: FullName,
        version: String,
        enabled: bool,
        referenced_configs: Vec<FullName>,
        applied_checksums: BTreeMap<String, String>,
    ) -> Self {
        Self {
            full_name,
            version,
            enabled,
            referenced_configs,
            applied_checksums,
        }
    }

    /// The workload's identity.
    #[must_use]
    pub fn full_name(&self) -> &FullName {
        &self.full_name
    }

    /// The opaque version token used for idempotent re-delivery
    /// suppression.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Whether the opt-in annotation (`com.xing.deployment-restart ==
    /// "enabled"`) is present.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Configs this workload references, in sorted order (by `FullName`,
    /// mirroring `configNamesFromTemplate`'s lexicographic sort).
    #[must_use]
    pub fn referenced_configs(&self) -> &[FullName] {
        &self.referenced_configs
    }

    /// The checksums this workload has already recorded as applied, keyed
    /// by the referenced config's `FullName` string form.
    #[must_use]
    pub fn applied_checksums(&self) -> &BTreeMap<String, String> {
        &self.applied_checksums
    }
}
