//! Builds [`MetaConfig`] from a `ConfigMap`- or `Secret`-shaped source
//! object.

use std::collections::BTreeMap;

use super::checksum;
use crate::model::{ConfigValue, FullName, Kind, MetaConfig, ObjectMeta};

/// Builds a `MetaConfig` for a `ConfigMap`: plain UTF-8 data, hashed as-is.
#[must_use]
pub fn config_from_map(meta: &ObjectMeta, data: BTreeMap<String, String>) -> MetaConfig {
    let full_name = FullName::new(Kind::ConfigMap, meta.namespace.clone(), meta.name.clone());
    let values: BTreeMap<String, ConfigValue> = data
        .into_iter()
        .map(|(key, value)| (key, ConfigValue::Utf8(value)))
        .collect();
    MetaConfig::new(full_name, meta.resource_version.clone(), checksum::compute(&values))
}

/// Builds a `MetaConfig` for a `Secret`: binary data, base64-encoded
/// before hashing inside [`checksum::compute`].
#[must_use]
pub fn secret_from_map(meta: &ObjectMeta, data: BTreeMap<String, Vec<u8>>) -> MetaConfig {
    let full_name = FullName::new(Kind::Secret, meta.namespace.clone(), meta.name.clone());
    let values: BTreeMap<String, ConfigValue> = data
        .into_iter()
        .map(|(key, value)| (key, ConfigValue::Binary(value)))
        .collect();
    MetaConfig::new(full_name, meta.resource_version.clone(), checksum::compute(&values))
}
