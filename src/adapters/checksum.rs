//! The content-addressable checksum algorithm, grounded on
//! `original_source/src/controller/meta_config.go`'s `getSha`: marshal the
//! data map to canonical JSON, SHA-256 it, and take the first 8 bytes as
//! 16 lowercase hex characters.
//!
//! Go's `json.Marshal` sorts map keys and base64-encodes `[]byte` values
//! implicitly; `serde_json` does neither, so both behaviors are made
//! explicit here via a `BTreeMap` (sorted iteration) and an up-front
//! base64 encode of `Secret` values before the map is built.

use std::collections::BTreeMap;

use base64::Engine as _;
use sha2::{Digest, Sha256};

use crate::model::ConfigValue;

/// How many leading bytes of the SHA-256 digest become the checksum.
const DIGEST_PREFIX_BYTES: usize = 8;

/// Computes the 16-character checksum for a config object's data.
///
/// `Secret` values are base64-encoded before the canonical JSON is built,
/// mirroring Go's automatic `[]byte` → base64 string JSON marshaling so a
/// Rust-adapted object and its Go-sourced counterpart hash identically
/// given the same bytes.
#[must_use]
pub fn compute(data: &BTreeMap<String, ConfigValue>) -> String {
    let canonical: BTreeMap<&str, String> = data
        .iter()
        .map(|(key, value)| (key.as_str(), encode_value(value)))
        .collect();

    // serde_json serializes a BTreeMap's entries in key order, giving the
    // same canonical form as Go's sorted-map marshaling.
    let json = serde_json::to_vec(&canonical).unwrap_or_default();

    let digest = Sha256::digest(&json);
    hex::encode(&digest[..DIGEST_PREFIX_BYTES])
}

fn encode_value(value: &ConfigValue) -> String {
    match value {
        ConfigValue::Utf8(text) => text.clone(),
        ConfigValue::Binary(bytes) => base64::engine::general_purpose::STANDARD.encode(bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_is_sixteen_lowercase_hex_chars() {
        let mut data = BTreeMap::new();
        data.insert("key".to_string(), ConfigValue::Utf8("value".to_string()));
        let sum = compute(&data);
        assert_eq!(sum.len(), 16);
        assert!(sum.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn checksum_is_stable_regardless_of_insertion_order() {
        let mut a = BTreeMap::new();
        a.insert("a".to_string(), ConfigValue::Utf8("1".to_string()));
        a.insert("b".to_string(), ConfigValue::Utf8("2".to_string()));

        let mut b = BTreeMap::new();
        b.insert("b".to_string(), ConfigValue::Utf8("2".to_string()));
        b.insert("a".to_string(), ConfigValue::Utf8("1".to_string()));

        assert_eq!(compute(&a), compute(&b));
    }

    #[test]
    fn checksum_changes_when_content_changes() {
        let mut a = BTreeMap::new();
        a.insert("key".to_string(), ConfigValue::Utf8("v1".to_string()));
        let mut b = BTreeMap::new();
        b.insert("key".to_string(), ConfigValue::Utf8("v2".to_string()));
        assert_ne!(compute(&a), compute(&b));
    }

    #[test]
    fn secret_binary_values_hash_via_base64_not_raw_bytes() {
        let mut secret = BTreeMap::new();
        secret.insert(
            "token".to_string(),
            ConfigValue::Binary(b"hunter2".to_vec()),
        );
        let mut equivalent_text = BTreeMap::new();
        equivalent_text.insert(
            "token".to_string(),
            ConfigValue::Utf8(base64::engine::general_purpose::STANDARD.encode(b"hunter2")),
        );
        assert_eq!(compute(&secret), compute(&equivalent_text));
    }
}
