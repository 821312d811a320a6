//! Builds the JSON merge-patch body, grounded on
//! `original_source/src/controller/meta_deployment.go`'s
//! `UpdateConfigChecksums`.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::adapters::workload_adapter::{APPLIED_CHECKSUMS_ANNOTATION, RESTART_TRIGGER_ANNOTATION};
use crate::clock::Clock;

/// Builds the merge-patch for `applied_checksums`, optionally also
/// bumping the pod template's restart-trigger annotation when `restart`
/// is set.
#[must_use]
pub fn build(applied_checksums: &BTreeMap<String, String>, restart: bool, clock: &dyn Clock) -> Value {
    let encoded_checksums = serde_json::to_string(applied_checksums).unwrap_or_default();

    let mut patch = json!({
        "metadata": {
            "annotations": {
                APPLIED_CHECKSUMS_ANNOTATION: encoded_checksums,
            }
        }
    });

    if restart {
        patch["spec"] = json!({
            "template": {
                "metadata": {
                    "annotations": {
                        RESTART_TRIGGER_ANNOTATION: clock.restart_timestamp(),
                    }
                }
            }
        });
    }

    patch
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::clock::TestClock;
    use chrono::{TimeZone, Utc};

    #[test]
    fn patch_without_restart_has_no_spec_section() {
        let clock = TestClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let patch = build(&BTreeMap::new(), false, &clock);
        assert!(patch.get("spec").is_none());
    }

    #[test]
    fn patch_with_restart_sets_template_timestamp_annotation() {
        let clock = TestClock::new(Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 3).unwrap());
        let patch = build(&BTreeMap::new(), true, &clock);
        let timestamp = patch["spec"]["template"]["metadata"]["annotations"][RESTART_TRIGGER_ANNOTATION]
            .as_str()
            .unwrap();
        assert_eq!(timestamp, "Mar  7 09:05:03");
    }
}
