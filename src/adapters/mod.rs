//! Flattens live platform objects into [`crate::model::MetaConfig`] /
//! [`crate::model::MetaDeployment`]. The real cluster wire format is out
//! of scope (see SPEC_FULL.md §4.1); these adapters take an explicit
//! [`crate::model::ObjectMeta`] plus a minimal payload shape instead of a
//! vendored SDK type.

pub mod checksum;
pub mod config_adapter;
pub mod workload_adapter;

pub use config_adapter::{config_from_map, secret_from_map};
pub use workload_adapter::{deployment_from_template, PodTemplateSpec, Volume};
