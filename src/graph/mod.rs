//! The in-memory bidirectional graph between workloads and the configs
//! they reference.

mod config_node;
mod store;
mod workload_node;

pub use config_node::ConfigNode;
pub use store::GraphStore;
pub use workload_node::WorkloadNode;
