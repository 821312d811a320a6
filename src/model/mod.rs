//! Core domain types: identity, the two meta-resource shapes, and the
//! debounced change entry.

mod change;
mod identity;
mod meta;

pub use change::Change;
pub use identity::{FullName, Kind};
pub use meta::{ConfigValue, MetaConfig, MetaDeployment, ObjectMeta};
