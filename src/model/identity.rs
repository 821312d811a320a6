//! Resource identity: `<kind>/<namespace>/<name>`.

use std::fmt::{Display, Formatter};

/// The four object kinds the controller distinguishes. Config objects
/// (`ConfigMap`, `Secret`) are watched for content changes; workload
/// objects (`Deployment`, `StatefulSet`) are the restart targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    /// A `ConfigMap`-shaped config object.
    ConfigMap,
    /// A `Secret`-shaped config object; values are base64-encoded before
    /// hashing to mirror the source platform's implicit byte-slice
    /// marshaling.
    Secret,
    /// A `Deployment`-shaped workload.
    Deployment,
    /// A `StatefulSet`-shaped workload.
    StatefulSet,
}

impl Kind {
    /// `true` for the two config-object kinds.
    #[must_use]
    pub fn is_config(self) -> bool {
        matches!(self, Self::ConfigMap | Self::Secret)
    }

    /// `true` for the two workload kinds.
    #[must_use]
    pub fn is_workload(self) -> bool {
        !self.is_config()
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::ConfigMap => "configmap",
            Self::Secret => "secret",
            Self::Deployment => "deployment",
            Self::StatefulSet => "statefulset",
        }
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable identity of a watched object: `<kind>/<namespace>/<name>`.
///
/// Grounded on `original_source/src/controller/meta_config.go`'s
/// `FullName()` (`fmt.Sprintf("%s/%s/%s", typ, namespace, name)`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FullName {
    kind: Kind,
    namespace: String,
    name: String,
}

impl FullName {
    /// Builds a full name from its constituent parts.
    #[must_use]
    pub fn new(kind: Kind, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// The object kind.
    #[must_use]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// The namespace component.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The bare name component (without kind or namespace).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Display for FullName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.kind, self.namespace, self.name)
    }
}
