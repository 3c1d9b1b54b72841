//! Service identity and pod keys

use serde::{Serialize, Serializer};
use std::fmt;

/// A logical service, identified by name and namespace
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Service {
    pub name: String,
    pub namespace: String,
}

impl Service {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.namespace)
    }
}

// Serialized as "name/namespace" so it can key JSON and YAML maps.
impl Serialize for Service {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Key consumers use to look up the services of a pod
///
/// The literal shape is part of the consumer contract.
pub fn pod_key(namespace: &str, pod_name: &str) -> String {
    format!("namespace:{},podName:{}", namespace, pod_name)
}
