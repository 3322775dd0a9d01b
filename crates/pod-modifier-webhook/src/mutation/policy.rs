use std::collections::BTreeSet;

use tracing::info;

/// Namespaces reserved by the platform. Pods living there are never mutated.
pub const DEFAULT_EXCLUDED_NAMESPACES: [&str; 2] = ["kube-system", "kube-public"];

/// Decides whether Pods of a given namespace may be mutated
#[derive(Clone, Debug)]
pub struct NamespacePolicy {
    excluded_namespaces: BTreeSet<String>,
}

impl NamespacePolicy {
    pub fn new<I, S>(excluded_namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded_namespaces: excluded_namespaces.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_eligible(&self, namespace: &str) -> bool {
        if self.excluded_namespaces.contains(namespace) {
            info!(namespace, "skipping mutation, namespace is excluded");
            return false;
        }
        true
    }
}

impl Default for NamespacePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDED_NAMESPACES)
    }
}
