//! A named binding of a cluster to a user.

use serde::{Deserialize, Serialize};

/// The raw `context` stanza.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ContextSettings {
    pub cluster: String,
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_node: Option<String>,
}

/// A `contexts[]` list entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NamedContext {
    pub name: String,
    pub context: ContextSettings,
}

/// Cluster and user references are not checked here; a dangling reference
/// surfaces when the context is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    name: String,
    cluster: String,
    user: String,
    default_node: Option<String>,
}

impl Context {
    pub fn new(
        name: impl Into<String>,
        cluster: impl Into<String>,
        user: impl Into<String>,
        default_node: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            cluster: cluster.into(),
            user: user.into(),
            default_node,
        }
    }

    pub fn from_entry(entry: &NamedContext) -> Self {
        Self::new(
            entry.name.clone(),
            entry.context.cluster.clone(),
            entry.context.user.clone(),
            entry.context.default_node.clone(),
        )
    }

    #[must_use]
    pub fn to_entry(&self) -> NamedContext {
        NamedContext {
            name: self.name.clone(),
            context: ContextSettings {
                cluster: self.cluster.clone(),
                user: self.user.clone(),
                default_node: self.default_node.clone(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn default_node(&self) -> Option<&str> {
        self.default_node.as_deref()
    }
}
