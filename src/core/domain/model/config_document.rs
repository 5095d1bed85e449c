//! Typed view of the kubeconfig-style configuration file.
//!
//! The file itself is kept as a raw [`serde_yaml::Value`] so that rewriting
//! it never drops keys this crate does not know about; this module only
//! reads from it.

use super::{
    cluster::{Cluster, NamedCluster},
    context::{Context, NamedContext},
    user::{NamedUser, User},
};
use crate::core::domain::error::{ConfigError, ConfigResult};
use crate::core::domain::value_object::serde_helpers::null_as_default;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};

pub const API_VERSION: &str = "v1";
pub const KIND: &str = "Config";

pub const CLUSTERS_KEY: &str = "clusters";
pub const USERS_KEY: &str = "users";
pub const CONTEXTS_KEY: &str = "contexts";
pub const CURRENT_CONTEXT_KEY: &str = "current-context";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConfigDocument {
    #[serde(default, deserialize_with = "null_as_default")]
    pub clusters: Vec<NamedCluster>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub users: Vec<NamedUser>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub contexts: Vec<NamedContext>,
    #[serde(default)]
    pub current_context: Option<String>,
}

impl ConfigDocument {
    pub fn from_value(value: &Value) -> ConfigResult<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_yaml::from_value(value.clone()).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// The declared current context, ignoring an empty string.
    pub fn current_context(&self) -> Option<&str> {
        self.current_context.as_deref().filter(|s| !s.is_empty())
    }

    pub fn context_names(&self) -> Vec<String> {
        self.contexts.iter().map(|c| c.name.clone()).collect()
    }

    pub fn cluster_names(&self) -> Vec<String> {
        self.clusters.iter().map(|c| c.name.clone()).collect()
    }

    pub fn user_names(&self) -> Vec<String> {
        self.users.iter().map(|u| u.name.clone()).collect()
    }

    pub fn has_context(&self, name: &str) -> bool {
        self.contexts.iter().any(|c| c.name == name)
    }

    pub fn find_context(&self, name: &str) -> ConfigResult<Context> {
        self.contexts
            .iter()
            .find(|c| c.name == name)
            .map(Context::from_entry)
            .ok_or_else(|| ConfigError::ContextNotFound {
                name: name.to_string(),
                available: self.context_names(),
            })
    }

    pub fn find_cluster(&self, name: &str) -> ConfigResult<Cluster> {
        let entry = self
            .clusters
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| ConfigError::ClusterNotFound {
                name: name.to_string(),
                available: self.cluster_names(),
            })?;
        Cluster::from_entry(entry)
    }

    pub fn find_user(&self, name: &str) -> ConfigResult<User> {
        self.users
            .iter()
            .find(|u| u.name == name)
            .map(User::from_entry)
            .ok_or_else(|| ConfigError::UserNotFound {
                name: name.to_string(),
                available: self.user_names(),
            })
    }
}

/// Skeleton written when a config file is created from scratch.
pub fn empty_document() -> Value {
    let mut root = Mapping::new();
    root.insert("apiVersion".into(), API_VERSION.into());
    root.insert("kind".into(), KIND.into());
    root.insert(CLUSTERS_KEY.into(), Value::Sequence(Vec::new()));
    root.insert(USERS_KEY.into(), Value::Sequence(Vec::new()));
    root.insert(CONTEXTS_KEY.into(), Value::Sequence(Vec::new()));
    root.insert(CURRENT_CONTEXT_KEY.into(), "".into());
    Value::Mapping(root)
}
