//! Facade over [`ConfigProvider`] and [`ConfigStore`] for one invocation.
//!
//! The service starts unloaded. [`ConfigService::load`] locates and parses
//! the file; the resolved settings are computed on first use and cached
//! until a mutation invalidates them.

use super::{
    config_provider::{ConfigProvider, ENV_CONFIG, no_context_selected},
    config_store::ConfigStore,
};
use crate::config::application::request::config_overrides::ConfigOverrides;
use crate::core::domain::{
    error::{ConfigError, ConfigResult},
    model::{
        cluster::{Cluster, ClusterSettings},
        config_document::{ConfigDocument, USERS_KEY, empty_document},
        context::Context,
        resolved_config::ResolvedConfig,
        user::{User, UserSettings},
    },
    value_object::SECRET_MASK,
};
use serde_yaml::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory under `$HOME` holding the default config file.
pub const DEFAULT_CONFIG_DIR: &str = ".pvectl";
pub const DEFAULT_CONFIG_FILE: &str = "config";

const SECRET_KEYS: [&str; 2] = ["token-secret", "password"];

/// Fields of `config set-context`; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextPatch {
    pub cluster: Option<String>,
    pub user: Option<String>,
    pub default_node: Option<String>,
}

#[derive(Debug)]
struct LoadedConfig {
    path: PathBuf,
    raw: Value,
    document: ConfigDocument,
    context_name: Option<String>,
    resolved: Option<ResolvedConfig>,
}

#[derive(Debug)]
pub struct ConfigService {
    provider: ConfigProvider,
    store: ConfigStore,
    overrides: ConfigOverrides,
    state: Option<LoadedConfig>,
}

impl ConfigService {
    pub fn new(provider: ConfigProvider, store: ConfigStore) -> Self {
        Self {
            provider,
            store,
            overrides: ConfigOverrides::default(),
            state: None,
        }
    }

    /// `--config`, then `PVECTL_CONFIG`, then `$HOME/.pvectl/config`.
    pub fn resolve_config_path(&self, overrides: &ConfigOverrides) -> ConfigResult<PathBuf> {
        if let Some(path) = &overrides.config_path {
            return Ok(path.clone());
        }
        if let Some(path) = self.provider.env_var(ENV_CONFIG) {
            return Ok(PathBuf::from(path));
        }
        let home = self.provider.env_var("HOME").ok_or_else(|| {
            ConfigError::Invalid(format!(
                "cannot locate the config file: HOME is not set; use --config or {}",
                ENV_CONFIG
            ))
        })?;
        Ok(Path::new(home)
            .join(DEFAULT_CONFIG_DIR)
            .join(DEFAULT_CONFIG_FILE))
    }

    /// Unloaded to loaded.
    ///
    /// # Errors
    /// `ConfigError::NotFound` if the file does not exist, `Invalid` if it
    /// does not parse.
    pub fn load(&mut self, overrides: &ConfigOverrides) -> ConfigResult<()> {
        let path = self.resolve_config_path(overrides)?;
        if !path.exists() {
            return Err(ConfigError::NotFound { path });
        }
        warn_if_exposed(&path);

        let raw = self.provider.load_file(&path)?;
        let document = ConfigDocument::from_value(&raw)?;
        let context_name = self.provider.resolve_context_name(overrides, &document);
        debug!(path = %path.display(), context = ?context_name, "configuration loaded");

        self.overrides = overrides.clone();
        self.state = Some(LoadedConfig {
            path,
            raw,
            document,
            context_name,
            resolved: None,
        });
        Ok(())
    }

    /// Like [`load`](Self::load), but writes an empty config first if the
    /// file does not exist yet.
    pub fn load_or_init(&mut self, overrides: &ConfigOverrides) -> ConfigResult<()> {
        let path = self.resolve_config_path(overrides)?;
        if !path.exists() {
            debug!(path = %path.display(), "creating configuration file");
            self.store.save(&path, &empty_document())?;
        }
        self.load(overrides)
    }

    pub fn is_loaded(&self) -> bool {
        self.state.is_some()
    }

    /// The merged settings of the active context, computed once.
    ///
    /// # Errors
    /// `ConfigError::NotLoaded` before [`load`](Self::load), otherwise any
    /// resolution error.
    pub fn current_config(&mut self) -> ConfigResult<ResolvedConfig> {
        let state = self.state.as_mut().ok_or(ConfigError::NotLoaded)?;
        if let Some(resolved) = &state.resolved {
            return Ok(resolved.clone());
        }
        let context_name = state.context_name.clone().ok_or_else(no_context_selected)?;
        let resolved =
            self.provider
                .resolve_context(&state.document, &context_name, &self.overrides, None)?;
        state.resolved = Some(resolved.clone());
        Ok(resolved)
    }

    /// Makes `name` the current context, in the file and in memory.
    pub fn use_context(&mut self, name: &str) -> ConfigResult<()> {
        let state = self.loaded()?;
        if !state.document.has_context(name) {
            return Err(ConfigError::ContextNotFound {
                name: name.to_string(),
                available: state.document.context_names(),
            });
        }
        let path = state.path.clone();
        let raw = self.store.update_current_context(&path, name)?;
        self.replace_raw(raw, Some(name.to_string()))
    }

    /// Creates or updates a context.
    ///
    /// A new context needs both a cluster and a user.
    pub fn set_context(&mut self, name: &str, patch: ContextPatch) -> ConfigResult<Context> {
        let state = self.loaded()?;
        let existing = state.document.find_context(name).ok();
        let (cluster, user, default_node) = match existing {
            Some(current) => (
                patch.cluster.unwrap_or_else(|| current.cluster().to_string()),
                patch.user.unwrap_or_else(|| current.user().to_string()),
                patch
                    .default_node
                    .or_else(|| current.default_node().map(str::to_string)),
            ),
            None => match (patch.cluster, patch.user) {
                (Some(cluster), Some(user)) => (cluster, user, patch.default_node),
                _ => {
                    return Err(ConfigError::Invalid(format!(
                        "new context '{}' needs both --cluster and --user",
                        name
                    )));
                }
            },
        };
        let context = Context::new(name, cluster, user, default_node);
        let path = state.path.clone();
        let raw = self.store.upsert_context(&path, &context)?;
        self.replace_raw(raw, None)?;
        Ok(context)
    }

    /// Creates or updates a cluster. Unset fields keep their stored value.
    pub fn set_cluster(&mut self, name: &str, patch: ClusterSettings) -> ConfigResult<Cluster> {
        let state = self.loaded()?;
        let base = state
            .document
            .clusters
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.cluster.clone())
            .unwrap_or_default();
        let settings = ClusterSettings {
            server: if patch.server.is_empty() {
                base.server
            } else {
                patch.server
            },
            insecure_skip_tls_verify: patch
                .insecure_skip_tls_verify
                .or(base.insecure_skip_tls_verify),
            certificate_authority: patch.certificate_authority.or(base.certificate_authority),
            timeout: patch.timeout.or(base.timeout),
            retry_count: patch.retry_count.or(base.retry_count),
            retry_delay: patch.retry_delay.or(base.retry_delay),
            max_retry_delay: patch.max_retry_delay.or(base.max_retry_delay),
            retry_writes: patch.retry_writes.or(base.retry_writes),
        };
        let cluster = Cluster::new(name, settings)?;
        let path = state.path.clone();
        let raw = self.store.upsert_cluster(&path, &cluster)?;
        self.replace_raw(raw, None)?;
        Ok(cluster)
    }

    /// Replaces a user's credentials with one complete pair.
    pub fn set_credentials(&mut self, name: &str, settings: UserSettings) -> ConfigResult<User> {
        let state = self.loaded()?;
        let user = User::new(name, settings);
        if !user.is_valid() {
            return Err(ConfigError::MissingCredentials(format!(
                "user '{}' needs --token-id and --token-secret, or --username and --password",
                name
            )));
        }
        let path = state.path.clone();
        let raw = self.store.upsert_user(&path, &user)?;
        self.replace_raw(raw, None)?;
        Ok(user)
    }

    /// A copy of the raw tree with every user secret replaced by the mask.
    pub fn masked_config(&self) -> ConfigResult<Value> {
        Ok(mask_secrets(&self.loaded()?.raw))
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.state.as_ref().map(|state| state.path.as_path())
    }

    pub fn current_context_name(&self) -> Option<&str> {
        self.state
            .as_ref()
            .and_then(|state| state.context_name.as_deref())
    }

    pub fn contexts(&self) -> ConfigResult<Vec<Context>> {
        Ok(self
            .loaded()?
            .document
            .contexts
            .iter()
            .map(Context::from_entry)
            .collect())
    }

    fn loaded(&self) -> ConfigResult<&LoadedConfig> {
        self.state.as_ref().ok_or(ConfigError::NotLoaded)
    }

    /// Swaps in a freshly written tree and drops the cached resolution.
    /// `context_name` replaces the active context when given.
    fn replace_raw(&mut self, raw: Value, context_name: Option<String>) -> ConfigResult<()> {
        let document = ConfigDocument::from_value(&raw)?;
        let state = self.state.as_mut().ok_or(ConfigError::NotLoaded)?;
        if let Some(name) = context_name {
            state.context_name = Some(name);
        }
        state.raw = raw;
        state.document = document;
        state.resolved = None;
        Ok(())
    }
}

fn mask_secrets(raw: &Value) -> Value {
    let mut masked = raw.clone();
    if let Some(Value::Sequence(users)) = masked.get_mut(USERS_KEY) {
        for entry in users.iter_mut() {
            if let Some(Value::Mapping(user)) = entry.get_mut("user") {
                for key in SECRET_KEYS {
                    if let Some(secret) = user.get_mut(key) {
                        if !secret.is_null() {
                            *secret = Value::String(SECRET_MASK.to_string());
                        }
                    }
                }
            }
        }
    }
    masked
}

/// Printed straight to stderr so a quiet log filter cannot hide it.
fn warn_if_exposed(path: &Path) {
    if let Some(message) = exposure_warning(path) {
        debug!(path = %path.display(), "configuration file permissions too open");
        eprintln!("warning: {message}");
    }
}

#[cfg(unix)]
fn exposure_warning(path: &Path) -> Option<String> {
    let mode = super::config_store::existing_mode(path)?;
    (mode & 0o077 != 0).then(|| {
        format!(
            "configuration file {} has mode {:o} and is accessible by group or others; \
             run chmod 600 on it",
            path.display(),
            mode
        )
    })
}

#[cfg(not(unix))]
fn exposure_warning(_path: &Path) -> Option<String> {
    None
}
