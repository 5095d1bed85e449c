//! Turns the config file, the environment and command-line overrides into a
//! [`ResolvedConfig`].
//!
//! Every overridable setting is taken from the first layer that has it:
//! command line, then environment, then the cluster stanza, then the
//! built-in default. Resolution reads the environment from a snapshot taken
//! at construction, so it is a pure function of its inputs.

use crate::config::application::request::config_overrides::ConfigOverrides;
use crate::core::domain::{
    error::{ConfigError, ConfigResult},
    model::{
        config_document::ConfigDocument,
        resolved_config::{
            Credentials, DEFAULT_MAX_RETRY_DELAY, DEFAULT_RETRY_COUNT, DEFAULT_RETRY_DELAY,
            DEFAULT_RETRY_WRITES, DEFAULT_TIMEOUT, ResolvedConfig,
        },
        user::User,
    },
    value_object::ProxmoxSecret,
};
use serde_yaml::{Mapping, Value};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

pub const ENV_HOST: &str = "PROXMOX_HOST";
pub const ENV_TOKEN_ID: &str = "PROXMOX_TOKEN_ID";
pub const ENV_TOKEN_SECRET: &str = "PROXMOX_TOKEN_SECRET";
pub const ENV_USER: &str = "PROXMOX_USER";
pub const ENV_PASSWORD: &str = "PROXMOX_PASSWORD";
pub const ENV_VERIFY_SSL: &str = "PROXMOX_VERIFY_SSL";
pub const ENV_TIMEOUT: &str = "PROXMOX_TIMEOUT";
pub const ENV_RETRY_COUNT: &str = "PROXMOX_RETRY_COUNT";
pub const ENV_RETRY_DELAY: &str = "PROXMOX_RETRY_DELAY";
pub const ENV_MAX_RETRY_DELAY: &str = "PROXMOX_MAX_RETRY_DELAY";
pub const ENV_RETRY_WRITES: &str = "PROXMOX_RETRY_WRITES";
pub const ENV_CONTEXT: &str = "PVECTL_CONTEXT";
pub const ENV_CONFIG: &str = "PVECTL_CONFIG";

/// Settings recognised in the environment. Unset and empty variables are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSettings {
    pub server: Option<String>,
    pub token_id: Option<String>,
    pub token_secret: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub verify_ssl: Option<bool>,
    pub timeout: Option<u64>,
    pub retry_count: Option<u32>,
    pub retry_delay: Option<u64>,
    pub max_retry_delay: Option<u64>,
    pub retry_writes: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigProvider {
    env: HashMap<String, String>,
}

impl ConfigProvider {
    /// A provider reading from the given environment snapshot.
    pub fn with_env(env: HashMap<String, String>) -> Self {
        Self { env }
    }

    /// A provider reading from the process environment as it is now.
    pub fn from_process_env() -> Self {
        Self::with_env(std::env::vars().collect())
    }

    /// A non-empty environment variable.
    pub fn env_var(&self, name: &str) -> Option<&str> {
        self.env
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Reads and parses the config file. An empty file is an empty mapping.
    ///
    /// # Errors
    /// `ConfigError::NotFound` if the file does not exist, `ConfigError::Invalid`
    /// if it is not valid YAML or not a mapping.
    pub fn load_file(&self, path: &Path) -> ConfigResult<Value> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::io(path, e)
            }
        })?;

        if contents.trim().is_empty() {
            return Ok(Value::Mapping(Mapping::new()));
        }

        let value: Value = serde_yaml::from_str(&contents).map_err(|e| {
            ConfigError::Invalid(format!("failed to parse {}: {}", path.display(), e))
        })?;
        match value {
            Value::Mapping(_) => Ok(value),
            Value::Null => Ok(Value::Mapping(Mapping::new())),
            _ => Err(ConfigError::Invalid(format!(
                "{}: top level must be a mapping",
                path.display()
            ))),
        }
    }

    /// Reads the fixed table of recognised environment variables.
    ///
    /// # Errors
    /// `ConfigError::Invalid` if an integer variable is not a non-negative integer.
    pub fn load_env(&self) -> ConfigResult<EnvSettings> {
        Ok(EnvSettings {
            server: self.env_string(ENV_HOST),
            token_id: self.env_string(ENV_TOKEN_ID),
            token_secret: self.env_string(ENV_TOKEN_SECRET),
            username: self.env_string(ENV_USER),
            password: self.env_string(ENV_PASSWORD),
            verify_ssl: self.env_bool(ENV_VERIFY_SSL),
            timeout: self.env_integer("timeout", ENV_TIMEOUT)?,
            retry_count: self
                .env_integer("retry_count", ENV_RETRY_COUNT)?
                .map(|count| {
                    u32::try_from(count).map_err(|_| {
                        invalid_integer("retry_count", ENV_RETRY_COUNT, &count.to_string())
                    })
                })
                .transpose()?,
            retry_delay: self.env_integer("retry_delay", ENV_RETRY_DELAY)?,
            max_retry_delay: self.env_integer("max_retry_delay", ENV_MAX_RETRY_DELAY)?,
            retry_writes: self.env_bool(ENV_RETRY_WRITES),
        })
    }

    /// The active context: `--context`, then `PVECTL_CONTEXT`, then the
    /// file's `current-context`.
    pub fn resolve_context_name(
        &self,
        overrides: &ConfigOverrides,
        document: &ConfigDocument,
    ) -> Option<String> {
        overrides
            .context
            .clone()
            .filter(|name| !name.is_empty())
            .or_else(|| self.env_var(ENV_CONTEXT).map(str::to_string))
            .or_else(|| document.current_context().map(str::to_string))
    }

    /// Loads `path` and resolves it.
    ///
    /// `cluster_override` replaces the cluster named by the context.
    pub fn resolve(
        &self,
        path: &Path,
        overrides: &ConfigOverrides,
        cluster_override: Option<&str>,
    ) -> ConfigResult<ResolvedConfig> {
        let raw = self.load_file(path)?;
        self.resolve_document(&raw, overrides, cluster_override)
    }

    /// Resolves an already loaded config tree.
    pub fn resolve_document(
        &self,
        raw: &Value,
        overrides: &ConfigOverrides,
        cluster_override: Option<&str>,
    ) -> ConfigResult<ResolvedConfig> {
        let document = ConfigDocument::from_value(raw)?;
        let context_name = self
            .resolve_context_name(overrides, &document)
            .ok_or_else(no_context_selected)?;
        self.resolve_context(&document, &context_name, overrides, cluster_override)
    }

    /// Resolves the named context of `document`.
    ///
    /// # Errors
    /// `ContextNotFound`, `ClusterNotFound` or `UserNotFound` for dangling
    /// names, `MissingCredentials` if no layer supplies credentials, and
    /// `Invalid` if the merged settings are inconsistent.
    pub fn resolve_context(
        &self,
        document: &ConfigDocument,
        context_name: &str,
        overrides: &ConfigOverrides,
        cluster_override: Option<&str>,
    ) -> ConfigResult<ResolvedConfig> {
        let env = self.load_env()?;
        let context = document.find_context(context_name)?;
        let cluster_name = cluster_override.unwrap_or(context.cluster());
        let cluster = document.find_cluster(cluster_name)?;
        let user = document.find_user(context.user())?;
        debug!(
            context = context_name,
            cluster = cluster_name,
            user = context.user(),
            "resolving configuration"
        );

        let credentials = resolve_credentials(&env, &user)?;
        let server = overrides
            .server
            .clone()
            .or(env.server)
            .unwrap_or_else(|| cluster.server().to_string());

        let resolved = ResolvedConfig {
            context_name: context_name.to_string(),
            server,
            verify_ssl: overrides
                .verify_ssl
                .or(env.verify_ssl)
                .unwrap_or(cluster.verify_ssl()),
            certificate_authority: cluster.certificate_authority().map(str::to_string),
            credentials,
            default_node: context.default_node().map(str::to_string),
            timeout: overrides
                .timeout
                .or(env.timeout)
                .or(cluster.timeout())
                .unwrap_or(DEFAULT_TIMEOUT),
            retry_count: overrides
                .retry_count
                .or(env.retry_count)
                .or(cluster.retry_count())
                .unwrap_or(DEFAULT_RETRY_COUNT),
            retry_delay: overrides
                .retry_delay
                .or(env.retry_delay)
                .or(cluster.retry_delay())
                .unwrap_or(DEFAULT_RETRY_DELAY),
            max_retry_delay: overrides
                .max_retry_delay
                .or(env.max_retry_delay)
                .or(cluster.max_retry_delay())
                .unwrap_or(DEFAULT_MAX_RETRY_DELAY),
            retry_writes: overrides
                .retry_writes
                .or(env.retry_writes)
                .unwrap_or(cluster.retry_writes() || DEFAULT_RETRY_WRITES),
        };
        validate_merged(&resolved)?;
        Ok(resolved)
    }

    fn env_string(&self, name: &str) -> Option<String> {
        self.env_var(name).map(str::to_string)
    }

    fn env_bool(&self, name: &str) -> Option<bool> {
        self.env_var(name).map(|value| {
            matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "true" | "1" | "yes"
            )
        })
    }

    fn env_integer(&self, key: &str, name: &str) -> ConfigResult<Option<u64>> {
        let Some(raw) = self.env_var(name) else {
            return Ok(None);
        };
        if !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid_integer(key, name, raw));
        }
        raw.parse::<u64>()
            .map(Some)
            .map_err(|_| invalid_integer(key, name, raw))
    }
}

fn invalid_integer(key: &str, name: &str, raw: &str) -> ConfigError {
    ConfigError::Invalid(format!(
        "invalid {} from environment variable {}: expected a non-negative integer, got '{}'",
        key, name, raw
    ))
}

pub(crate) fn no_context_selected() -> ConfigError {
    ConfigError::Invalid(format!(
        "no context selected: set current-context in the config file, {} or --context",
        ENV_CONTEXT
    ))
}

/// Environment token pair, then environment username/password pair, then
/// the user's token, then the user's password.
fn resolve_credentials(env: &EnvSettings, user: &User) -> ConfigResult<Credentials> {
    if let (Some(token_id), Some(token_secret)) = (&env.token_id, &env.token_secret) {
        return Ok(Credentials::Token {
            token_id: token_id.clone(),
            token_secret: ProxmoxSecret::new(token_secret.clone()),
        });
    }
    if let (Some(username), Some(password)) = (&env.username, &env.password) {
        return Ok(Credentials::Password {
            username: username.clone(),
            password: ProxmoxSecret::new(password.clone()),
        });
    }
    if let (Some(token_id), Some(token_secret)) = (user.token_id(), user.token_secret()) {
        if !token_id.is_empty() && !token_secret.is_empty() {
            return Ok(Credentials::Token {
                token_id: token_id.to_string(),
                token_secret: token_secret.clone(),
            });
        }
    }
    if let (Some(username), Some(password)) = (user.username(), user.password()) {
        if !username.is_empty() && !password.is_empty() {
            return Ok(Credentials::Password {
                username: username.to_string(),
                password: password.clone(),
            });
        }
    }
    Err(ConfigError::MissingCredentials(format!(
        "user '{}' has neither token-id/token-secret nor username/password, and {}/{} or {}/{} are not set",
        user.name(),
        ENV_TOKEN_ID,
        ENV_TOKEN_SECRET,
        ENV_USER,
        ENV_PASSWORD
    )))
}

fn validate_merged(config: &ResolvedConfig) -> ConfigResult<()> {
    let invalid = |message: String| {
        ConfigError::Invalid(format!("context '{}': {}", config.context_name, message))
    };
    if config.server.trim().is_empty() {
        return Err(invalid("server is empty".to_string()));
    }
    for (key, value) in [
        ("timeout", config.timeout),
        ("retry-delay", config.retry_delay),
        ("max-retry-delay", config.max_retry_delay),
    ] {
        if value == 0 {
            return Err(invalid(format!("{} must be a positive integer", key)));
        }
    }
    if config.max_retry_delay < config.retry_delay {
        return Err(invalid(format!(
            "max-retry-delay ({}) must be greater than or equal to retry-delay ({})",
            config.max_retry_delay, config.retry_delay
        )));
    }
    Ok(())
}
