//! The fully merged connection settings for one invocation.

use crate::core::domain::value_object::ProxmoxSecret;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: u64 = 30;
pub const DEFAULT_RETRY_COUNT: u32 = 3;
pub const DEFAULT_RETRY_DELAY: u64 = 1;
pub const DEFAULT_MAX_RETRY_DELAY: u64 = 30;
pub const DEFAULT_RETRY_WRITES: bool = false;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthType {
    Token,
    Password,
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthType::Token => f.write_str("token"),
            AuthType::Password => f.write_str("password"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Token {
        token_id: String,
        token_secret: ProxmoxSecret,
    },
    Password {
        username: String,
        password: ProxmoxSecret,
    },
}

impl Credentials {
    pub fn auth_type(&self) -> AuthType {
        match self {
            Credentials::Token { .. } => AuthType::Token,
            Credentials::Password { .. } => AuthType::Password,
        }
    }
}

/// Flattened projection of context, cluster, user, environment and CLI
/// overrides. Holds no reference back to its sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub(crate) context_name: String,
    pub(crate) server: String,
    pub(crate) verify_ssl: bool,
    pub(crate) certificate_authority: Option<String>,
    pub(crate) credentials: Credentials,
    pub(crate) default_node: Option<String>,
    pub(crate) timeout: u64,
    pub(crate) retry_count: u32,
    pub(crate) retry_delay: u64,
    pub(crate) max_retry_delay: u64,
    pub(crate) retry_writes: bool,
}

impl ResolvedConfig {
    /// Settings for a server with every tunable at its default.
    pub(crate) fn new(
        context_name: impl Into<String>,
        server: impl Into<String>,
        credentials: Credentials,
    ) -> Self {
        Self {
            context_name: context_name.into(),
            server: server.into(),
            verify_ssl: true,
            certificate_authority: None,
            credentials,
            default_node: None,
            timeout: DEFAULT_TIMEOUT,
            retry_count: DEFAULT_RETRY_COUNT,
            retry_delay: DEFAULT_RETRY_DELAY,
            max_retry_delay: DEFAULT_MAX_RETRY_DELAY,
            retry_writes: DEFAULT_RETRY_WRITES,
        }
    }

    pub fn context_name(&self) -> &str {
        &self.context_name
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn verify_ssl(&self) -> bool {
        self.verify_ssl
    }

    pub fn certificate_authority(&self) -> Option<&str> {
        self.certificate_authority.as_deref()
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn auth_type(&self) -> AuthType {
        self.credentials.auth_type()
    }

    pub fn is_token_auth(&self) -> bool {
        self.auth_type() == AuthType::Token
    }

    pub fn is_password_auth(&self) -> bool {
        self.auth_type() == AuthType::Password
    }

    pub fn token_id(&self) -> Option<&str> {
        match &self.credentials {
            Credentials::Token { token_id, .. } => Some(token_id),
            Credentials::Password { .. } => None,
        }
    }

    pub fn username(&self) -> Option<&str> {
        match &self.credentials {
            Credentials::Password { username, .. } => Some(username),
            Credentials::Token { .. } => None,
        }
    }

    pub fn default_node(&self) -> Option<&str> {
        self.default_node.as_deref()
    }

    /// Request timeout in seconds.
    pub fn timeout(&self) -> u64 {
        self.timeout
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Base retry delay in seconds.
    pub fn retry_delay(&self) -> u64 {
        self.retry_delay
    }

    /// Maximum retry delay in seconds.
    pub fn max_retry_delay(&self) -> u64 {
        self.max_retry_delay
    }

    pub fn retry_writes(&self) -> bool {
        self.retry_writes
    }

    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}
