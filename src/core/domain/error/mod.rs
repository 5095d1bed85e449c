use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// The main error type for pvectl operations.
///
/// This enum represents all possible errors that can occur while talking to
/// a Proxmox VE cluster, including connection, authentication, validation,
/// configuration and task failures.
#[derive(Error, Debug)]
pub enum ProxmoxError {
    /// Represents errors that occur during connection attempts
    ///
    /// # Fields
    /// * `0` - A description of what went wrong during the connection attempt
    #[error("Connection error: {0}")]
    Connection(String),

    /// Represents authentication failures
    ///
    /// # Fields
    /// * `0` - A description of the authentication failure
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The API answered with a non-success HTTP status
    ///
    /// # Fields
    /// * `status` - The HTTP status code
    /// * `message` - The response body, or a short description
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body could not be decoded
    #[error("Invalid response: {0}")]
    Response(String),

    /// Represents validation failures of user-supplied values
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration could not be loaded, resolved or persisted
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Waiting on an asynchronous Proxmox task failed
    #[error("Task error: {0}")]
    Task(#[from] TaskError),
}

/// Specialized error type for validation failures.
///
/// This enum provides detailed context about why a validation
/// failed, including field-specific errors and format violations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Represents a validation failure for a specific field
    ///
    /// # Fields
    /// * `field` - The name of the field that failed validation
    /// * `message` - A detailed message about why validation failed
    #[error("Field '{field}' validation failed: {message}")]
    Field { field: String, message: String },

    /// Represents format/syntax validation failures
    ///
    /// # Fields
    /// * `0` - Description of the format violation
    #[error("Format error: {0}")]
    Format(String),

    /// Represents violations of domain constraints
    ///
    /// # Fields
    /// * `0` - Description of the constraint violation
    #[error("Domain constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Errors raised while loading, resolving or writing the configuration file.
///
/// Every "not found" variant carries the names that *were* found so the
/// message can point the user at a typo.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Context '{name}' not found (available contexts: {})", list_or_none(available))]
    ContextNotFound {
        name: String,
        available: Vec<String>,
    },

    #[error("Cluster '{name}' not found (available clusters: {})", list_or_none(available))]
    ClusterNotFound {
        name: String,
        available: Vec<String>,
    },

    #[error("User '{name}' not found (available users: {})", list_or_none(available))]
    UserNotFound {
        name: String,
        available: Vec<String>,
    },

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("Configuration not loaded")]
    NotLoaded,

    #[error("Failed to access configuration file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ProxmoxError {
    /// Transient failures worth another attempt: transport errors, server
    /// errors and rate limiting.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProxmoxError::Connection(_) => true,
            ProxmoxError::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Usage problems: malformed input rather than a failed operation.
    pub fn is_usage_error(&self) -> bool {
        matches!(self, ProxmoxError::Validation(_))
    }
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.into(),
            source,
        }
    }
}

fn list_or_none(names: &[String]) -> String {
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}

/// Errors raised while waiting for a Proxmox task.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TaskError {
    #[error("timed out after {}s waiting for task {upid}", timeout.as_secs())]
    Timeout { upid: String, timeout: Duration },

    #[error("invalid UPID '{0}'")]
    InvalidUpid(String),
}

/// Type alias for Results that may fail with a ProxmoxError
pub type ProxmoxResult<T> = Result<T, ProxmoxError>;

/// Type alias for Results of configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
