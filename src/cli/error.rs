use crate::core::domain::error::{ConfigError, ProxmoxError, ValidationError};
use thiserror::Error;

/// Exit code for a malformed invocation.
pub const EXIT_USAGE: u8 = 2;
/// Exit code for everything else that went wrong.
pub const EXIT_FAILURE: u8 = 1;

/// Fatal errors of a `pvectl` invocation.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Proxmox(#[from] ProxmoxError),

    #[error("{0}")]
    Usage(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("Failed to render output: {0}")]
    Output(String),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::Proxmox(err.into())
    }
}

impl From<ValidationError> for CliError {
    fn from(err: ValidationError) -> Self {
        CliError::Proxmox(err.into())
    }
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Usage(_) => EXIT_USAGE,
            CliError::Proxmox(err) if err.is_usage_error() => EXIT_USAGE,
            _ => EXIT_FAILURE,
        }
    }
}
