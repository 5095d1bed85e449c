//! Validated connection parameters for the API client.

use super::resolved_config::{Credentials, ResolvedConfig};
use crate::core::domain::{
    error::ProxmoxResult,
    value_object::{
        ProxmoxApiToken, ProxmoxSecret, ProxmoxUrl, ProxmoxUsername, validate_api_token,
        validate_username,
    },
};
use std::path::PathBuf;
use std::time::Duration;

/// How requests are authenticated.
#[derive(Debug, Clone)]
pub enum ConnectionCredentials {
    /// Stateless API token sent with every request.
    Token {
        token_id: ProxmoxApiToken,
        secret: ProxmoxSecret,
    },
    /// Username and password exchanged for a ticket.
    Password {
        username: ProxmoxUsername,
        password: ProxmoxSecret,
    },
}

#[derive(Debug, Clone)]
pub struct ProxmoxConnection {
    url: ProxmoxUrl,
    credentials: ConnectionCredentials,
    verify_ssl: bool,
    certificate_authority: Option<PathBuf>,
    timeout: Duration,
}

impl ProxmoxConnection {
    pub fn new(
        url: ProxmoxUrl,
        credentials: ConnectionCredentials,
        verify_ssl: bool,
        certificate_authority: Option<PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            url,
            credentials,
            verify_ssl,
            certificate_authority,
            timeout,
        }
    }

    /// Validates the server URL and credential identifiers of a resolved
    /// configuration.
    pub fn from_resolved(config: &ResolvedConfig) -> ProxmoxResult<Self> {
        let url = ProxmoxUrl::parse(config.server())?;
        let credentials = match config.credentials() {
            Credentials::Token {
                token_id,
                token_secret,
            } => {
                validate_api_token(token_id)?;
                ConnectionCredentials::Token {
                    token_id: ProxmoxApiToken::new_unchecked(token_id.clone()),
                    secret: token_secret.clone(),
                }
            }
            Credentials::Password { username, password } => {
                validate_username(username)?;
                ConnectionCredentials::Password {
                    username: ProxmoxUsername::new_unchecked(username.clone()),
                    password: password.clone(),
                }
            }
        };
        Ok(Self::new(
            url,
            credentials,
            config.verify_ssl(),
            config.certificate_authority().map(PathBuf::from),
            config.timeout_duration(),
        ))
    }

    pub fn url(&self) -> &ProxmoxUrl {
        &self.url
    }

    pub fn credentials(&self) -> &ConnectionCredentials {
        &self.credentials
    }

    pub fn verify_ssl(&self) -> bool {
        self.verify_ssl
    }

    pub fn accepts_invalid_certs(&self) -> bool {
        !self.verify_ssl
    }

    pub fn certificate_authority(&self) -> Option<&PathBuf> {
        self.certificate_authority.as_ref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::error::{ProxmoxError, ValidationError};

    fn token_config(server: &str, token_id: &str) -> ResolvedConfig {
        ResolvedConfig::new(
            "prod",
            server,
            Credentials::Token {
                token_id: token_id.to_string(),
                token_secret: ProxmoxSecret::new("secret"),
            },
        )
    }

    #[test]
    fn test_from_resolved_token() {
        let mut config = token_config("https://pve1.example.com:8006", "root@pam!ci");
        config.verify_ssl = false;
        config.timeout = 5;
        let connection = ProxmoxConnection::from_resolved(&config).unwrap();
        assert_eq!(connection.url().as_str(), "https://pve1.example.com:8006/");
        assert!(connection.accepts_invalid_certs());
        assert_eq!(connection.timeout(), Duration::from_secs(5));
        assert!(matches!(
            connection.credentials(),
            ConnectionCredentials::Token { token_id, .. } if token_id.token_name() == "ci"
        ));
    }

    #[test]
    fn test_from_resolved_password() {
        let config = ResolvedConfig::new(
            "lab",
            "https://10.0.0.5:8006",
            Credentials::Password {
                username: "admin@pve".to_string(),
                password: ProxmoxSecret::new("hunter2"),
            },
        );
        let connection = ProxmoxConnection::from_resolved(&config).unwrap();
        assert!(matches!(
            connection.credentials(),
            ConnectionCredentials::Password { username, .. } if username.realm() == "pve"
        ));
    }

    #[test]
    fn test_from_resolved_rejects_bad_values() {
        let config = token_config("ftp://pve1", "root@pam!ci");
        assert!(matches!(
            ProxmoxConnection::from_resolved(&config),
            Err(ProxmoxError::Validation(_))
        ));
        let config = token_config("https://pve1:8006", "root@pam");
        assert!(matches!(
            ProxmoxConnection::from_resolved(&config),
            Err(ProxmoxError::Validation(ValidationError::Format(_)))
        ));
    }
}
