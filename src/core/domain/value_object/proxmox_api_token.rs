use super::proxmox_secret::ProxmoxSecret;
use super::proxmox_username::validate_username;
use crate::core::domain::error::ValidationError;

/// A validated API token id in `user@realm!tokenname` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxmoxApiToken(String);

impl ProxmoxApiToken {
    /// Creates a new token id without validation.
    pub(crate) fn new_unchecked(token_id: String) -> Self {
        Self(token_id)
    }

    /// Returns the token id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The token name after the `!`.
    #[must_use]
    pub fn token_name(&self) -> &str {
        self.0.split_once('!').map_or("", |(_, name)| name)
    }

    /// Formats the `Authorization` header value for this token.
    #[must_use]
    pub fn authorization_header(&self, secret: &ProxmoxSecret) -> String {
        format!("PVEAPIToken={}={}", self.0, secret.expose())
    }
}

/// Validates an API token id.
pub(crate) fn validate_api_token(token_id: &str) -> Result<(), ValidationError> {
    if token_id.is_empty() {
        return Err(ValidationError::Field {
            field: "token-id".to_string(),
            message: "Token id cannot be empty".to_string(),
        });
    }
    let Some((userid, name)) = token_id.split_once('!') else {
        return Err(ValidationError::Format(format!(
            "Token id '{}' must be in user@realm!tokenname form",
            token_id
        )));
    };
    validate_username(userid)?;
    if name.is_empty() {
        return Err(ValidationError::Format(
            "Token name after '!' cannot be empty".to_string(),
        ));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(ValidationError::Format(format!(
            "Token name '{}' contains invalid characters",
            name
        )));
    }
    Ok(())
}
