use crate::core::domain::error::ValidationError;

/// A validated Proxmox user id in `user@realm` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxmoxUsername(String);

impl ProxmoxUsername {
    /// Creates a new username without validation.
    pub(crate) fn new_unchecked(username: String) -> Self {
        Self(username)
    }

    /// Returns the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part before the `@`.
    #[must_use]
    pub fn user(&self) -> &str {
        self.0.rsplit_once('@').map_or(&self.0, |(user, _)| user)
    }

    /// The authentication realm (`pam`, `pve`, an LDAP realm id, ...).
    #[must_use]
    pub fn realm(&self) -> &str {
        self.0.rsplit_once('@').map_or("", |(_, realm)| realm)
    }
}

/// Validates a `user@realm` id.
pub(crate) fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::Field {
            field: "username".to_string(),
            message: "Username cannot be empty".to_string(),
        });
    }
    if username.len() > 64 {
        return Err(ValidationError::Format(format!(
            "Username cannot exceed 64 characters (got {})",
            username.len()
        )));
    }
    let Some((user, realm)) = username.rsplit_once('@') else {
        return Err(ValidationError::Format(format!(
            "Username '{}' must include a realm, e.g. root@pam",
            username
        )));
    };
    if user.is_empty() || realm.is_empty() {
        return Err(ValidationError::Format(format!(
            "Username '{}' must be in user@realm form",
            username
        )));
    }
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@');
    if !user.chars().all(allowed) {
        return Err(ValidationError::Format(
            "Username contains invalid characters. Allowed: alphanumeric, -, _, ., @".to_string(),
        ));
    }
    let realm_allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '_');
    if !realm.chars().all(realm_allowed) {
        return Err(ValidationError::Format(format!(
            "Realm '{}' contains invalid characters",
            realm
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username_valid() {
        assert!(validate_username("root@pam").is_ok());
        assert!(validate_username("john.doe@pve").is_ok());
        assert!(validate_username("svc-backup@ldap-corp").is_ok());
        assert!(validate_username("alice@example.com@ad").is_ok());
    }

    #[test]
    fn test_validate_username_invalid() {
        assert!(validate_username("").is_err());
        assert!(validate_username("root").is_err()); // no realm
        assert!(validate_username("@pam").is_err());
        assert!(validate_username("root@").is_err());
        assert!(validate_username("user name@pam").is_err());
        assert!(validate_username("root@pa m").is_err());
        assert!(validate_username(&format!("{}@pam", "a".repeat(65))).is_err());
    }

    #[test]
    fn test_username_parts() {
        let username = ProxmoxUsername::new_unchecked("root@pam".to_string());
        assert_eq!(username.as_str(), "root@pam");
        assert_eq!(username.user(), "root");
        assert_eq!(username.realm(), "pam");
    }
}
