use crate::core::domain::error::ValidationError;

/// Name Proxmox uses for the live state in a snapshot listing.
pub const CURRENT_SNAPSHOT: &str = "current";

/// A validated snapshot name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotName(String);

impl SnapshotName {
    pub fn parse(name: &str) -> Result<Self, ValidationError> {
        validate_snapshot_name(name)?;
        Ok(Self(name.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Proxmox snapshot names start with a letter, contain only letters, digits,
/// `-` and `_`, and are at most 40 characters long.
pub(crate) fn validate_snapshot_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::Field {
            field: "name".to_string(),
            message: "Snapshot name cannot be empty".to_string(),
        });
    }
    if name == CURRENT_SNAPSHOT {
        return Err(ValidationError::ConstraintViolation(format!(
            "'{}' is reserved for the live state",
            CURRENT_SNAPSHOT
        )));
    }
    if name.len() > 40 {
        return Err(ValidationError::Format(
            "Snapshot name cannot exceed 40 characters".to_string(),
        ));
    }
    if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Err(ValidationError::Format(
            "Snapshot name must start with a letter".to_string(),
        ));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::Format(
            "Snapshot name may only contain letters, digits, '-' and '_'".to_string(),
        ));
    }
    Ok(())
}
