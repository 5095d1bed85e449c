use crate::core::domain::error::TaskError;

/// A Proxmox task id, e.g. `UPID:pve1:0000A1B2:0012C3D4:65F0A1B2:qmsnapshot:100:root@pam:`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxmoxUpid(String);

impl ProxmoxUpid {
    /// Parses and validates a UPID string.
    pub fn parse(upid: &str) -> Result<Self, TaskError> {
        validate_upid(upid)?;
        Ok(Self(upid.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The node that runs the task.
    #[must_use]
    pub fn node(&self) -> &str {
        self.0.split(':').nth(1).unwrap_or_default()
    }

    /// The task type, e.g. `qmsnapshot` or `qmstart`.
    #[must_use]
    pub fn task_type(&self) -> Option<&str> {
        self.0.split(':').nth(5).filter(|s| !s.is_empty())
    }
}

pub(crate) fn validate_upid(upid: &str) -> Result<(), TaskError> {
    let parts: Vec<&str> = upid.split(':').collect();
    if parts.len() < 3 || parts[0] != "UPID" || parts[1].is_empty() {
        return Err(TaskError::InvalidUpid(upid.to_string()));
    }
    Ok(())
}
