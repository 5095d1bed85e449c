use crate::core::domain::error::ValidationError;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A Proxmox authentication ticket (`PVE:user@realm:HEXTIME::signature`).
#[derive(Debug, Clone)]
pub struct ProxmoxTicket {
    value: String,
    issued_at: SystemTime,
}

impl ProxmoxTicket {
    /// Creates a new ticket without validation.
    ///
    /// The issue time is taken from the hex timestamp embedded in the
    /// ticket, or from the local clock when it cannot be read.
    pub(crate) fn new_unchecked(value: String) -> Self {
        let issued_at = value
            .split(':')
            .nth(2)
            .and_then(|hex| u64::from_str_radix(hex, 16).ok())
            .map(|secs| UNIX_EPOCH + Duration::from_secs(secs))
            .unwrap_or_else(SystemTime::now);
        Self { value, issued_at }
    }

    /// Returns the ticket value as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Returns the `user@realm` the ticket was issued for.
    #[must_use]
    pub fn userid(&self) -> Option<&str> {
        self.value.split(':').nth(1)
    }

    /// Checks if the ticket is expired based on a given lifetime.
    #[must_use]
    pub fn is_expired(&self, lifetime: Duration) -> bool {
        self.issued_at
            .elapsed()
            .map(|age| age > lifetime)
            .unwrap_or(false)
    }

    /// Formats the ticket as a cookie header value.
    #[must_use]
    pub fn as_cookie_header(&self) -> String {
        format!("PVEAuthCookie={}", self.value)
    }
}

/// Validates the format of a ticket string.
pub(crate) fn validate_ticket(ticket: &str) -> Result<(), ValidationError> {
    if ticket.is_empty() {
        return Err(ValidationError::Field {
            field: "ticket".to_string(),
            message: "Ticket cannot be empty".to_string(),
        });
    }
    let parts: Vec<&str> = ticket.split(':').collect();
    if parts.len() < 5 || parts[0] != "PVE" {
        return Err(ValidationError::Format(
            "Invalid ticket format: must start with 'PVE:' and have at least 5 parts".to_string(),
        ));
    }
    Ok(())
}
