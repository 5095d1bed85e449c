use crate::core::domain::error::ValidationError;
use url::Url;

const MAX_URL_LENGTH: usize = 2083; // RFC 7230 practical limit
const API_ROOT: &str = "api2/json";

/// A validated Proxmox server URL (scheme, host and optional port).
///
/// The URL always refers to the server root; API paths are composed with
/// [`ProxmoxUrl::endpoint`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxmoxUrl(Url);

impl ProxmoxUrl {
    /// Creates a new URL without validation.
    pub(crate) fn new_unchecked(url: Url) -> Self {
        Self(url)
    }

    /// Validates and parses a server URL.
    pub fn parse(server: &str) -> Result<Self, ValidationError> {
        validate_url(server)?;
        let mut url = Url::parse(server)
            .map_err(|e| ValidationError::Format(format!("Invalid URL format: {}", e)))?;
        url.set_path("/");
        url.set_query(None);
        Ok(Self::new_unchecked(url))
    }

    /// Returns the URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the host part of the URL.
    #[must_use]
    pub fn host(&self) -> &str {
        self.0.host_str().unwrap_or_default()
    }

    /// Builds the full URL of an API endpoint, e.g. `nodes/pve1/qemu`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.0.as_str().trim_end_matches('/'),
            API_ROOT,
            path.trim_start_matches('/')
        )
    }
}

/// Validates a server URL.
///
/// Accepts `http`/`https` URLs with a host. The path must be empty, `/` or
/// the API root `/api2/json`.
pub(crate) fn validate_url(server: &str) -> Result<(), ValidationError> {
    if server.is_empty() {
        return Err(ValidationError::Field {
            field: "server".to_string(),
            message: "Server URL cannot be empty".to_string(),
        });
    }
    if server.len() > MAX_URL_LENGTH {
        return Err(ValidationError::Format(format!(
            "URL exceeds maximum length of {} characters",
            MAX_URL_LENGTH
        )));
    }

    let url = Url::parse(server)
        .map_err(|e| ValidationError::Format(format!("Invalid URL format: {}", e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ValidationError::ConstraintViolation(format!(
            "Invalid scheme '{}'. Must be one of: https, http",
            url.scheme()
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ValidationError::Field {
            field: "server".to_string(),
            message: "Server URL must contain a host".to_string(),
        });
    }

    let path = url.path().trim_end_matches('/');
    if !path.is_empty() && path != "/api2/json" {
        return Err(ValidationError::ConstraintViolation(format!(
            "Invalid API path '{}'. Use the server root, e.g. https://pve.example.com:8006",
            url.path()
        )));
    }

    Ok(())
}
