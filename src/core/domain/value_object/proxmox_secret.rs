use std::fmt;

/// Fixed replacement shown wherever a secret is displayed.
pub const SECRET_MASK: &str = "********";

/// A password or API token secret.
///
/// `Debug` and `Display` never print the value; use [`ProxmoxSecret::expose`]
/// at the single point where it goes on the wire.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxmoxSecret(String);

impl ProxmoxSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Returns the secret in clear text.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ProxmoxSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ProxmoxSecret").field(&SECRET_MASK).finish()
    }
}

impl fmt::Display for ProxmoxSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(SECRET_MASK)
    }
}
