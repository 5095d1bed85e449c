//! Credentials for authenticating against a cluster.

use crate::core::domain::value_object::{ProxmoxSecret, SECRET_MASK};
use serde::{Deserialize, Serialize};

/// The raw `user` stanza. Either the token pair or the username/password
/// pair is expected; both may be present, in which case the token wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct UserSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// A `users[]` list entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NamedUser {
    pub name: String,
    pub user: UserSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    name: String,
    token_id: Option<String>,
    token_secret: Option<ProxmoxSecret>,
    username: Option<String>,
    password: Option<ProxmoxSecret>,
}

impl User {
    pub fn new(name: impl Into<String>, settings: UserSettings) -> Self {
        Self {
            name: name.into(),
            token_id: settings.token_id,
            token_secret: settings.token_secret.map(ProxmoxSecret::new),
            username: settings.username,
            password: settings.password.map(ProxmoxSecret::new),
        }
    }

    /// A user authenticating with an API token.
    pub fn with_token(
        name: impl Into<String>,
        token_id: impl Into<String>,
        token_secret: impl Into<String>,
    ) -> Self {
        Self::new(
            name,
            UserSettings {
                token_id: Some(token_id.into()),
                token_secret: Some(token_secret.into()),
                ..Default::default()
            },
        )
    }

    /// A user authenticating with username and password.
    pub fn with_password(
        name: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self::new(
            name,
            UserSettings {
                username: Some(username.into()),
                password: Some(password.into()),
                ..Default::default()
            },
        )
    }

    pub fn from_entry(entry: &NamedUser) -> Self {
        Self::new(entry.name.clone(), entry.user.clone())
    }

    #[must_use]
    pub fn to_entry(&self) -> NamedUser {
        NamedUser {
            name: self.name.clone(),
            user: UserSettings {
                token_id: self.token_id.clone(),
                token_secret: self.token_secret.as_ref().map(|s| s.expose().to_string()),
                username: self.username.clone(),
                password: self.password.as_ref().map(|s| s.expose().to_string()),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn token_id(&self) -> Option<&str> {
        self.token_id.as_deref()
    }

    pub fn token_secret(&self) -> Option<&ProxmoxSecret> {
        self.token_secret.as_ref()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn password(&self) -> Option<&ProxmoxSecret> {
        self.password.as_ref()
    }

    /// Both token id and secret are present and non-empty.
    pub fn is_token_auth(&self) -> bool {
        self.token_id.as_deref().is_some_and(|s| !s.is_empty())
            && self.token_secret.as_ref().is_some_and(|s| !s.is_empty())
    }

    /// Both username and password are present and non-empty.
    pub fn is_password_auth(&self) -> bool {
        self.username.as_deref().is_some_and(|s| !s.is_empty())
            && self.password.as_ref().is_some_and(|s| !s.is_empty())
    }

    pub fn is_valid(&self) -> bool {
        self.is_token_auth() || self.is_password_auth()
    }

    /// Returns a copy with every secret replaced by [`SECRET_MASK`].
    #[must_use]
    pub fn masked(&self) -> Self {
        let mask = |secret: &Option<ProxmoxSecret>| {
            secret.as_ref().map(|_| ProxmoxSecret::new(SECRET_MASK))
        };
        Self {
            name: self.name.clone(),
            token_id: self.token_id.clone(),
            token_secret: mask(&self.token_secret),
            username: self.username.clone(),
            password: mask(&self.password),
        }
    }
}
