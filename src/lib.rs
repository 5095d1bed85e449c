//! kubectl-style management of Proxmox VE clusters.
//!
//! Connection settings come from a kubeconfig-style file with named
//! clusters, users and contexts, layered under environment variables and
//! command-line overrides (see [`config`]). A [`ProxmoxClient`] built from
//! the resolved settings hands out the multi-guest services for snapshots
//! and power state.

pub mod auth;
pub mod cli;
pub mod config;
pub mod core;
pub mod guest;
pub mod snapshot;

pub use crate::core::domain::error::{
    ConfigError, ConfigResult, ProxmoxError, ProxmoxResult, TaskError, ValidationError,
};
pub use crate::core::domain::model::{
    Operation, OperationResult, ResolvedConfig, ResourceKind, ResourceRef, ResultStatus,
    SnapshotEntry, SnapshotRef,
};
use crate::{
    core::{
        domain::{
            model::proxmox_connection::{ConnectionCredentials, ProxmoxConnection},
            value_object::{
                ProxmoxApiToken, ProxmoxSecret, ProxmoxUrl, ProxmoxUsername, validate_api_token,
                validate_username,
            },
        },
        infrastructure::{
            api_client::{ApiClient, ClientConfig, RetryPolicy},
            resource_resolver::{ClusterResourceResolver, ResourceResolver},
            task_poller::{ApiTaskPoller, DEFAULT_POLL_INTERVAL, TaskPoller},
        },
    },
    guest::{
        application::service::power_service::PowerService,
        infrastructure::power_repository::ApiPowerRepository,
    },
    snapshot::{
        application::service::snapshot_service::SnapshotService,
        infrastructure::snapshot_repository::ApiSnapshotRepository,
    },
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Entry point to a Proxmox VE cluster.
///
/// # Examples
///
/// ```no_run
/// use pvectl::{ProxmoxClient, ProxmoxResult};
///
/// #[tokio::main]
/// async fn main() -> ProxmoxResult<()> {
///     let client = ProxmoxClient::builder()
///         .server("https://pve1.example.com:8006")?
///         .token("root@pam!automation", "11111111-2222-3333-4444-555555555555")?
///         .build()?;
///
///     let snapshots = client
///         .snapshots()
///         .list(&[100], &Default::default())
///         .await?;
///     println!("{} snapshots", snapshots.len());
///     Ok(())
/// }
/// ```
pub struct ProxmoxClient {
    api: Arc<ApiClient>,
    resolver: Arc<dyn ResourceResolver>,
    poller: Arc<dyn TaskPoller>,
}

/// Builder for [`ProxmoxClient`].
#[derive(Debug)]
pub struct ProxmoxClientBuilder {
    url: Option<ProxmoxUrl>,
    credentials: Option<ConnectionCredentials>,
    verify_ssl: bool,
    certificate_authority: Option<PathBuf>,
    timeout: Duration,
    retry: RetryPolicy,
    poll_interval: Duration,
}

impl Default for ProxmoxClientBuilder {
    fn default() -> Self {
        Self {
            url: None,
            credentials: None,
            verify_ssl: true,
            certificate_authority: None,
            timeout: Duration::from_secs(
                crate::core::domain::model::resolved_config::DEFAULT_TIMEOUT,
            ),
            retry: RetryPolicy::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl ProxmoxClientBuilder {
    pub fn server(mut self, server: &str) -> ProxmoxResult<Self> {
        self.url = Some(ProxmoxUrl::parse(server)?);
        Ok(self)
    }

    /// API token authentication, e.g. `root@pam!automation`.
    pub fn token(
        mut self,
        token_id: impl Into<String>,
        secret: impl Into<String>,
    ) -> ProxmoxResult<Self> {
        let token_id = token_id.into();
        validate_api_token(&token_id)?;
        self.credentials = Some(ConnectionCredentials::Token {
            token_id: ProxmoxApiToken::new_unchecked(token_id),
            secret: ProxmoxSecret::new(secret),
        });
        Ok(self)
    }

    /// Ticket authentication with `user@realm` and password.
    pub fn credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> ProxmoxResult<Self> {
        let username = username.into();
        validate_username(&username)?;
        self.credentials = Some(ConnectionCredentials::Password {
            username: ProxmoxUsername::new_unchecked(username),
            password: ProxmoxSecret::new(password),
        });
        Ok(self)
    }

    pub fn verify_ssl(mut self, verify_ssl: bool) -> Self {
        self.verify_ssl = verify_ssl;
        self
    }

    /// PEM file added as a trusted root.
    pub fn certificate_authority(mut self, path: impl Into<PathBuf>) -> Self {
        self.certificate_authority = Some(path.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// How often task status is polled while waiting.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn build(self) -> ProxmoxResult<ProxmoxClient> {
        let url = self.url.ok_or_else(|| ValidationError::Field {
            field: "server".to_string(),
            message: "Server is required".to_string(),
        })?;
        let credentials = self.credentials.ok_or_else(|| ValidationError::Field {
            field: "credentials".to_string(),
            message: "Either an API token or a username and password is required".to_string(),
        })?;
        let connection = ProxmoxConnection::new(
            url,
            credentials,
            self.verify_ssl,
            self.certificate_authority,
            self.timeout,
        );
        let config = ClientConfig {
            retry: self.retry,
            ..ClientConfig::default()
        };
        Ok(ProxmoxClient::with_api(
            ApiClient::new(connection, config)?,
            self.poll_interval,
        ))
    }
}

impl ProxmoxClient {
    pub fn builder() -> ProxmoxClientBuilder {
        ProxmoxClientBuilder::default()
    }

    /// Builds a client from fully merged settings.
    ///
    /// # Errors
    /// `ProxmoxError::Validation` if the server URL or credential identifier
    /// is malformed, `ProxmoxError::Connection` if the HTTP client cannot be
    /// set up.
    pub fn from_config(config: &ResolvedConfig) -> ProxmoxResult<Self> {
        let connection = ProxmoxConnection::from_resolved(config)?;
        let api = ApiClient::new(connection, ClientConfig::from_resolved(config))?;
        Ok(Self::with_api(api, DEFAULT_POLL_INTERVAL))
    }

    fn with_api(api: ApiClient, poll_interval: Duration) -> Self {
        let api = Arc::new(api);
        Self {
            resolver: Arc::new(ClusterResourceResolver::new(Arc::clone(&api))),
            poller: Arc::new(ApiTaskPoller::with_interval(
                Arc::clone(&api),
                poll_interval,
            )),
            api,
        }
    }

    /// Logs in with username and password now rather than on the first
    /// request. Does nothing for API tokens.
    pub async fn login(&self) -> ProxmoxResult<()> {
        self.api.login().await
    }

    pub async fn is_authenticated(&self) -> bool {
        self.api.is_authenticated().await
    }

    pub fn snapshots(&self) -> SnapshotService {
        SnapshotService::new(
            Arc::clone(&self.resolver),
            Arc::new(ApiSnapshotRepository::new(Arc::clone(&self.api))),
            Arc::clone(&self.poller),
        )
    }

    pub fn power(&self) -> PowerService {
        PowerService::new(
            Arc::clone(&self.resolver),
            Arc::new(ApiPowerRepository::new(Arc::clone(&self.api))),
            Arc::clone(&self.poller),
        )
    }
}

#[cfg(test)]
mod tests;
