//! Internal HTTP client that handles authentication, retries and the
//! Proxmox response envelope.

use crate::auth::application::service::login_service::LoginService;
use crate::core::domain::{
    error::{ProxmoxError, ProxmoxResult},
    model::{
        proxmox_auth::ProxmoxAuth,
        proxmox_connection::{ConnectionCredentials, ProxmoxConnection},
        resolved_config::{
            DEFAULT_MAX_RETRY_DELAY, DEFAULT_RETRY_COUNT, DEFAULT_RETRY_DELAY,
            DEFAULT_RETRY_WRITES, ResolvedConfig,
        },
    },
};
use reqwest::{Certificate, Client, Method, StatusCode, header::AUTHORIZATION};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Tickets are valid for two hours on the server side.
pub const DEFAULT_TICKET_LIFETIME: Duration = Duration::from_secs(2 * 60 * 60);

/// When and how often a failed request is attempted again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first one.
    pub retry_count: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Whether POST/PUT/DELETE are retried too.
    pub retry_writes: bool,
}

impl RetryPolicy {
    pub fn from_resolved(config: &ResolvedConfig) -> Self {
        Self {
            retry_count: config.retry_count(),
            base_delay: Duration::from_secs(config.retry_delay()),
            max_delay: Duration::from_secs(config.max_retry_delay()),
            retry_writes: config.retry_writes(),
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            retry_count: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (zero-based): the base delay
    /// doubled per attempt, capped at the maximum.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    fn allows(&self, method: &Method) -> bool {
        match *method {
            Method::GET | Method::HEAD => true,
            _ => self.retry_writes,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retry_count: DEFAULT_RETRY_COUNT,
            base_delay: Duration::from_secs(DEFAULT_RETRY_DELAY),
            max_delay: Duration::from_secs(DEFAULT_MAX_RETRY_DELAY),
            retry_writes: DEFAULT_RETRY_WRITES,
        }
    }
}

/// Client behaviour that is not part of the connection itself.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub ticket_lifetime: Duration,
    pub retry: RetryPolicy,
}

impl ClientConfig {
    pub fn from_resolved(config: &ResolvedConfig) -> Self {
        Self {
            retry: RetryPolicy::from_resolved(config),
            ..Self::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            ticket_lifetime: DEFAULT_TICKET_LIFETIME,
            retry: RetryPolicy::default(),
        }
    }
}

/// Every API answer is wrapped in `{"data": ...}`.
#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

/// Internal HTTP client that manages authentication and provides methods to call the Proxmox API.
///
/// Token connections send `Authorization: PVEAPIToken=...` with every request. Password
/// connections log in lazily and send the ticket as `PVEAuthCookie` together with the
/// `CSRFPreventionToken` header; if a request receives `401 Unauthorized` the ticket is
/// refreshed once and the request replayed.
#[derive(Debug)]
pub struct ApiClient {
    http_client: Client,
    connection: Arc<ProxmoxConnection>,
    auth: Arc<RwLock<Option<ProxmoxAuth>>>,
    config: Arc<ClientConfig>,
}

impl ApiClient {
    /// Creates a new `ApiClient`. The client starts unauthenticated.
    ///
    /// # Errors
    /// Returns `ProxmoxError::Connection` if the HTTP client cannot be built or the
    /// certificate authority file cannot be read.
    pub fn new(connection: ProxmoxConnection, config: ClientConfig) -> ProxmoxResult<Self> {
        let mut builder = Client::builder()
            .danger_accept_invalid_certs(connection.accepts_invalid_certs())
            .timeout(connection.timeout());

        if let Some(path) = connection.certificate_authority() {
            let pem = std::fs::read(path).map_err(|e| {
                ProxmoxError::Connection(format!(
                    "Failed to read certificate authority {}: {}",
                    path.display(),
                    e
                ))
            })?;
            let certificate = Certificate::from_pem(&pem)
                .map_err(|e| ProxmoxError::Connection(format!("Invalid certificate: {}", e)))?;
            builder = builder.add_root_certificate(certificate);
        }

        let http_client = builder
            .build()
            .map_err(|e| ProxmoxError::Connection(e.to_string()))?;

        Ok(Self {
            http_client,
            connection: Arc::new(connection),
            auth: Arc::new(RwLock::new(None)),
            config: Arc::new(config),
        })
    }

    /// Returns a reference to the underlying connection details.
    pub fn connection(&self) -> &ProxmoxConnection {
        &self.connection
    }

    /// Sets the authentication state (used after a successful login or session restore).
    pub async fn set_auth(&self, auth: ProxmoxAuth) {
        let mut lock = self.auth.write().await;
        *lock = Some(auth);
    }

    /// Returns the current authentication state, if any.
    pub async fn auth(&self) -> Option<ProxmoxAuth> {
        self.auth.read().await.clone()
    }

    /// Returns `true` for token connections, or if there is a non-expired ticket.
    pub async fn is_authenticated(&self) -> bool {
        if self.uses_token() {
            return true;
        }
        let lock = self.auth.read().await;
        lock.as_ref()
            .map(|a| !a.ticket().is_expired(self.config.ticket_lifetime))
            .unwrap_or(false)
    }

    /// Logs in right away instead of on the first request. No-op for token
    /// connections.
    pub async fn login(&self) -> ProxmoxResult<()> {
        self.refresh_auth().await
    }

    /// Performs an authenticated GET request and unwraps `data`.
    pub async fn get<T>(&self, path: &str) -> ProxmoxResult<T>
    where
        T: DeserializeOwned,
    {
        self.execute_request(Method::GET, path, None::<&()>).await
    }

    /// Performs an authenticated POST request with a JSON body.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> ProxmoxResult<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        self.execute_request(Method::POST, path, Some(body)).await
    }

    /// Performs an authenticated PUT request with a JSON body.
    pub async fn put<B, T>(&self, path: &str, body: &B) -> ProxmoxResult<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        self.execute_request(Method::PUT, path, Some(body)).await
    }

    /// Performs an authenticated DELETE request.
    pub async fn delete<T>(&self, path: &str) -> ProxmoxResult<T>
    where
        T: DeserializeOwned,
    {
        self.execute_request(Method::DELETE, path, None::<&()>)
            .await
    }

    /// Sends a request, retrying transient failures as the policy allows.
    async fn execute_request<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ProxmoxResult<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let url = self.connection.url().endpoint(path);
        let policy = &self.config.retry;
        let mut attempt = 0;

        loop {
            match self.send_authenticated(&method, &url, body).await {
                Ok(data) => return Ok(data),
                Err(err)
                    if attempt < policy.retry_count
                        && policy.allows(&method)
                        && err.is_retryable() =>
                {
                    let delay = policy.delay_for(attempt);
                    attempt += 1;
                    warn!(
                        %method,
                        path,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// One logical attempt: ensures a ticket, sends, and on 401 refreshes the
    /// ticket and replays exactly once.
    async fn send_authenticated<B, T>(
        &self,
        method: &Method,
        url: &str,
        body: Option<&B>,
    ) -> ProxmoxResult<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        self.ensure_authenticated().await?;
        let response = self.send(method, url, body).await?;

        if response.status() == StatusCode::UNAUTHORIZED && !self.uses_token() {
            debug!(url, "ticket rejected, logging in again");
            self.refresh_auth().await?;
            let response = self.send(method, url, body).await?;
            return Self::parse_response(response).await;
        }

        Self::parse_response(response).await
    }

    async fn send<B>(
        &self,
        method: &Method,
        url: &str,
        body: Option<&B>,
    ) -> ProxmoxResult<reqwest::Response>
    where
        B: Serialize,
    {
        debug!(%method, url, "sending request");
        let mut req_builder = self.http_client.request(method.clone(), url);

        match self.connection.credentials() {
            ConnectionCredentials::Token { token_id, secret } => {
                req_builder =
                    req_builder.header(AUTHORIZATION, token_id.authorization_header(secret));
            }
            ConnectionCredentials::Password { .. } => {
                let auth_guard = self.auth.read().await;
                if let Some(auth) = auth_guard.as_ref() {
                    req_builder = req_builder
                        .header("Cookie", auth.ticket().as_cookie_header())
                        .header("CSRFPreventionToken", auth.csrf_token());
                }
            }
        }

        if let Some(body) = body {
            req_builder = req_builder.json(body);
        }

        req_builder
            .send()
            .await
            .map_err(|e| ProxmoxError::Connection(format!("HTTP request failed: {}", e)))
    }

    async fn parse_response<T>(response: reqwest::Response) -> ProxmoxResult<T>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ProxmoxError::Authentication(
                "Request was rejected as unauthorized".to_string(),
            ));
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = if error_text.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            } else {
                error_text.trim().to_string()
            };
            return Err(ProxmoxError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<Envelope<T>>()
            .await
            .map(|envelope| envelope.data)
            .map_err(|e| ProxmoxError::Response(format!("Failed to parse response: {}", e)))
    }

    fn uses_token(&self) -> bool {
        matches!(
            self.connection.credentials(),
            ConnectionCredentials::Token { .. }
        )
    }

    /// Ensures that a password connection has a valid (non‑expired) ticket.
    async fn ensure_authenticated(&self) -> ProxmoxResult<()> {
        if self.uses_token() {
            return Ok(());
        }

        let need_refresh = {
            let auth_guard = self.auth.read().await;
            match auth_guard.as_ref() {
                Some(auth) => auth.ticket().is_expired(self.config.ticket_lifetime),
                None => true,
            }
        };

        if need_refresh {
            self.refresh_auth().await?;
        }
        Ok(())
    }

    /// Performs a fresh login using the stored credentials to obtain a new ticket.
    async fn refresh_auth(&self) -> ProxmoxResult<()> {
        let ConnectionCredentials::Password { username, password } =
            self.connection.credentials()
        else {
            return Ok(());
        };
        let auth = LoginService::new()
            .execute(&self.http_client, self.connection.url(), username, password)
            .await?;
        let mut lock = self.auth.write().await;
        *lock = Some(auth);
        Ok(())
    }
}
