use crate::auth::application::{
    request::login_request::LoginRequest, response::login_response::LoginResponse,
};
use crate::core::domain::{
    error::{ProxmoxError, ProxmoxResult, ValidationError},
    model::proxmox_auth::ProxmoxAuth,
    value_object::{ProxmoxSecret, ProxmoxTicket, ProxmoxUrl, ProxmoxUsername, validate_ticket},
};

use reqwest::{
    Client, StatusCode,
    header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use tracing::debug;

const LOGIN_PATH: &str = "access/ticket";

/// Exchanges a username and password for a ticket and CSRF token.
pub struct LoginService {
    default_headers: HeaderMap,
}

impl LoginService {
    pub fn new() -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Self { default_headers }
    }

    pub async fn execute(
        &self,
        http_client: &Client,
        url: &ProxmoxUrl,
        username: &ProxmoxUsername,
        password: &ProxmoxSecret,
    ) -> ProxmoxResult<ProxmoxAuth> {
        let endpoint = url.endpoint(LOGIN_PATH);
        let request = LoginRequest {
            username: username.as_str().to_string(),
            password: password.expose().to_string(),
        };
        debug!(username = username.as_str(), "logging in");
        let response = self.send_request(http_client, &endpoint, &request).await?;

        match response.status() {
            StatusCode::OK => self.handle_successful_login(response).await,
            StatusCode::UNAUTHORIZED => Err(ProxmoxError::Authentication(
                "Invalid credentials provided".to_string(),
            )),
            StatusCode::BAD_REQUEST => Err(ProxmoxError::Validation(ValidationError::Field {
                field: "request".to_string(),
                message: "Invalid request format".to_string(),
            })),
            StatusCode::NOT_FOUND => Err(ProxmoxError::Connection(
                "Login endpoint not found".to_string(),
            )),
            StatusCode::SERVICE_UNAVAILABLE => Err(ProxmoxError::Connection(
                "Proxmox service is currently unavailable".to_string(),
            )),
            status => Err(ProxmoxError::Api {
                status: status.as_u16(),
                message: format!("Unexpected response status on login: {}", status),
            }),
        }
    }

    async fn send_request(
        &self,
        client: &Client,
        url: &str,
        request: &LoginRequest,
    ) -> ProxmoxResult<reqwest::Response> {
        client
            .post(url)
            .headers(self.default_headers.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| ProxmoxError::Connection(e.to_string()))
    }

    async fn handle_successful_login(
        &self,
        response: reqwest::Response,
    ) -> ProxmoxResult<ProxmoxAuth> {
        let login_response = response.json::<LoginResponse>().await.map_err(|e| {
            ProxmoxError::Response(format!("Failed to parse login response: {}", e))
        })?;

        validate_ticket(&login_response.data.ticket)?;
        let ticket = ProxmoxTicket::new_unchecked(login_response.data.ticket);
        Ok(ProxmoxAuth::new(ticket, login_response.data.csrf_token))
    }
}

impl Default for LoginService {
    fn default() -> Self {
        Self::new()
    }
}
