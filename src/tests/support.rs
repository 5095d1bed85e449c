use crate::ProxmoxClient;
use crate::core::domain::model::proxmox_connection::{ConnectionCredentials, ProxmoxConnection};
use crate::core::domain::value_object::{
    ProxmoxApiToken, ProxmoxSecret, ProxmoxUrl, ProxmoxUsername,
};
use crate::core::infrastructure::api_client::{ApiClient, ClientConfig, RetryPolicy};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

pub(crate) const TOKEN_ID: &str = "root@pam!ci";
pub(crate) const TOKEN_SECRET: &str = "11111111-2222-3333-4444-555555555555";
pub(crate) const UPID: &str = "UPID:pve1:00001234:00005678:65F0A1B2:qmsnapshot:100:root@pam:";

/// Retries without sleeping between attempts.
pub(crate) fn no_backoff(retry_count: u32, retry_writes: bool) -> RetryPolicy {
    RetryPolicy {
        retry_count,
        base_delay: Duration::ZERO,
        max_delay: Duration::ZERO,
        retry_writes,
    }
}

fn connection(server: &MockServer, credentials: ConnectionCredentials) -> ProxmoxConnection {
    ProxmoxConnection::new(
        ProxmoxUrl::parse(&server.uri()).unwrap(),
        credentials,
        true,
        None,
        Duration::from_secs(5),
    )
}

pub(crate) fn token_client(server: &MockServer, retry: RetryPolicy) -> Arc<ApiClient> {
    let credentials = ConnectionCredentials::Token {
        token_id: ProxmoxApiToken::new_unchecked(TOKEN_ID.to_string()),
        secret: ProxmoxSecret::new(TOKEN_SECRET),
    };
    let config = ClientConfig {
        retry,
        ..ClientConfig::default()
    };
    Arc::new(ApiClient::new(connection(server, credentials), config).unwrap())
}

pub(crate) fn password_client(server: &MockServer, retry: RetryPolicy) -> Arc<ApiClient> {
    let credentials = ConnectionCredentials::Password {
        username: ProxmoxUsername::new_unchecked("root@pam".to_string()),
        password: ProxmoxSecret::new("hunter2"),
    };
    let config = ClientConfig {
        retry,
        ..ClientConfig::default()
    };
    Arc::new(ApiClient::new(connection(server, credentials), config).unwrap())
}

/// A ticket issued right now, so it is not treated as expired.
pub(crate) fn fresh_ticket(user: &str) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs();
    format!("PVE:{}:{:X}::c2lnbmF0dXJl", user, now)
}

/// A full client with a token, no retries and a fast poll interval.
pub(crate) fn pvectl(server: &MockServer) -> ProxmoxClient {
    ProxmoxClient::builder()
        .server(&server.uri())
        .unwrap()
        .token(TOKEN_ID, TOKEN_SECRET)
        .unwrap()
        .retry_policy(RetryPolicy::none())
        .poll_interval(Duration::from_millis(10))
        .build()
        .unwrap()
}

pub(crate) fn guest(vmid: u32, node: &str, kind: &str) -> Value {
    json!({
        "id": format!("{}/{}", kind, vmid),
        "type": kind,
        "vmid": vmid,
        "node": node,
        "name": format!("guest-{}", vmid),
        "status": "running",
        "template": 0
    })
}

/// Serves `GET /cluster/resources?type=vm`.
pub(crate) async fn mount_inventory(server: &MockServer, guests: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path("/api2/json/cluster/resources"))
        .and(query_param("type", "vm"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": guests })))
        .mount(server)
        .await;
}

pub(crate) fn data(value: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "data": value }))
}
