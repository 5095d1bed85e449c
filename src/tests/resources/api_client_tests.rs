use crate::ProxmoxError;
use crate::core::infrastructure::api_client::RetryPolicy;
use crate::tests::support::{
    TOKEN_ID, TOKEN_SECRET, data, fresh_ticket, no_backoff, password_client, token_client,
};
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path},
};

async fn mount_login(server: &MockServer, ticket: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/api2/json/access/ticket"))
        .respond_with(data(json!({
            "ticket": ticket,
            "CSRFPreventionToken": "65F0A1B2:csrf",
            "username": "root@pam"
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_token_sent_with_every_request() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api2/json/version"))
        .and(header(
            "Authorization",
            format!("PVEAPIToken={}={}", TOKEN_ID, TOKEN_SECRET).as_str(),
        ))
        .respond_with(data(json!({ "version": "8.2.4" })))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = token_client(&mock_server, RetryPolicy::none());
    for _ in 0..2 {
        let version: Value = client.get("version").await.unwrap();
        assert_eq!(version["version"], "8.2.4");
    }
    assert!(client.is_authenticated().await);
}

#[tokio::test]
async fn test_password_login_once_and_ticket_reused() {
    let mock_server = MockServer::start().await;
    let ticket = fresh_ticket("root@pam");
    mount_login(&mock_server, &ticket, 1).await;
    Mock::given(method("GET"))
        .and(path("/api2/json/version"))
        .and(header("Cookie", format!("PVEAuthCookie={}", ticket).as_str()))
        .and(header("CSRFPreventionToken", "65F0A1B2:csrf"))
        .respond_with(data(json!({ "version": "8.2.4" })))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = password_client(&mock_server, RetryPolicy::none());
    assert!(!client.is_authenticated().await);
    let _: Value = client.get("version").await.unwrap();
    let _: Value = client.get("version").await.unwrap();
    assert!(client.is_authenticated().await);
}

#[tokio::test]
async fn test_unauthorized_refreshes_ticket_and_replays_once() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server, &fresh_ticket("root@pam"), 2).await;
    Mock::given(method("GET"))
        .and(path("/api2/json/version"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api2/json/version"))
        .respond_with(data(json!({ "version": "8.2.4" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = password_client(&mock_server, RetryPolicy::none());
    let version: Value = client.get("version").await.unwrap();
    assert_eq!(version["version"], "8.2.4");
}

#[tokio::test]
async fn test_unauthorized_token_is_authentication_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api2/json/version"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = token_client(&mock_server, no_backoff(3, false));
    let result: Result<Value, _> = client.get("version").await;
    assert!(matches!(result, Err(ProxmoxError::Authentication(_))));
}

#[tokio::test]
async fn test_get_retried_on_server_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api2/json/cluster/resources"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api2/json/cluster/resources"))
        .respond_with(data(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = token_client(&mock_server, no_backoff(2, false));
    let resources: Vec<Value> = client.get("cluster/resources").await.unwrap();
    assert!(resources.is_empty());
}

#[tokio::test]
async fn test_retries_exhausted_returns_last_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api2/json/version"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = token_client(&mock_server, no_backoff(2, false));
    let result: Result<Value, _> = client.get("version").await;
    match result {
        Err(ProxmoxError::Api { status, message }) => {
            assert_eq!(status, 502);
            assert_eq!(message, "bad gateway");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api2/json/nodes/pve1/qemu/100/snapshot"))
        .respond_with(ResponseTemplate::new(400).set_body_string("parameter verification failed"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = token_client(&mock_server, no_backoff(3, true));
    let result: Result<Value, _> = client.get("nodes/pve1/qemu/100/snapshot").await;
    assert!(matches!(result, Err(ProxmoxError::Api { status: 400, .. })));
}

#[tokio::test]
async fn test_writes_not_retried_by_default() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api2/json/nodes/pve1/qemu/100/status/start"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = token_client(&mock_server, no_backoff(3, false));
    let result: Result<Option<String>, _> = client
        .post("nodes/pve1/qemu/100/status/start", &json!({}))
        .await;
    assert!(matches!(result, Err(ProxmoxError::Api { status: 500, .. })));
}

#[tokio::test]
async fn test_writes_retried_when_enabled() {
    let mock_server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api2/json/nodes/pve1/qemu/100/snapshot/old"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = token_client(&mock_server, no_backoff(2, true));
    let result: Result<Option<String>, _> =
        client.delete("nodes/pve1/qemu/100/snapshot/old").await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_null_data_and_malformed_body() {
    let mock_server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api2/json/nodes/pve1/qemu/100/config"))
        .respond_with(data(Value::Null))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api2/json/version"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&mock_server)
        .await;

    let client = token_client(&mock_server, RetryPolicy::none());
    let upid: Option<String> = client
        .put("nodes/pve1/qemu/100/config", &json!({ "description": "x" }))
        .await
        .unwrap();
    assert!(upid.is_none());

    let result: Result<Value, _> = client.get("version").await;
    assert!(matches!(result, Err(ProxmoxError::Response(_))));
}
