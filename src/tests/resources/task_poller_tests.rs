use crate::core::domain::{error::ProxmoxError, model::task::TaskStatus};
use crate::core::infrastructure::{
    api_client::RetryPolicy,
    task_poller::{ApiTaskPoller, TaskPoller},
};
use crate::tests::support::{UPID, data, token_client};
use serde_json::json;
use std::time::Duration;
use wiremock::{
    Mock, MockServer,
    matchers::{method, path_regex},
};

const STATUS_PATH: &str = r"^/api2/json/nodes/pve1/tasks/UPID.*/status$";

fn poller(mock_server: &MockServer) -> ApiTaskPoller {
    ApiTaskPoller::with_interval(
        token_client(mock_server, RetryPolicy::none()),
        Duration::from_millis(10),
    )
}

#[tokio::test]
async fn test_wait_polls_until_stopped() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(STATUS_PATH))
        .respond_with(data(json!({ "status": "running", "type": "qmsnapshot" })))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(STATUS_PATH))
        .respond_with(data(json!({
            "upid": UPID,
            "status": "stopped",
            "exitstatus": "OK",
            "node": "pve1",
            "type": "qmsnapshot"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let task = poller(&mock_server)
        .wait(UPID, Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(task.status, TaskStatus::Stopped);
    assert!(task.is_successful());
    assert_eq!(task.upid, UPID);
}

#[tokio::test]
async fn test_failed_task_is_returned_not_raised() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(STATUS_PATH))
        .respond_with(data(json!({
            "status": "stopped",
            "exitstatus": "snapshot feature is not available"
        })))
        .mount(&mock_server)
        .await;

    let task = poller(&mock_server)
        .wait(UPID, Duration::from_secs(5))
        .await
        .unwrap();
    assert!(task.is_failed());
    assert_eq!(task.upid, UPID);
}

#[tokio::test]
async fn test_wait_times_out() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(STATUS_PATH))
        .respond_with(data(json!({ "status": "running" })))
        .mount(&mock_server)
        .await;

    let err = poller(&mock_server)
        .wait(UPID, Duration::from_millis(100))
        .await
        .unwrap_err();
    assert!(matches!(err, ProxmoxError::Task(_)));
    assert!(err.to_string().contains("timed out"));
}

#[tokio::test]
async fn test_malformed_upid_is_rejected_without_request() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(STATUS_PATH))
        .respond_with(data(json!({ "status": "stopped", "exitstatus": "OK" })))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result = poller(&mock_server)
        .wait("not-a-upid", Duration::from_secs(1))
        .await;
    assert!(result.is_err());
}
