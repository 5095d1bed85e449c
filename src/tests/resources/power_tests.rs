use crate::core::application::orchestration::ExecutionOptions;
use crate::core::domain::model::{
    operation_result::Dispatched,
    power_action::PowerAction,
    resource_ref::{ResourceKind, ResourceRef},
};
use crate::core::infrastructure::api_client::RetryPolicy;
use crate::guest::{
    application::request::power_options::PowerOptions,
    infrastructure::power_repository::{ApiPowerRepository, PowerRepository},
};
use crate::tests::support::{UPID, data, guest, mount_inventory, pvectl, token_client};
use crate::{Operation, ResultStatus};
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, method, path},
};

#[tokio::test]
async fn test_repository_posts_status_action() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api2/json/nodes/pve1/lxc/200/status/shutdown"))
        .and(body_json(json!({})))
        .respond_with(data(json!(UPID)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let repository = ApiPowerRepository::new(token_client(&mock_server, RetryPolicy::none()));
    let ct = ResourceRef::new(200, "pve1", ResourceKind::Lxc);
    assert_eq!(
        repository
            .change_state(&ct, PowerAction::Shutdown)
            .await
            .unwrap(),
        Dispatched::Task(UPID.to_string())
    );
}

#[tokio::test]
async fn test_start_only_touches_requested_kind() {
    let mock_server = MockServer::start().await;
    mount_inventory(
        &mock_server,
        vec![guest(100, "pve1", "qemu"), guest(200, "pve1", "lxc"), guest(101, "pve2", "qemu")],
    )
    .await;
    for (vmid, node) in [(100, "pve1"), (101, "pve2")] {
        Mock::given(method("POST"))
            .and(path(format!("/api2/json/nodes/{}/qemu/{}/status/start", node, vmid)))
            .respond_with(data(Value::Null))
            .expect(1)
            .mount(&mock_server)
            .await;
    }
    Mock::given(method("POST"))
        .and(path("/api2/json/nodes/pve1/lxc/200/status/start"))
        .respond_with(data(Value::Null))
        .expect(0)
        .mount(&mock_server)
        .await;

    let results = pvectl(&mock_server)
        .power()
        .start(ResourceKind::Qemu, &[], &PowerOptions::default())
        .await
        .unwrap();
    assert_eq!(
        results.iter().map(|r| r.resource.vmid).collect::<Vec<_>>(),
        vec![100, 101]
    );
    assert!(results.iter().all(|r| r.operation == Operation::Start));
    assert!(results.iter().all(|r| r.is_successful()));
}

#[tokio::test]
async fn test_one_failure_does_not_stop_the_rest() {
    let mock_server = MockServer::start().await;
    mount_inventory(&mock_server, vec![guest(100, "pve1", "qemu"), guest(101, "pve1", "qemu")])
        .await;
    Mock::given(method("POST"))
        .and(path("/api2/json/nodes/pve1/qemu/100/status/stop"))
        .respond_with(ResponseTemplate::new(500).set_body_string("VM 100 not running"))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api2/json/nodes/pve1/qemu/101/status/stop"))
        .respond_with(data(json!(UPID)))
        .mount(&mock_server)
        .await;

    let options = PowerOptions {
        execution: ExecutionOptions::asynchronous(),
        ..Default::default()
    };
    let results = pvectl(&mock_server)
        .power()
        .stop(ResourceKind::Qemu, &[100, 101], &options)
        .await
        .unwrap();
    assert_eq!(results.len(), 2);
    assert!(results[0].is_failed());
    assert!(results[0].error.as_deref().unwrap().contains("not running"));
    assert_eq!(results[1].status, ResultStatus::Pending);
}

#[tokio::test]
async fn test_fail_fast_stops_after_first_failure() {
    let mock_server = MockServer::start().await;
    mount_inventory(&mock_server, vec![guest(100, "pve1", "qemu"), guest(101, "pve1", "qemu")])
        .await;
    Mock::given(method("POST"))
        .and(path("/api2/json/nodes/pve1/qemu/100/status/reboot"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api2/json/nodes/pve1/qemu/101/status/reboot"))
        .respond_with(data(Value::Null))
        .expect(0)
        .mount(&mock_server)
        .await;

    let options = PowerOptions {
        execution: ExecutionOptions::default().with_fail_fast(true),
        ..Default::default()
    };
    let results = pvectl(&mock_server)
        .power()
        .reboot(ResourceKind::Qemu, &[], &options)
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].is_failed());
}
