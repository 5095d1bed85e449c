use crate::core::application::orchestration::ExecutionOptions;
use crate::core::domain::{
    model::{operation_result::Dispatched, resource_ref::{ResourceKind, ResourceRef}},
    value_object::SnapshotName,
};
use crate::core::infrastructure::api_client::RetryPolicy;
use crate::snapshot::application::request::snapshot_options::{
    CreateSnapshotOptions, DeleteSnapshotOptions, ListSnapshotOptions, RollbackSnapshotOptions,
};
use crate::snapshot::infrastructure::snapshot_repository::{
    ApiSnapshotRepository, SnapshotRepository,
};
use crate::tests::support::{UPID, data, guest, mount_inventory, pvectl, token_client};
use crate::{Operation, ResultStatus};
use serde_json::{Value, json};
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, method, path, path_regex, query_param},
};

fn snapshot_list(names: &[&str]) -> Value {
    let mut snapshots: Vec<Value> = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            json!({
                "name": name,
                "description": format!("snapshot {}", name),
                "snaptime": 1_710_000_000 + i as i64,
                "vmstate": 0
            })
        })
        .collect();
    snapshots.push(json!({ "name": "current", "description": "You are here!", "running": 1 }));
    Value::Array(snapshots)
}

async fn mount_task_done(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/api2/json/nodes/[^/]+/tasks/.+/status$"))
        .respond_with(data(json!({ "status": "stopped", "exitstatus": "OK" })))
        .mount(mock_server)
        .await;
}

fn name(value: &str) -> SnapshotName {
    SnapshotName::parse(value).unwrap()
}

#[tokio::test]
async fn test_repository_paths() {
    let mock_server = MockServer::start().await;
    let repository = ApiSnapshotRepository::new(token_client(&mock_server, RetryPolicy::none()));
    let ct = ResourceRef::new(200, "pve2", ResourceKind::Lxc);

    Mock::given(method("DELETE"))
        .and(path("/api2/json/nodes/pve2/lxc/200/snapshot/old"))
        .and(query_param("force", "1"))
        .respond_with(data(json!(UPID)))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api2/json/nodes/pve2/lxc/200/snapshot/old/rollback"))
        .and(body_json(json!({ "start": 1 })))
        .respond_with(data(Value::Null))
        .expect(1)
        .mount(&mock_server)
        .await;

    assert_eq!(
        repository.delete(&ct, "old", true).await.unwrap(),
        Dispatched::Task(UPID.to_string())
    );
    assert_eq!(
        repository.rollback(&ct, "old", true).await.unwrap(),
        Dispatched::Completed
    );
}

#[tokio::test]
async fn test_list_excludes_current_and_skips_failing_guests() {
    let mock_server = MockServer::start().await;
    mount_inventory(
        &mock_server,
        vec![guest(100, "pve1", "qemu"), guest(101, "pve1", "qemu"), guest(200, "pve2", "lxc")],
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api2/json/nodes/pve1/qemu/100/snapshot"))
        .respond_with(data(snapshot_list(&["a", "b"])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api2/json/nodes/pve1/qemu/101/snapshot"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api2/json/nodes/pve2/lxc/200/snapshot"))
        .respond_with(data(snapshot_list(&["c"])))
        .mount(&mock_server)
        .await;

    let client = pvectl(&mock_server);
    let entries = client
        .snapshots()
        .list(&[], &ListSnapshotOptions::default())
        .await
        .unwrap();
    let names: Vec<(u32, &str)> = entries
        .iter()
        .map(|e| (e.vmid, e.snapshot.name.as_str()))
        .collect();
    assert_eq!(names, vec![(100, "a"), (100, "b"), (200, "c")]);
    assert_eq!(entries[2].kind, ResourceKind::Lxc);

    let described = client
        .snapshots()
        .describe(&[100, 200], &name("c"), &ListSnapshotOptions::default())
        .await
        .unwrap();
    assert_eq!(described.len(), 1);
    assert_eq!(described[0].node, "pve2");
}

#[tokio::test]
async fn test_create_sends_vmstate_only_for_vms_and_waits() {
    let mock_server = MockServer::start().await;
    mount_inventory(&mock_server, vec![guest(100, "pve1", "qemu"), guest(200, "pve1", "lxc")])
        .await;
    Mock::given(method("POST"))
        .and(path("/api2/json/nodes/pve1/qemu/100/snapshot"))
        .and(body_json(json!({
            "snapname": "before-upgrade",
            "description": "pre 8.2",
            "vmstate": 1
        })))
        .respond_with(data(json!(UPID)))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api2/json/nodes/pve1/lxc/200/snapshot"))
        .and(body_json(json!({
            "snapname": "before-upgrade",
            "description": "pre 8.2"
        })))
        .respond_with(data(json!(UPID.replace(":100:", ":200:"))))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_task_done(&mock_server).await;

    let options = CreateSnapshotOptions {
        description: Some("pre 8.2".to_string()),
        vmstate: true,
        execution: ExecutionOptions::sync(Duration::from_secs(5)),
        ..Default::default()
    };
    let results = pvectl(&mock_server)
        .snapshots()
        .create(&[100, 200], &name("before-upgrade"), &options)
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.is_successful()));
    assert!(results.iter().all(|r| r.operation == Operation::Create));
    assert!(results[0].task.is_some());
    assert_eq!(
        results[1].resource.snapshot.as_deref(),
        Some("before-upgrade")
    );
}

#[tokio::test]
async fn test_delete_async_reports_pending() {
    let mock_server = MockServer::start().await;
    mount_inventory(&mock_server, vec![guest(100, "pve1", "qemu")]).await;
    Mock::given(method("DELETE"))
        .and(path("/api2/json/nodes/pve1/qemu/100/snapshot/old"))
        .respond_with(data(json!(UPID)))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"/tasks/"))
        .respond_with(data(json!({ "status": "stopped", "exitstatus": "OK" })))
        .expect(0)
        .mount(&mock_server)
        .await;

    let options = DeleteSnapshotOptions {
        execution: ExecutionOptions::asynchronous(),
        ..Default::default()
    };
    let results = pvectl(&mock_server)
        .snapshots()
        .delete(&[100], &name("old"), &options)
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].status, ResultStatus::Pending);
    assert_eq!(results[0].task_upid.as_deref(), Some(UPID));
}

#[tokio::test]
async fn test_delete_with_node_filter_touches_only_that_node() {
    let mock_server = MockServer::start().await;
    mount_inventory(&mock_server, vec![guest(100, "pve1", "qemu"), guest(101, "pve2", "qemu")])
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api2/json/nodes/pve1/qemu/100/snapshot/old"))
        .respond_with(data(Value::Null))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api2/json/nodes/pve2/qemu/101/snapshot/old"))
        .respond_with(data(Value::Null))
        .expect(0)
        .mount(&mock_server)
        .await;

    let options = DeleteSnapshotOptions {
        node: Some("pve1".to_string()),
        ..Default::default()
    };
    let results = pvectl(&mock_server)
        .snapshots()
        .delete(&[100, 101], &name("old"), &options)
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].resource.resource.vmid, 100);
    assert!(results[0].is_successful());
}

#[tokio::test]
async fn test_failed_task_becomes_failed_result() {
    let mock_server = MockServer::start().await;
    mount_inventory(&mock_server, vec![guest(100, "pve1", "qemu")]).await;
    Mock::given(method("POST"))
        .and(path("/api2/json/nodes/pve1/qemu/100/snapshot/old/rollback"))
        .and(body_json(json!({})))
        .respond_with(data(json!(UPID)))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"/tasks/.+/status$"))
        .respond_with(data(json!({
            "status": "stopped",
            "exitstatus": "VM is locked (backup)"
        })))
        .mount(&mock_server)
        .await;

    let results = pvectl(&mock_server)
        .snapshots()
        .rollback(100, &name("old"), &RollbackSnapshotOptions::default())
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].is_failed());
    assert_eq!(results[0].error.as_deref(), Some("VM is locked (backup)"));
}
