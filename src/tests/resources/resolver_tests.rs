use crate::core::domain::model::resource_ref::ResourceKind;
use crate::core::infrastructure::{
    api_client::RetryPolicy,
    resource_resolver::{ClusterResourceResolver, ResourceResolver},
};
use crate::tests::support::{guest, mount_inventory, token_client};
use serde_json::json;
use wiremock::MockServer;

async fn resolver(mock_server: &MockServer) -> ClusterResourceResolver {
    mount_inventory(
        mock_server,
        vec![
            guest(200, "pve2", "lxc"),
            json!({ "id": "storage/pve1/local", "type": "storage", "node": "pve1" }),
            guest(100, "pve1", "qemu"),
            json!({ "id": "node/pve1", "type": "node", "node": "pve1" }),
            guest(101, "pve1", "qemu"),
        ],
    )
    .await;
    ClusterResourceResolver::new(token_client(mock_server, RetryPolicy::none()))
}

#[tokio::test]
async fn test_resolve_all_keeps_guests_sorted_by_vmid() {
    let mock_server = MockServer::start().await;
    let resolver = resolver(&mock_server).await;

    let guests = resolver.resolve_all().await.unwrap();
    assert_eq!(
        guests.iter().map(|g| g.vmid).collect::<Vec<_>>(),
        vec![100, 101, 200]
    );
    assert_eq!(guests[2].kind, ResourceKind::Lxc);
    assert_eq!(guests[2].node, "pve2");
    assert_eq!(guests[0].name.as_deref(), Some("guest-100"));
}

#[tokio::test]
async fn test_resolve_multiple_keeps_request_order_and_skips_missing() {
    let mock_server = MockServer::start().await;
    let resolver = resolver(&mock_server).await;

    let guests = resolver.resolve_multiple(&[200, 999, 100]).await.unwrap();
    assert_eq!(
        guests.iter().map(|g| g.vmid).collect::<Vec<_>>(),
        vec![200, 100]
    );
    assert_eq!(guests[0].api_path(), "nodes/pve2/lxc/200");

    assert!(resolver.resolve_multiple(&[999]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_inventory_failure_is_an_error() {
    let mock_server = MockServer::start().await;
    let resolver = ClusterResourceResolver::new(token_client(&mock_server, RetryPolicy::none()));
    assert!(resolver.resolve_all().await.is_err());
}
