//! Snapshot endpoints of `/nodes/{node}/{qemu|lxc}/{vmid}/snapshot`.

use crate::core::domain::{
    error::ProxmoxResult,
    model::{
        operation_result::Dispatched,
        resource_ref::ResourceRef,
        snapshot::{CreateSnapshotRequest, Snapshot},
    },
};
use crate::core::infrastructure::api_client::ApiClient;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Raw listing, including the `current` pseudo entry.
    async fn list(&self, resource: &ResourceRef) -> ProxmoxResult<Vec<Snapshot>>;

    async fn create(
        &self,
        resource: &ResourceRef,
        request: &CreateSnapshotRequest,
    ) -> ProxmoxResult<Dispatched>;

    async fn delete(&self, resource: &ResourceRef, name: &str, force: bool)
    -> ProxmoxResult<Dispatched>;

    async fn rollback(
        &self,
        resource: &ResourceRef,
        name: &str,
        start: bool,
    ) -> ProxmoxResult<Dispatched>;
}

pub struct ApiSnapshotRepository {
    client: Arc<ApiClient>,
}

impl ApiSnapshotRepository {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    fn snapshots_path(resource: &ResourceRef) -> String {
        format!("{}/snapshot", resource.api_path())
    }
}

#[async_trait]
impl SnapshotRepository for ApiSnapshotRepository {
    async fn list(&self, resource: &ResourceRef) -> ProxmoxResult<Vec<Snapshot>> {
        debug!(%resource, "listing snapshots");
        self.client.get(&Self::snapshots_path(resource)).await
    }

    async fn create(
        &self,
        resource: &ResourceRef,
        request: &CreateSnapshotRequest,
    ) -> ProxmoxResult<Dispatched> {
        let upid: Option<String> = self
            .client
            .post(&Self::snapshots_path(resource), request)
            .await?;
        Ok(Dispatched::from_data(upid))
    }

    async fn delete(
        &self,
        resource: &ResourceRef,
        name: &str,
        force: bool,
    ) -> ProxmoxResult<Dispatched> {
        let mut path = format!("{}/{}", Self::snapshots_path(resource), name);
        if force {
            path.push_str("?force=1");
        }
        let upid: Option<String> = self.client.delete(&path).await?;
        Ok(Dispatched::from_data(upid))
    }

    async fn rollback(
        &self,
        resource: &ResourceRef,
        name: &str,
        start: bool,
    ) -> ProxmoxResult<Dispatched> {
        let path = format!("{}/{}/rollback", Self::snapshots_path(resource), name);
        let body = if start {
            json!({ "start": 1 })
        } else {
            json!({})
        };
        let upid: Option<String> = self.client.post(&path, &body).await?;
        Ok(Dispatched::from_data(upid))
    }
}
