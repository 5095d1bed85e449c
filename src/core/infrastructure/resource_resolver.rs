//! Maps VMIDs to concrete guests using the cluster inventory.

use crate::core::domain::{
    error::ProxmoxResult,
    model::{cluster_resource::ClusterResource, resource_ref::ResourceRef},
};
use crate::core::infrastructure::api_client::ApiClient;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use std::sync::Arc;
use tracing::debug;

const GUEST_INVENTORY_PATH: &str = "cluster/resources?type=vm";

/// Resolves guest identifiers to `{vmid, node, type}` references.
///
/// Asking for VMIDs that do not exist is not an error; they are simply
/// missing from the answer.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ResourceResolver: Send + Sync {
    /// Every VM and container in the cluster, ordered by VMID.
    async fn resolve_all(&self) -> ProxmoxResult<Vec<ResourceRef>>;

    /// The guests with the given VMIDs, in the order they were requested.
    async fn resolve_multiple(&self, vmids: &[u32]) -> ProxmoxResult<Vec<ResourceRef>>;
}

/// [`ResourceResolver`] backed by `GET /cluster/resources?type=vm`.
pub struct ClusterResourceResolver {
    client: Arc<ApiClient>,
}

impl ClusterResourceResolver {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    async fn inventory(&self) -> ProxmoxResult<Vec<ResourceRef>> {
        let resources: Vec<ClusterResource> = self.client.get(GUEST_INVENTORY_PATH).await?;
        let mut guests: Vec<ResourceRef> = resources
            .iter()
            .filter_map(ClusterResource::to_resource_ref)
            .collect();
        guests.sort_by_key(|guest| guest.vmid);
        Ok(guests)
    }
}

#[async_trait]
impl ResourceResolver for ClusterResourceResolver {
    async fn resolve_all(&self) -> ProxmoxResult<Vec<ResourceRef>> {
        self.inventory().await
    }

    async fn resolve_multiple(&self, vmids: &[u32]) -> ProxmoxResult<Vec<ResourceRef>> {
        let inventory = self.inventory().await?;
        let mut resolved = Vec::with_capacity(vmids.len());
        for vmid in vmids {
            match inventory.iter().find(|guest| guest.vmid == *vmid) {
                Some(guest) => resolved.push(guest.clone()),
                None => debug!(vmid, "vmid not found in cluster inventory"),
            }
        }
        Ok(resolved)
    }
}
