//! `POST /nodes/{node}/{qemu|lxc}/{vmid}/status/{action}`.

use crate::core::domain::{
    error::ProxmoxResult,
    model::{operation_result::Dispatched, power_action::PowerAction, resource_ref::ResourceRef},
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
pub trait PowerRepository: Send + Sync {
    async fn change_state(
        &self,
        resource: &ResourceRef,
        action: PowerAction,
    ) -> ProxmoxResult<Dispatched>;
}

pub struct ApiPowerRepository {
    client: Arc<ApiClient>,
}

impl ApiPowerRepository {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PowerRepository for ApiPowerRepository {
    async fn change_state(
        &self,
        resource: &ResourceRef,
        action: PowerAction,
    ) -> ProxmoxResult<Dispatched> {
        let path = format!("{}/status/{}", resource.api_path(), action);
        debug!(%resource, %action, "changing power state");
        let upid: Option<String> = self.client.post(&path, &json!({})).await?;
        Ok(Dispatched::from_data(upid))
    }
}
