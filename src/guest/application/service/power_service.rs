//! Start, stop, shutdown and reboot for VMs or containers.

use crate::core::application::orchestration::{TaskRunner, filter_by_node, resolve_resources};
use crate::core::domain::{
    error::ProxmoxResult,
    model::{
        operation_result::OperationResult,
        power_action::PowerAction,
        resource_ref::{ResourceKind, ResourceRef},
    },
};
use crate::core::infrastructure::{resource_resolver::ResourceResolver, task_poller::TaskPoller};
use crate::guest::application::request::power_options::PowerOptions;
use crate::guest::infrastructure::power_repository::PowerRepository;
use std::sync::Arc;
use tracing::debug;

pub type PowerResult = OperationResult<ResourceRef>;

pub struct PowerService {
    resolver: Arc<dyn ResourceResolver>,
    repository: Arc<dyn PowerRepository>,
    poller: Arc<dyn TaskPoller>,
}

impl PowerService {
    pub fn new(
        resolver: Arc<dyn ResourceResolver>,
        repository: Arc<dyn PowerRepository>,
        poller: Arc<dyn TaskPoller>,
    ) -> Self {
        Self {
            resolver,
            repository,
            poller,
        }
    }

    pub async fn start(
        &self,
        kind: ResourceKind,
        vmids: &[u32],
        options: &PowerOptions,
    ) -> ProxmoxResult<Vec<PowerResult>> {
        self.execute(PowerAction::Start, kind, vmids, options).await
    }

    pub async fn stop(
        &self,
        kind: ResourceKind,
        vmids: &[u32],
        options: &PowerOptions,
    ) -> ProxmoxResult<Vec<PowerResult>> {
        self.execute(PowerAction::Stop, kind, vmids, options).await
    }

    pub async fn shutdown(
        &self,
        kind: ResourceKind,
        vmids: &[u32],
        options: &PowerOptions,
    ) -> ProxmoxResult<Vec<PowerResult>> {
        self.execute(PowerAction::Shutdown, kind, vmids, options)
            .await
    }

    pub async fn reboot(
        &self,
        kind: ResourceKind,
        vmids: &[u32],
        options: &PowerOptions,
    ) -> ProxmoxResult<Vec<PowerResult>> {
        self.execute(PowerAction::Reboot, kind, vmids, options).await
    }

    /// Applies `action` to every resolved guest of `kind`.
    ///
    /// Guests of the other kind are dropped after resolution, so asking for
    /// a container's VMID under `vm` simply yields no result.
    pub async fn execute(
        &self,
        action: PowerAction,
        kind: ResourceKind,
        vmids: &[u32],
        options: &PowerOptions,
    ) -> ProxmoxResult<Vec<PowerResult>> {
        let resources = resolve_resources(self.resolver.as_ref(), vmids).await?;
        let resources: Vec<ResourceRef> = filter_by_node(resources, options.node.as_deref())
            .into_iter()
            .filter(|resource| resource.kind == kind)
            .collect();
        debug!(%action, %kind, targets = resources.len(), "changing power state");

        let runner = TaskRunner::new(self.poller.as_ref(), options.execution);
        let mut results = Vec::with_capacity(resources.len());
        for resource in resources {
            let dispatched = self.repository.change_state(&resource, action).await;
            let result = runner
                .settle(resource, action.operation(), dispatched)
                .await;
            let stop = runner.options().should_stop(&result);
            results.push(result);
            if stop {
                break;
            }
        }
        Ok(results)
    }
}
