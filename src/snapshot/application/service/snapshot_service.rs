//! Snapshot operations across one or many guests.
//!
//! Every operation resolves its targets first (all guests when no VMID is
//! given), narrows them to a node if asked, then works through them one at a
//! time. Resolution failures are returned as errors; anything that goes
//! wrong for a single guest ends up in that guest's [`OperationResult`].

use crate::core::application::orchestration::{TaskRunner, filter_by_node, resolve_resources};
use crate::core::domain::{
    error::ProxmoxResult,
    model::{
        operation_result::{Operation, OperationResult},
        resource_ref::ResourceRef,
        snapshot::{CreateSnapshotRequest, Snapshot, SnapshotEntry, SnapshotRef},
    },
    value_object::SnapshotName,
};
use crate::core::infrastructure::{resource_resolver::ResourceResolver, task_poller::TaskPoller};
use crate::snapshot::application::request::snapshot_options::{
    CreateSnapshotOptions, DeleteSnapshotOptions, ListSnapshotOptions, RollbackSnapshotOptions,
};
use crate::snapshot::infrastructure::snapshot_repository::SnapshotRepository;
use std::sync::Arc;
use tracing::{debug, warn};

pub type SnapshotResult = OperationResult<SnapshotRef>;

pub struct SnapshotService {
    resolver: Arc<dyn ResourceResolver>,
    repository: Arc<dyn SnapshotRepository>,
    poller: Arc<dyn TaskPoller>,
}

impl SnapshotService {
    pub fn new(
        resolver: Arc<dyn ResourceResolver>,
        repository: Arc<dyn SnapshotRepository>,
        poller: Arc<dyn TaskPoller>,
    ) -> Self {
        Self {
            resolver,
            repository,
            poller,
        }
    }

    /// Snapshots of every target guest, excluding `current`.
    ///
    /// A guest whose listing fails is skipped with a warning.
    pub async fn list(
        &self,
        vmids: &[u32],
        options: &ListSnapshotOptions,
    ) -> ProxmoxResult<Vec<SnapshotEntry>> {
        let resources = self.targets(vmids, options.node.as_deref()).await?;
        let mut entries = Vec::new();
        for resource in &resources {
            match self.snapshots_of(resource).await {
                Ok(snapshots) => entries.extend(
                    snapshots
                        .into_iter()
                        .map(|snapshot| SnapshotEntry::new(resource, snapshot)),
                ),
                Err(err) => {
                    warn!(%resource, error = %err, "skipping guest, listing snapshots failed")
                }
            }
        }
        Ok(entries)
    }

    /// The snapshot called `name` on each target guest that has one.
    pub async fn describe(
        &self,
        vmids: &[u32],
        name: &SnapshotName,
        options: &ListSnapshotOptions,
    ) -> ProxmoxResult<Vec<SnapshotEntry>> {
        let entries = self.list(vmids, options).await?;
        Ok(entries
            .into_iter()
            .filter(|entry| entry.snapshot.name == name.as_str())
            .collect())
    }

    pub async fn create(
        &self,
        vmids: &[u32],
        name: &SnapshotName,
        options: &CreateSnapshotOptions,
    ) -> ProxmoxResult<Vec<SnapshotResult>> {
        let resources = self.targets(vmids, options.node.as_deref()).await?;
        let runner = TaskRunner::new(self.poller.as_ref(), options.execution);
        let mut results = Vec::with_capacity(resources.len());

        for resource in resources {
            let request = CreateSnapshotRequest {
                snapname: name.as_str().to_string(),
                description: options.description.clone(),
                vmstate: (options.vmstate && resource.kind.supports_vmstate()).then_some(1),
            };
            let dispatched = self.repository.create(&resource, &request).await;
            let result = runner
                .settle(
                    SnapshotRef::new(resource, name.as_str()),
                    Operation::Create,
                    dispatched,
                )
                .await;
            let stop = runner.options().should_stop(&result);
            results.push(result);
            if stop {
                break;
            }
        }
        Ok(results)
    }

    pub async fn delete(
        &self,
        vmids: &[u32],
        name: &SnapshotName,
        options: &DeleteSnapshotOptions,
    ) -> ProxmoxResult<Vec<SnapshotResult>> {
        let resources = self.targets(vmids, options.node.as_deref()).await?;
        let runner = TaskRunner::new(self.poller.as_ref(), options.execution);
        let mut results = Vec::with_capacity(resources.len());

        for resource in resources {
            let dispatched = self
                .repository
                .delete(&resource, name.as_str(), options.force)
                .await;
            let result = runner
                .settle(
                    SnapshotRef::new(resource, name.as_str()),
                    Operation::Delete,
                    dispatched,
                )
                .await;
            let stop = runner.options().should_stop(&result);
            results.push(result);
            if stop {
                break;
            }
        }
        Ok(results)
    }

    /// Deletes every snapshot of every target guest.
    ///
    /// Produces one result per deleted snapshot. A guest with nothing to
    /// delete still gets one successful result with no snapshot name, so
    /// there are never fewer results than guests. A guest whose listing
    /// fails gets one failed result. With fail-fast, the first failure ends
    /// the whole run, including the remaining guests.
    pub async fn delete_all(
        &self,
        vmids: &[u32],
        options: &DeleteSnapshotOptions,
    ) -> ProxmoxResult<Vec<SnapshotResult>> {
        let resources = self.targets(vmids, options.node.as_deref()).await?;
        let runner = TaskRunner::new(self.poller.as_ref(), options.execution);
        let mut results = Vec::new();

        'guests: for resource in resources {
            let snapshots = match self.snapshots_of(&resource).await {
                Ok(snapshots) => snapshots,
                Err(err) => {
                    let result = OperationResult::failed(
                        SnapshotRef::without_snapshot(resource),
                        Operation::Delete,
                        err.to_string(),
                    );
                    let stop = runner.options().should_stop(&result);
                    results.push(result);
                    if stop {
                        break;
                    }
                    continue;
                }
            };

            if snapshots.is_empty() {
                debug!(%resource, "no snapshots to delete");
                results.push(OperationResult::succeeded(
                    SnapshotRef::without_snapshot(resource),
                    Operation::Delete,
                ));
                continue;
            }

            for snapshot in snapshots {
                let dispatched = self
                    .repository
                    .delete(&resource, &snapshot.name, options.force)
                    .await;
                let result = runner
                    .settle(
                        SnapshotRef::new(resource.clone(), snapshot.name),
                        Operation::Delete,
                        dispatched,
                    )
                    .await;
                let stop = runner.options().should_stop(&result);
                results.push(result);
                if stop {
                    break 'guests;
                }
            }
        }
        Ok(results)
    }

    /// Rolls guest `vmid` back to `name`.
    ///
    /// Returns no result if the guest does not exist or is not on
    /// `options.node`.
    pub async fn rollback(
        &self,
        vmid: u32,
        name: &SnapshotName,
        options: &RollbackSnapshotOptions,
    ) -> ProxmoxResult<Vec<SnapshotResult>> {
        let resources = self.targets(&[vmid], options.node.as_deref()).await?;
        let runner = TaskRunner::new(self.poller.as_ref(), options.execution);
        let mut results = Vec::with_capacity(resources.len());

        for resource in resources {
            let dispatched = self
                .repository
                .rollback(&resource, name.as_str(), options.start)
                .await;
            results.push(
                runner
                    .settle(
                        SnapshotRef::new(resource, name.as_str()),
                        Operation::Rollback,
                        dispatched,
                    )
                    .await,
            );
        }
        Ok(results)
    }

    async fn targets(&self, vmids: &[u32], node: Option<&str>) -> ProxmoxResult<Vec<ResourceRef>> {
        let resources = resolve_resources(self.resolver.as_ref(), vmids).await?;
        Ok(filter_by_node(resources, node))
    }

    async fn snapshots_of(&self, resource: &ResourceRef) -> ProxmoxResult<Vec<Snapshot>> {
        let snapshots = self.repository.list(resource).await?;
        Ok(snapshots
            .into_iter()
            .filter(|snapshot| !snapshot.is_current())
            .collect())
    }
}
