//! Building blocks shared by every multi-resource service.
//!
//! A service resolves its targets with [`resolve_resources`], narrows them
//! with [`filter_by_node`], then calls the API once per target and hands
//! each outcome to [`TaskRunner::settle`]. Targets are processed strictly
//! one after another and results keep the resolution order.

use crate::core::domain::{
    error::ProxmoxResult,
    model::{
        operation_result::{Dispatched, Operation, OperationResult},
        resource_ref::ResourceRef,
    },
};
use crate::core::infrastructure::{resource_resolver::ResourceResolver, task_poller::TaskPoller};
use std::time::Duration;
use tracing::{debug, info};

/// How long a synchronous operation waits for its task by default.
pub const DEFAULT_TASK_TIMEOUT: Duration = Duration::from_secs(300);

/// Empty `vmids` means every guest in the cluster.
///
/// The resolver may return fewer guests than requested; that is not an error.
pub async fn resolve_resources(
    resolver: &dyn ResourceResolver,
    vmids: &[u32],
) -> ProxmoxResult<Vec<ResourceRef>> {
    let resources = if vmids.is_empty() {
        resolver.resolve_all().await?
    } else {
        resolver.resolve_multiple(vmids).await?
    };
    debug!(
        requested = vmids.len(),
        resolved = resources.len(),
        "resolved resources"
    );
    Ok(resources)
}

/// Keeps only resources on `node` (exact, case-sensitive). `None` keeps all.
pub fn filter_by_node(resources: Vec<ResourceRef>, node: Option<&str>) -> Vec<ResourceRef> {
    match node {
        None => resources,
        Some(node) => resources
            .into_iter()
            .filter(|resource| resource.node == node)
            .collect(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Wait for each task to finish, up to `timeout`.
    Sync { timeout: Duration },
    /// Report tasks as pending without waiting.
    Async,
}

impl Default for ExecutionMode {
    fn default() -> Self {
        ExecutionMode::Sync {
            timeout: DEFAULT_TASK_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionOptions {
    pub mode: ExecutionMode,
    /// Stop after the first failed result.
    pub fail_fast: bool,
}

impl ExecutionOptions {
    pub fn sync(timeout: Duration) -> Self {
        Self {
            mode: ExecutionMode::Sync { timeout },
            fail_fast: false,
        }
    }

    pub fn asynchronous() -> Self {
        Self {
            mode: ExecutionMode::Async,
            fail_fast: false,
        }
    }

    #[must_use]
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// True if iteration must stop after `result`.
    pub fn should_stop<R>(&self, result: &OperationResult<R>) -> bool {
        self.fail_fast && result.is_failed()
    }
}

/// Turns the outcome of one repository call into an [`OperationResult`].
pub struct TaskRunner<'a> {
    poller: &'a dyn TaskPoller,
    options: ExecutionOptions,
}

impl<'a> TaskRunner<'a> {
    pub fn new(poller: &'a dyn TaskPoller, options: ExecutionOptions) -> Self {
        Self { poller, options }
    }

    pub fn options(&self) -> &ExecutionOptions {
        &self.options
    }

    /// Errors become failed results; they never escape.
    pub async fn settle<R>(
        &self,
        resource: R,
        operation: Operation,
        dispatched: ProxmoxResult<Dispatched>,
    ) -> OperationResult<R> {
        let upid = match dispatched {
            Err(err) => return OperationResult::failed(resource, operation, err.to_string()),
            Ok(Dispatched::Completed) => return OperationResult::succeeded(resource, operation),
            Ok(Dispatched::Task(upid)) => upid,
        };
        info!(%operation, upid = %upid, "task dispatched");

        match self.options.mode {
            ExecutionMode::Async => OperationResult::pending(resource, operation, upid),
            ExecutionMode::Sync { timeout } => match self.poller.wait(&upid, timeout).await {
                Ok(task) => OperationResult::from_task(resource, operation, task),
                Err(err) => OperationResult::failed(resource, operation, err.to_string())
                    .with_task_upid(upid),
            },
        }
    }
}
