//! Waits for asynchronous Proxmox tasks to finish.

use crate::core::domain::{
    error::{ProxmoxResult, TaskError},
    model::task::Task,
    value_object::ProxmoxUpid,
};
use crate::core::infrastructure::api_client::ApiClient;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[cfg_attr(test, automock)]
#[async_trait]
pub trait TaskPoller: Send + Sync {
    /// Blocks until the task leaves the `running` state.
    ///
    /// # Errors
    /// `TaskError::Timeout` if the task is still running after `timeout`.
    async fn wait(&self, upid: &str, timeout: Duration) -> ProxmoxResult<Task>;
}

/// [`TaskPoller`] that polls `GET /nodes/{node}/tasks/{upid}/status`.
pub struct ApiTaskPoller {
    client: Arc<ApiClient>,
    interval: Duration,
}

impl ApiTaskPoller {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self::with_interval(client, DEFAULT_POLL_INTERVAL)
    }

    pub fn with_interval(client: Arc<ApiClient>, interval: Duration) -> Self {
        Self { client, interval }
    }

    async fn poll_until_stopped(&self, upid: &ProxmoxUpid) -> ProxmoxResult<Task> {
        let path = format!("nodes/{}/tasks/{}/status", upid.node(), upid.as_str());
        loop {
            let mut task: Task = self.client.get(&path).await?;
            if task.upid.is_empty() {
                task.upid = upid.as_str().to_string();
            }
            if task.is_completed() {
                return Ok(task);
            }
            debug!(upid = upid.as_str(), "task still running");
            tokio::time::sleep(self.interval).await;
        }
    }
}

#[async_trait]
impl TaskPoller for ApiTaskPoller {
    async fn wait(&self, upid: &str, timeout: Duration) -> ProxmoxResult<Task> {
        let upid = ProxmoxUpid::parse(upid)?;
        match tokio::time::timeout(timeout, self.poll_until_stopped(&upid)).await {
            Ok(result) => result,
            Err(_) => Err(TaskError::Timeout {
                upid: upid.as_str().to_string(),
                timeout,
            }
            .into()),
        }
    }
}
