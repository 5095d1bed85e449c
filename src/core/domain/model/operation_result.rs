//! Per-resource outcome of a multi-resource operation.

use super::task::Task;
use serde::Serialize;
use std::fmt;

/// The verb an [`OperationResult`] reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Delete,
    Rollback,
    Start,
    Stop,
    Shutdown,
    Reboot,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Delete => "delete",
            Operation::Rollback => "rollback",
            Operation::Start => "start",
            Operation::Stop => "stop",
            Operation::Shutdown => "shutdown",
            Operation::Reboot => "reboot",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Succeeded,
    Failed,
    Pending,
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultStatus::Succeeded => f.write_str("succeeded"),
            ResultStatus::Failed => f.write_str("failed"),
            ResultStatus::Pending => f.write_str("pending"),
        }
    }
}

/// What a repository call hands back for one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    /// The API started an asynchronous task with this UPID.
    Task(String),
    /// The API answered synchronously.
    Completed,
}

impl Dispatched {
    /// Interprets the `data` field of a write response.
    ///
    /// Proxmox returns a UPID string for anything it runs as a task and
    /// `null` for immediate changes.
    pub fn from_data(data: Option<String>) -> Self {
        match data {
            Some(upid) if !upid.is_empty() => Dispatched::Task(upid),
            _ => Dispatched::Completed,
        }
    }
}

/// Outcome of one operation on one resource.
///
/// Created once per resource per invocation and not modified afterwards.
/// When a task is attached its state takes precedence over `status`: a
/// task that is still running always reports pending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationResult<R> {
    pub resource: R,
    pub operation: Operation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<Task>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_upid: Option<String>,
    pub status: ResultStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<R> OperationResult<R> {
    pub fn succeeded(resource: R, operation: Operation) -> Self {
        Self {
            resource,
            operation,
            task: None,
            task_upid: None,
            status: ResultStatus::Succeeded,
            error: None,
        }
    }

    pub fn failed(resource: R, operation: Operation, error: impl Into<String>) -> Self {
        Self {
            resource,
            operation,
            task: None,
            task_upid: None,
            status: ResultStatus::Failed,
            error: Some(error.into()),
        }
    }

    pub fn pending(resource: R, operation: Operation, upid: impl Into<String>) -> Self {
        Self {
            resource,
            operation,
            task: None,
            task_upid: Some(upid.into()),
            status: ResultStatus::Pending,
            error: None,
        }
    }

    /// Result derived from a polled task; a failed task's exit status
    /// becomes the error message.
    pub fn from_task(resource: R, operation: Operation, task: Task) -> Self {
        let (status, error) = if task.is_pending() {
            (ResultStatus::Pending, None)
        } else if task.is_successful() {
            (ResultStatus::Succeeded, None)
        } else {
            (
                ResultStatus::Failed,
                Some(
                    task.exitstatus
                        .clone()
                        .unwrap_or_else(|| "task failed without exit status".to_string()),
                ),
            )
        };
        Self {
            resource,
            operation,
            task_upid: Some(task.upid.clone()),
            task: Some(task),
            status,
            error,
        }
    }

    #[must_use]
    pub fn with_task_upid(mut self, upid: impl Into<String>) -> Self {
        self.task_upid = Some(upid.into());
        self
    }

    /// The status after consulting the attached task.
    pub fn effective_status(&self) -> ResultStatus {
        match &self.task {
            Some(task) if task.is_pending() => ResultStatus::Pending,
            Some(task) if task.is_successful() => ResultStatus::Succeeded,
            Some(_) => ResultStatus::Failed,
            None => self.status,
        }
    }

    pub fn is_successful(&self) -> bool {
        self.effective_status() == ResultStatus::Succeeded
    }

    pub fn is_failed(&self) -> bool {
        self.effective_status() == ResultStatus::Failed
    }

    pub fn is_pending(&self) -> bool {
        self.effective_status() == ResultStatus::Pending
    }
}

/// True if any result in the slice failed.
pub fn any_failed<R>(results: &[OperationResult<R>]) -> bool {
    results.iter().any(OperationResult::is_failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::model::task::TaskStatus;

    const UPID: &str = "UPID:pve1:00001234:00005678:65F0A1B2:qmsnapshot:100:root@pam:";

    fn task(status: TaskStatus, exitstatus: Option<&str>) -> Task {
        Task {
            upid: UPID.to_string(),
            status,
            exitstatus: exitstatus.map(str::to_string),
            node: None,
            task_type: None,
        }
    }

    #[test]
    fn test_status_constructors() {
        assert!(OperationResult::succeeded(100, Operation::Create).is_successful());
        let failed = OperationResult::failed(100, Operation::Delete, "boom");
        assert!(failed.is_failed());
        assert_eq!(failed.error.as_deref(), Some("boom"));
        let pending = OperationResult::pending(100, Operation::Start, UPID);
        assert!(pending.is_pending());
        assert_eq!(pending.task_upid.as_deref(), Some(UPID));
    }

    #[test]
    fn test_running_task_overrides_status_flag() {
        let mut result = OperationResult::succeeded(100, Operation::Create);
        result.task = Some(task(TaskStatus::Running, None));
        assert!(result.is_pending());
        assert!(!result.is_successful());
        assert!(!result.is_failed());
    }

    #[test]
    fn test_from_task() {
        let ok = OperationResult::from_task(
            100,
            Operation::Create,
            task(TaskStatus::Stopped, Some("OK")),
        );
        assert!(ok.is_successful());
        assert_eq!(ok.task_upid.as_deref(), Some(UPID));

        let failed = OperationResult::from_task(
            100,
            Operation::Create,
            task(TaskStatus::Stopped, Some("VM is locked (backup)")),
        );
        assert!(failed.is_failed());
        assert_eq!(failed.error.as_deref(), Some("VM is locked (backup)"));
    }

    #[test]
    fn test_any_failed() {
        let results = vec![
            OperationResult::succeeded(100, Operation::Stop),
            OperationResult::pending(101, Operation::Stop, UPID),
        ];
        assert!(!any_failed(&results));
        let results = vec![
            OperationResult::succeeded(100, Operation::Stop),
            OperationResult::failed(101, Operation::Stop, "timeout"),
        ];
        assert!(any_failed(&results));
        assert!(!any_failed::<u32>(&[]));
    }

    #[test]
    fn test_dispatched_from_data() {
        assert_eq!(
            Dispatched::from_data(Some(UPID.to_string())),
            Dispatched::Task(UPID.to_string())
        );
        assert_eq!(Dispatched::from_data(None), Dispatched::Completed);
        assert_eq!(Dispatched::from_data(Some(String::new())), Dispatched::Completed);
    }
}
