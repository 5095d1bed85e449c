//! Status snapshot of an asynchronous Proxmox task.
//!
//! Returned by `/nodes/{node}/tasks/{upid}/status`. A task is re-fetched on
//! every poll and never cached.

use serde::{Deserialize, Serialize};

const EXIT_OK: &str = "OK";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Running,
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Task {
    /// The task identifier.
    #[serde(default)]
    pub upid: String,
    /// `running` or `stopped`.
    pub status: TaskStatus,
    /// `OK` or the error text once stopped; absent while running.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exitstatus: Option<String>,
    /// The node that runs the task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
    /// Task type, e.g. `qmsnapshot`.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,
}

impl Task {
    pub fn is_pending(&self) -> bool {
        self.status == TaskStatus::Running
    }

    pub fn is_completed(&self) -> bool {
        !self.is_pending()
    }

    pub fn is_successful(&self) -> bool {
        self.is_completed() && self.exitstatus.as_deref() == Some(EXIT_OK)
    }

    pub fn is_failed(&self) -> bool {
        self.is_completed() && self.exitstatus.as_deref() != Some(EXIT_OK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(status: TaskStatus, exitstatus: Option<&str>) -> Task {
        Task {
            upid: "UPID:pve1:00001234:00005678:65F0A1B2:qmsnapshot:100:root@pam:".to_string(),
            status,
            exitstatus: exitstatus.map(str::to_string),
            node: Some("pve1".to_string()),
            task_type: Some("qmsnapshot".to_string()),
        }
    }

    #[test]
    fn test_running_task_is_pending() {
        let t = task(TaskStatus::Running, None);
        assert!(t.is_pending());
        assert!(!t.is_completed());
        assert!(!t.is_successful());
        assert!(!t.is_failed());
    }

    #[test]
    fn test_stopped_ok_is_successful() {
        let t = task(TaskStatus::Stopped, Some("OK"));
        assert!(t.is_completed());
        assert!(t.is_successful());
        assert!(!t.is_failed());
    }

    #[test]
    fn test_stopped_with_error_is_failed() {
        let t = task(TaskStatus::Stopped, Some("snapshot feature is not available"));
        assert!(t.is_failed());
        assert!(!t.is_successful());
        let t = task(TaskStatus::Stopped, None);
        assert!(t.is_failed());
    }

    #[test]
    fn test_deserialize_api_payload() {
        let t: Task = serde_json::from_value(serde_json::json!({
            "upid": "UPID:pve1:00001234:00005678:65F0A1B2:qmstart:100:root@pam:",
            "status": "stopped",
            "exitstatus": "OK",
            "node": "pve1",
            "type": "qmstart",
            "pid": 4660,
            "starttime": 1710268850
        }))
        .unwrap();
        assert!(t.is_successful());
        assert_eq!(t.task_type.as_deref(), Some("qmstart"));
    }
}
