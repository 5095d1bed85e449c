//! Per-operation options for [`SnapshotService`](crate::snapshot::application::service::snapshot_service::SnapshotService).
//!
//! Every field has a documented default; `Default::default()` is a valid
//! value for all of them.

use crate::core::application::orchestration::ExecutionOptions;

/// Options for `list` and `describe`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListSnapshotOptions {
    /// Only guests on this node. Default: all nodes.
    pub node: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateSnapshotOptions {
    /// Only guests on this node. Default: all nodes.
    pub node: Option<String>,
    pub description: Option<String>,
    /// Include RAM state. Ignored for containers. Default: false.
    pub vmstate: bool,
    pub execution: ExecutionOptions,
}

/// Options for `delete` and `delete_all`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteSnapshotOptions {
    /// Only guests on this node. Default: all nodes.
    pub node: Option<String>,
    /// Remove the snapshot even if a disk snapshot fails. Default: false.
    pub force: bool,
    pub execution: ExecutionOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RollbackSnapshotOptions {
    /// Only roll back if the guest lives on this node. Default: any node.
    pub node: Option<String>,
    /// Start the guest after the rollback. Default: false.
    pub start: bool,
    pub execution: ExecutionOptions,
}
