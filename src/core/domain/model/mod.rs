pub mod cluster;
pub mod cluster_resource;
pub mod config_document;
pub mod context;
pub mod operation_result;
pub mod power_action;
pub mod proxmox_auth;
pub mod proxmox_connection;
pub mod resolved_config;
pub mod resource_ref;
pub mod snapshot;
pub mod task;
pub mod user;

pub use cluster::{Cluster, ClusterSettings, NamedCluster};
pub use cluster_resource::{ClusterResource, GuestResource};
pub use config_document::ConfigDocument;
pub use context::{Context, ContextSettings, NamedContext};
pub use operation_result::{Dispatched, Operation, OperationResult, ResultStatus, any_failed};
pub use power_action::PowerAction;
pub use proxmox_auth::ProxmoxAuth;
pub use proxmox_connection::{ConnectionCredentials, ProxmoxConnection};
pub use resolved_config::{AuthType, Credentials, ResolvedConfig};
pub use resource_ref::{ResourceKind, ResourceRef};
pub use snapshot::{CreateSnapshotRequest, Snapshot, SnapshotEntry, SnapshotRef};
pub use task::{Task, TaskStatus};
pub use user::{NamedUser, User, UserSettings};
