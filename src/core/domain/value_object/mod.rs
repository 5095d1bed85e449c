mod proxmox_api_token;
mod proxmox_secret;
mod proxmox_ticket;
mod proxmox_upid;
mod proxmox_url;
mod proxmox_username;
mod snapshot_name;
pub(crate) mod serde_helpers;

pub use proxmox_api_token::ProxmoxApiToken;
pub use proxmox_secret::{ProxmoxSecret, SECRET_MASK};
pub use proxmox_ticket::ProxmoxTicket;
pub use proxmox_upid::ProxmoxUpid;
pub use proxmox_url::ProxmoxUrl;
pub use proxmox_username::ProxmoxUsername;
pub use snapshot_name::{CURRENT_SNAPSHOT, SnapshotName};

// Re-export validation functions for internal use
pub(crate) use proxmox_api_token::validate_api_token;
pub(crate) use proxmox_ticket::validate_ticket;
pub(crate) use proxmox_username::validate_username;
