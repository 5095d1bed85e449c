//! A concrete guest located on a node.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Guest type as used in API paths and `/cluster/resources` entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// A QEMU virtual machine.
    Qemu,
    /// An LXC container.
    Lxc,
}

impl ResourceKind {
    /// Path segment under `/nodes/{node}/`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Qemu => "qemu",
            ResourceKind::Lxc => "lxc",
        }
    }

    /// User-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Qemu => "vm",
            ResourceKind::Lxc => "container",
        }
    }

    /// Containers cannot save RAM state in a snapshot.
    pub fn supports_vmstate(&self) -> bool {
        matches!(self, ResourceKind::Qemu)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved `{vmid, node, type}` triple.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResourceRef {
    pub vmid: u32,
    pub node: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ResourceRef {
    pub fn new(vmid: u32, node: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            vmid,
            node: node.into(),
            kind,
            name: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// API path of the guest, e.g. `nodes/pve1/qemu/100`.
    pub fn api_path(&self) -> String {
        format!("nodes/{}/{}/{}", self.node, self.kind.as_str(), self.vmid)
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.kind, self.vmid, self.node)
    }
}
