//! Domain models for cluster-wide resources.
//!
//! This module defines the structures returned by the `/cluster/resources` endpoint.
//! The response is a heterogeneous list identified by a `type` field; only
//! guests are modelled, everything else deserializes as [`ClusterResource::Other`].

use super::resource_ref::{ResourceKind, ResourceRef};
use crate::core::domain::value_object::serde_helpers::int_bool;
use serde::{Deserialize, Serialize};

/// A resource discovered in the Proxmox cluster.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClusterResource {
    /// A QEMU virtual machine.
    Qemu(GuestResource),
    /// An LXC container.
    Lxc(GuestResource),
    /// Storage, nodes, pools, SDN zones.
    #[serde(other)]
    Other,
}

impl ClusterResource {
    /// The guest as a [`ResourceRef`], or `None` for non-guest entries.
    pub fn to_resource_ref(&self) -> Option<ResourceRef> {
        let (guest, kind) = match self {
            ClusterResource::Qemu(guest) => (guest, ResourceKind::Qemu),
            ClusterResource::Lxc(guest) => (guest, ResourceKind::Lxc),
            ClusterResource::Other => return None,
        };
        let mut resource = ResourceRef::new(guest.vmid, guest.node.clone(), kind);
        resource.name = guest.name.clone();
        Some(resource)
    }
}

/// Fields of a `qemu` or `lxc` entry.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GuestResource {
    /// Unique resource identifier (e.g., `qemu/100`).
    pub id: String,
    /// The guest identifier.
    pub vmid: u32,
    /// The Proxmox node where this guest resides.
    pub node: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Runtime status (e.g., `running`, `stopped`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(
        default,
        deserialize_with = "int_bool::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub template: Option<bool>,
}
