//! Domain models for guest snapshots.
//!
//! Snapshots are listed by `/nodes/{node}/{qemu|lxc}/{vmid}/snapshot`. The
//! list always contains a `current` pseudo entry describing the live state;
//! it is not a real snapshot and is filtered out before anything else sees it.

use super::resource_ref::{ResourceKind, ResourceRef};
use crate::core::domain::value_object::{CURRENT_SNAPSHOT, serde_helpers::int_bool};
use serde::{Deserialize, Serialize};

/// A snapshot as returned by the snapshot listing endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Snapshot {
    /// Snapshot name.
    pub name: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Creation time as a unix timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snaptime: Option<i64>,
    /// Whether RAM state was saved (QEMU only).
    #[serde(
        default,
        deserialize_with = "int_bool::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub vmstate: Option<bool>,
    /// Name of the parent snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl Snapshot {
    /// True for the `current` pseudo entry.
    pub fn is_current(&self) -> bool {
        self.name == CURRENT_SNAPSHOT
    }
}

/// A snapshot together with the guest it belongs to, for listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotEntry {
    pub vmid: u32,
    pub node: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    #[serde(flatten)]
    pub snapshot: Snapshot,
}

impl SnapshotEntry {
    pub fn new(resource: &ResourceRef, snapshot: Snapshot) -> Self {
        Self {
            vmid: resource.vmid,
            node: resource.node.clone(),
            kind: resource.kind,
            snapshot,
        }
    }
}

/// The target of a snapshot operation.
///
/// `snapshot` is `None` only for the no-op result a bulk delete produces
/// for a guest that had nothing to delete.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotRef {
    #[serde(flatten)]
    pub resource: ResourceRef,
    pub snapshot: Option<String>,
}

impl SnapshotRef {
    pub fn new(resource: ResourceRef, snapshot: impl Into<String>) -> Self {
        Self {
            resource,
            snapshot: Some(snapshot.into()),
        }
    }

    pub fn without_snapshot(resource: ResourceRef) -> Self {
        Self {
            resource,
            snapshot: None,
        }
    }
}

/// Body of `POST .../snapshot`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateSnapshotRequest {
    pub snapname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Sent as `0`/`1`; ignored by containers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vmstate: Option<u8>,
}
