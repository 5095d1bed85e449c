//! Guest power state transitions.

use super::operation_result::Operation;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerAction {
    /// Boot the guest.
    Start,
    /// Hard stop, like pulling the plug.
    Stop,
    /// ACPI shutdown (QEMU) or init shutdown (LXC).
    Shutdown,
    /// Clean reboot.
    Reboot,
}

impl PowerAction {
    /// Path segment under `.../status/`.
    pub fn as_str(&self) -> &'static str {
        match self {
            PowerAction::Start => "start",
            PowerAction::Stop => "stop",
            PowerAction::Shutdown => "shutdown",
            PowerAction::Reboot => "reboot",
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            PowerAction::Start => Operation::Start,
            PowerAction::Stop => Operation::Stop,
            PowerAction::Shutdown => Operation::Shutdown,
            PowerAction::Reboot => Operation::Reboot,
        }
    }

    /// Actions that interrupt a running workload without asking it first.
    pub fn is_disruptive(&self) -> bool {
        matches!(self, PowerAction::Stop)
    }
}

impl fmt::Display for PowerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
