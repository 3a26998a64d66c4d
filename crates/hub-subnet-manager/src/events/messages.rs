//! Subnet event messages delivered to hub sinks
//!
//! Each event is addressed to one subnet and tells its hub which routers or
//! targets to add or remove, or when to bring the whole subnet up or down.

use crate::models::{RouterId, SubnetId, TargetId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Command sent to a subnet hub
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubnetMessage {
    // ========================================================================
    // Target membership
    // ========================================================================
    /// Targets joined the subnet
    AddTargets { targets: BTreeSet<TargetId> },

    /// Targets left the subnet
    RemoveTargets { targets: BTreeSet<TargetId> },

    // ========================================================================
    // Router membership
    // ========================================================================
    /// Routers joined the subnet
    AddRouters { routers: BTreeSet<RouterId> },

    /// Routers left the subnet while its hub stayed
    RemoveRouters { routers: BTreeSet<RouterId> },

    // ========================================================================
    // Hub lifecycle
    // ========================================================================
    /// Bring the subnet up with the given initial members
    ActivateHub {
        routers: BTreeSet<RouterId>,
        targets: BTreeSet<TargetId>,
    },

    /// Tear the subnet down
    DeactivateHub,
}

/// Payload-free discriminant of [`SubnetMessage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubnetMessageKind {
    AddTargets,
    RemoveTargets,
    AddRouters,
    RemoveRouters,
    ActivateHub,
    DeactivateHub,
}

impl SubnetMessageKind {
    /// Wire-style name, e.g. `ACTIVATE_HUB`
    pub fn as_str(&self) -> &'static str {
        match self {
            SubnetMessageKind::AddTargets => "ADD_TARGETS",
            SubnetMessageKind::RemoveTargets => "REMOVE_TARGETS",
            SubnetMessageKind::AddRouters => "ADD_ROUTERS",
            SubnetMessageKind::RemoveRouters => "REMOVE_ROUTERS",
            SubnetMessageKind::ActivateHub => "ACTIVATE_HUB",
            SubnetMessageKind::DeactivateHub => "DEACTIVATE_HUB",
        }
    }
}

impl fmt::Display for SubnetMessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SubnetMessage {
    pub fn kind(&self) -> SubnetMessageKind {
        match self {
            SubnetMessage::AddTargets { .. } => SubnetMessageKind::AddTargets,
            SubnetMessage::RemoveTargets { .. } => SubnetMessageKind::RemoveTargets,
            SubnetMessage::AddRouters { .. } => SubnetMessageKind::AddRouters,
            SubnetMessage::RemoveRouters { .. } => SubnetMessageKind::RemoveRouters,
            SubnetMessage::ActivateHub { .. } => SubnetMessageKind::ActivateHub,
            SubnetMessage::DeactivateHub => SubnetMessageKind::DeactivateHub,
        }
    }

    /// Get a short description of this event
    pub fn description(&self) -> &'static str {
        match self {
            SubnetMessage::AddTargets { .. } => "targets added",
            SubnetMessage::RemoveTargets { .. } => "targets removed",
            SubnetMessage::AddRouters { .. } => "routers added",
            SubnetMessage::RemoveRouters { .. } => "routers removed",
            SubnetMessage::ActivateHub { .. } => "hub activated",
            SubnetMessage::DeactivateHub => "hub deactivated",
        }
    }

    /// Routers carried by the message, `None` for target-only kinds
    pub fn routers(&self) -> Option<&BTreeSet<RouterId>> {
        match self {
            SubnetMessage::AddRouters { routers }
            | SubnetMessage::RemoveRouters { routers }
            | SubnetMessage::ActivateHub { routers, .. } => Some(routers),
            _ => None,
        }
    }

    /// Targets carried by the message
    pub fn targets(&self) -> Option<&BTreeSet<TargetId>> {
        match self {
            SubnetMessage::AddTargets { targets }
            | SubnetMessage::RemoveTargets { targets }
            | SubnetMessage::ActivateHub { targets, .. } => Some(targets),
            _ => None,
        }
    }
}

/// A message addressed to one subnet, stamped with its emission order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetEvent {
    /// Monotonic per-manager sequence number, starting at 0
    pub sequence: u64,
    /// Subnet whose hub receives the message
    pub subnet_id: SubnetId,
    pub message: SubnetMessage,
}

impl SubnetEvent {
    pub fn kind(&self) -> SubnetMessageKind {
        self.message.kind()
    }
}

fn ids<T: fmt::Display>(items: &BTreeSet<T>) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for SubnetEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> subnet {}", self.kind(), self.subnet_id)?;
        match &self.message {
            SubnetMessage::AddTargets { targets } | SubnetMessage::RemoveTargets { targets } => {
                write!(f, " targets=[{}]", ids(targets))
            }
            SubnetMessage::AddRouters { routers } | SubnetMessage::RemoveRouters { routers } => {
                write!(f, " routers=[{}]", ids(routers))
            }
            SubnetMessage::ActivateHub { routers, targets } => {
                write!(f, " routers=[{}] targets=[{}]", ids(routers), ids(targets))
            }
            SubnetMessage::DeactivateHub => Ok(()),
        }
    }
}
