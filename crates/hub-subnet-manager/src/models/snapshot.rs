//! Read-only view of network membership for reporting

use super::ids::{RouterId, SubnetId, TargetId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Routers and targets belonging to one active subnet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetMembers {
    pub routers: BTreeSet<RouterId>,
    pub targets: BTreeSet<TargetId>,
}

/// Point-in-time copy of the whole membership table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    /// Active subnets keyed by ID
    pub subnets: BTreeMap<SubnetId, SubnetMembers>,
    /// Routers that currently belong to no subnet
    pub detached_routers: BTreeSet<RouterId>,
    /// Targets that currently belong to no subnet
    pub unassigned_targets: BTreeSet<TargetId>,
}

impl NetworkSnapshot {
    /// Number of active subnets
    pub fn subnet_count(&self) -> usize {
        self.subnets.len()
    }

    /// Members of `subnet`, if it is active
    pub fn members(&self, subnet: SubnetId) -> Option<&SubnetMembers> {
        self.subnets.get(&subnet)
    }
}

fn join<T: fmt::Display>(items: impl IntoIterator<Item = T>) -> String {
    items
        .into_iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for NetworkSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (subnet, members) in &self.subnets {
            writeln!(
                f,
                "Subnet {}: [{}] -> [{}]",
                subnet,
                join(&members.routers),
                join(&members.targets)
            )?;
        }
        if !self.detached_routers.is_empty() {
            writeln!(f, "Detached routers: [{}]", join(&self.detached_routers))?;
        }
        if !self.unassigned_targets.is_empty() {
            writeln!(f, "Unassigned targets: [{}]", join(&self.unassigned_targets))?;
        }
        Ok(())
    }
}
