//! Membership invariants
//!
//! A subnet is active exactly while some router belongs to it, so activity
//! itself needs no check. What can go wrong is placement:
//! - an active subnet whose hub router lives elsewhere
//! - a target assigned to a subnet no router holds

use crate::models::{IdScheme, RouterId, SubnetId, TargetId};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A single broken membership rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Active subnet whose hub router belongs to another subnet or none
    HubAbsent {
        subnet: SubnetId,
        hub: RouterId,
        hub_subnet: Option<SubnetId>,
    },
    /// Active subnet whose hub is not a known router at all
    HubUnknown { subnet: SubnetId, hub: RouterId },
    /// Target assigned to an inactive subnet
    OrphanedTarget { target: TargetId, subnet: SubnetId },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvariantViolation::HubAbsent {
                subnet,
                hub,
                hub_subnet: Some(other),
            } => write!(f, "subnet {subnet} is active but hub {hub} is in subnet {other}"),
            InvariantViolation::HubAbsent { subnet, hub, .. } => {
                write!(f, "subnet {subnet} is active but hub {hub} is detached")
            }
            InvariantViolation::HubUnknown { subnet, hub } => {
                write!(f, "subnet {subnet} is active but its hub {hub} is not a known router")
            }
            InvariantViolation::OrphanedTarget { target, subnet } => {
                write!(f, "target {target} is assigned to inactive subnet {subnet}")
            }
        }
    }
}

/// Collect every violation, subnets first then targets, in ascending order
pub(crate) fn find_violations(
    router_subnets: &BTreeMap<RouterId, Option<SubnetId>>,
    target_subnets: &BTreeMap<TargetId, Option<SubnetId>>,
    id_scheme: &dyn IdScheme,
) -> Vec<InvariantViolation> {
    let active: BTreeSet<SubnetId> = router_subnets.values().flatten().copied().collect();
    let mut violations = Vec::new();

    for &subnet in &active {
        let hub = id_scheme.hub_of_subnet(subnet);
        match router_subnets.get(&hub) {
            None => violations.push(InvariantViolation::HubUnknown { subnet, hub }),
            Some(&hub_subnet) if hub_subnet != Some(subnet) => {
                violations.push(InvariantViolation::HubAbsent {
                    subnet,
                    hub,
                    hub_subnet,
                });
            }
            Some(_) => {}
        }
    }

    for (&target, &subnet) in target_subnets {
        if let Some(subnet) = subnet.filter(|subnet| !active.contains(subnet)) {
            violations.push(InvariantViolation::OrphanedTarget { target, subnet });
        }
    }

    violations
}
