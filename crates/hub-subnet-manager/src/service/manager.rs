//! Subnet Manager Service
//!
//! Owns the router and target membership tables and recomputes subnet
//! structure when members move:
//! - Hub activation when a new subnet gains its first routers
//! - Successor election when a hub leaves routers behind
//! - Teardown and target detachment when a subnet is evacuated
//!
//! Every request is validated in full before the first mutation or event,
//! so a rejected move leaves the network untouched.

use super::config::SubnetManagerConfig;
use super::invariants::{self, InvariantViolation};
use crate::events::{EventSink, SubnetEvent, SubnetMessage, TracingSink};
use crate::models::{
    EntityRef, IdScheme, NetworkSnapshot, RouterId, SubnetId, SubnetMembers, TargetId,
};
use crate::{Error, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// What a single move changed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MoveSummary {
    /// Number of events handed to the sink
    pub events: usize,
    /// Subnets that received `ACTIVATE_HUB`, in emission order
    pub activated: Vec<SubnetId>,
    /// Subnets that received `DEACTIVATE_HUB`, in emission order
    pub deactivated: Vec<SubnetId>,
    /// Targets left without a subnet by a teardown
    pub detached_targets: BTreeSet<TargetId>,
}

/// Builder for [`SubnetManager`]
#[derive(Default)]
pub struct SubnetManagerBuilder {
    routers: Vec<RouterId>,
    targets: Vec<TargetId>,
    config: SubnetManagerConfig,
    id_scheme: Option<Arc<dyn IdScheme>>,
    sink: Option<Arc<dyn EventSink>>,
}

impl SubnetManagerBuilder {
    /// Router universe. Every router starts as the hub of its own subnet.
    pub fn routers<I>(mut self, routers: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<RouterId>,
    {
        self.routers.extend(routers.into_iter().map(Into::into));
        self
    }

    /// Target universe. Every target starts unassigned.
    pub fn targets<I>(mut self, targets: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<TargetId>,
    {
        self.targets.extend(targets.into_iter().map(Into::into));
        self
    }

    pub fn config(mut self, config: SubnetManagerConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the hub scheme. Defaults to the config's offset scheme.
    pub fn id_scheme(mut self, scheme: Arc<dyn IdScheme>) -> Self {
        self.id_scheme = Some(scheme);
        self
    }

    /// Event destination. Defaults to [`TracingSink`].
    pub fn sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn build(self) -> Result<SubnetManager> {
        let id_scheme = self
            .id_scheme
            .unwrap_or_else(|| Arc::new(self.config.id_scheme()) as Arc<dyn IdScheme>);
        let sink = self
            .sink
            .unwrap_or_else(|| Arc::new(TracingSink) as Arc<dyn EventSink>);

        let mut router_subnets = BTreeMap::new();
        for router in self.routers {
            let hosted = id_scheme.subnet_of_hub(router);
            if router_subnets.insert(router, Some(hosted)).is_some() {
                return Err(Error::DuplicateEntity(EntityRef::Router(router)));
            }
        }

        let mut target_subnets = BTreeMap::new();
        for target in self.targets {
            if target_subnets.insert(target, None).is_some() {
                return Err(Error::DuplicateEntity(EntityRef::Target(target)));
            }
        }

        let manager = SubnetManager {
            config: self.config,
            id_scheme,
            sink,
            router_subnets,
            target_subnets,
            next_sequence: 0,
        };
        manager.verify()?;

        tracing::info!(
            routers = manager.router_subnets.len(),
            targets = manager.target_subnets.len(),
            "Created subnet manager"
        );

        Ok(manager)
    }
}

/// Subnet Manager - membership tables plus the reassignment algorithm
pub struct SubnetManager {
    /// Configuration
    config: SubnetManagerConfig,
    /// Hub <-> subnet identity mapping
    id_scheme: Arc<dyn IdScheme>,
    /// Destination for lifecycle events
    sink: Arc<dyn EventSink>,
    /// Current subnet of every router (`None` = detached)
    router_subnets: BTreeMap<RouterId, Option<SubnetId>>,
    /// Current subnet of every target (`None` = unassigned)
    target_subnets: BTreeMap<TargetId, Option<SubnetId>>,
    /// Sequence number of the next event
    next_sequence: u64,
}

impl SubnetManager {
    pub fn builder() -> SubnetManagerBuilder {
        SubnetManagerBuilder::default()
    }

    // ==================== Target Moves ====================

    /// Move `targets` to `new_subnet` (`None` unassigns them).
    ///
    /// Emits one `ADD_TARGETS` for the whole batch, then one
    /// `REMOVE_TARGETS` per subnet the targets came from.
    pub fn move_targets<I>(&mut self, targets: I, new_subnet: Option<SubnetId>) -> Result<MoveSummary>
    where
        I: IntoIterator,
        I::Item: Into<TargetId>,
    {
        let targets: BTreeSet<TargetId> = targets.into_iter().map(Into::into).collect();

        if let Some(unknown) = targets
            .iter()
            .find(|target| !self.target_subnets.contains_key(*target))
        {
            tracing::warn!(target_id = %unknown, "Rejected target move: unknown target");
            return Err(Error::UnknownEntity(EntityRef::Target(*unknown)));
        }
        if let Some(subnet) = new_subnet {
            if !self.is_active(subnet) {
                tracing::warn!(subnet_id = %subnet, "Rejected target move: subnet is not active");
                return Err(Error::InactiveSubnet(subnet));
            }
        }

        let mut summary = MoveSummary::default();
        if targets.is_empty() {
            tracing::debug!("Empty target batch, nothing to move");
            return Ok(summary);
        }

        tracing::info!(targets = ?targets, subnet_id = ?new_subnet, "Moving targets");

        let mut removed_by_subnet: BTreeMap<SubnetId, BTreeSet<TargetId>> = BTreeMap::new();
        for &target in &targets {
            let prior = self.target_subnets.insert(target, new_subnet).flatten();
            if let Some(prior) = prior.filter(|prior| Some(*prior) != new_subnet) {
                removed_by_subnet.entry(prior).or_default().insert(target);
            }
        }

        if let Some(subnet) = new_subnet {
            self.emit(subnet, SubnetMessage::AddTargets { targets }, &mut summary);
        }
        for (subnet, removed) in removed_by_subnet {
            self.emit(
                subnet,
                SubnetMessage::RemoveTargets { targets: removed },
                &mut summary,
            );
        }

        self.verify()?;
        Ok(summary)
    }

    // ==================== Router Moves ====================

    /// Move `routers` to `new_subnet` (`None` detaches them).
    ///
    /// Moving into an inactive subnet activates it and requires that
    /// subnet's hub router to be part of the batch. Every subnet the routers
    /// left is then re-evaluated in ascending ID order:
    /// - no routers left: `DEACTIVATE_HUB`, its targets become unassigned
    /// - hub left, others stayed: `DEACTIVATE_HUB`, remaining members fold
    ///   into the subnet hosted by the lowest remaining router
    /// - hub stayed: `REMOVE_ROUTERS` with the departed routers
    pub fn move_routers<I>(&mut self, routers: I, new_subnet: Option<SubnetId>) -> Result<MoveSummary>
    where
        I: IntoIterator,
        I::Item: Into<RouterId>,
    {
        let routers: BTreeSet<RouterId> = routers.into_iter().map(Into::into).collect();

        if let Some(unknown) = routers
            .iter()
            .find(|router| !self.router_subnets.contains_key(*router))
        {
            tracing::warn!(router_id = %unknown, "Rejected router move: unknown router");
            return Err(Error::UnknownEntity(EntityRef::Router(*unknown)));
        }

        let mut summary = MoveSummary::default();
        if routers.is_empty() {
            tracing::debug!("Empty router batch, nothing to move");
            return Ok(summary);
        }

        let activating = match new_subnet {
            Some(subnet) if !self.is_active(subnet) => {
                let hub = self.id_scheme.hub_of_subnet(subnet);
                if !routers.contains(&hub) {
                    tracing::warn!(
                        subnet_id = %subnet,
                        hub = %hub,
                        "Rejected router move: hub router missing from new subnet"
                    );
                    return Err(Error::InvalidHubAssignment { subnet, hub });
                }
                true
            }
            _ => false,
        };

        tracing::info!(routers = ?routers, subnet_id = ?new_subnet, "Moving routers");

        if let Some(subnet) = new_subnet {
            if activating {
                self.emit(
                    subnet,
                    SubnetMessage::ActivateHub {
                        routers: routers.clone(),
                        targets: BTreeSet::new(),
                    },
                    &mut summary,
                );
                summary.activated.push(subnet);
            }
            self.emit(
                subnet,
                SubnetMessage::AddRouters {
                    routers: routers.clone(),
                },
                &mut summary,
            );
        }

        let mut departed_by_subnet: BTreeMap<SubnetId, BTreeSet<RouterId>> = BTreeMap::new();
        for &router in &routers {
            let prior = self.router_subnets.insert(router, new_subnet).flatten();
            if let Some(prior) = prior.filter(|prior| Some(*prior) != new_subnet) {
                departed_by_subnet.entry(prior).or_default().insert(router);
            }
        }

        for (vacated, departed) in departed_by_subnet {
            self.settle_vacated(vacated, departed, &mut summary);
        }

        self.verify()?;
        Ok(summary)
    }

    /// Re-evaluate a subnet that just lost `departed` routers
    fn settle_vacated(
        &mut self,
        vacated: SubnetId,
        departed: BTreeSet<RouterId>,
        summary: &mut MoveSummary,
    ) {
        let remaining_routers = self.routers_in(vacated);
        let remaining_targets = self.targets_in(vacated);
        let hub = self.id_scheme.hub_of_subnet(vacated);

        match remaining_routers.first().copied() {
            None => {
                self.emit(vacated, SubnetMessage::DeactivateHub, summary);
                summary.deactivated.push(vacated);

                for target in &remaining_targets {
                    self.target_subnets.insert(*target, None);
                }
                tracing::info!(
                    subnet_id = %vacated,
                    detached_targets = remaining_targets.len(),
                    "Subnet evacuated, hub deactivated"
                );
                summary.detached_targets.extend(remaining_targets);
            }
            Some(lowest) if departed.contains(&hub) => {
                self.emit(vacated, SubnetMessage::DeactivateHub, summary);
                summary.deactivated.push(vacated);

                let successor = self.id_scheme.subnet_of_hub(lowest);
                for router in &remaining_routers {
                    self.router_subnets.insert(*router, Some(successor));
                }
                for target in &remaining_targets {
                    self.target_subnets.insert(*target, Some(successor));
                }
                tracing::info!(
                    subnet_id = %vacated,
                    successor = %successor,
                    hub = %lowest,
                    "Hub left subnet, remaining members moved to successor"
                );

                self.emit(
                    successor,
                    SubnetMessage::ActivateHub {
                        routers: remaining_routers,
                        targets: remaining_targets,
                    },
                    summary,
                );
                summary.activated.push(successor);
            }
            Some(_) => {
                self.emit(
                    vacated,
                    SubnetMessage::RemoveRouters { routers: departed },
                    summary,
                );
            }
        }
    }

    fn emit(&mut self, subnet_id: SubnetId, message: SubnetMessage, summary: &mut MoveSummary) {
        let event = SubnetEvent {
            sequence: self.next_sequence,
            subnet_id,
            message,
        };
        self.next_sequence += 1;

        tracing::debug!(
            sequence = event.sequence,
            subnet_id = %subnet_id,
            kind = %event.kind(),
            "Emitting subnet event"
        );
        self.sink.notify(&event);
        summary.events += 1;
    }

    fn verify(&self) -> Result<()> {
        if !self.config.verify_invariants {
            return Ok(());
        }
        if let Err(e) = self.check_invariants() {
            tracing::error!(error = %e, "Network invariant check failed");
            return Err(e);
        }
        Ok(())
    }

    // ==================== Queries ====================

    /// Routers currently in `subnet`, ascending
    pub fn routers_in(&self, subnet: SubnetId) -> BTreeSet<RouterId> {
        self.router_subnets
            .iter()
            .filter(|(_, current)| **current == Some(subnet))
            .map(|(router, _)| *router)
            .collect()
    }

    /// Targets currently in `subnet`, ascending
    pub fn targets_in(&self, subnet: SubnetId) -> BTreeSet<TargetId> {
        self.target_subnets
            .iter()
            .filter(|(_, current)| **current == Some(subnet))
            .map(|(target, _)| *target)
            .collect()
    }

    /// Subnet a router currently belongs to
    pub fn subnet_of_router(&self, router: RouterId) -> Result<Option<SubnetId>> {
        self.router_subnets
            .get(&router)
            .copied()
            .ok_or(Error::UnknownEntity(EntityRef::Router(router)))
    }

    /// Subnet a target currently belongs to
    pub fn subnet_of_target(&self, target: TargetId) -> Result<Option<SubnetId>> {
        self.target_subnets
            .get(&target)
            .copied()
            .ok_or(Error::UnknownEntity(EntityRef::Target(target)))
    }

    /// A subnet is active while at least one router belongs to it
    pub fn is_active(&self, subnet: SubnetId) -> bool {
        self.router_subnets
            .values()
            .any(|current| *current == Some(subnet))
    }

    pub fn active_subnets(&self) -> BTreeSet<SubnetId> {
        self.router_subnets.values().flatten().copied().collect()
    }

    /// Hub router of `subnet` under the configured scheme
    pub fn hub_of(&self, subnet: SubnetId) -> RouterId {
        self.id_scheme.hub_of_subnet(subnet)
    }

    /// Router universe, ascending
    pub fn routers(&self) -> impl Iterator<Item = RouterId> + '_ {
        self.router_subnets.keys().copied()
    }

    /// Target universe, ascending
    pub fn targets(&self) -> impl Iterator<Item = TargetId> + '_ {
        self.target_subnets.keys().copied()
    }

    /// Number of events emitted so far
    pub fn events_emitted(&self) -> u64 {
        self.next_sequence
    }

    pub fn config(&self) -> &SubnetManagerConfig {
        &self.config
    }

    /// Copy of the membership tables grouped by subnet
    pub fn snapshot(&self) -> NetworkSnapshot {
        let mut snapshot = NetworkSnapshot::default();

        for (router, subnet) in &self.router_subnets {
            match subnet {
                Some(subnet) => {
                    snapshot
                        .subnets
                        .entry(*subnet)
                        .or_insert_with(SubnetMembers::default)
                        .routers
                        .insert(*router);
                }
                None => {
                    snapshot.detached_routers.insert(*router);
                }
            }
        }

        for (target, subnet) in &self.target_subnets {
            match subnet {
                Some(subnet) => {
                    snapshot
                        .subnets
                        .entry(*subnet)
                        .or_insert_with(SubnetMembers::default)
                        .targets
                        .insert(*target);
                }
                None => {
                    snapshot.unassigned_targets.insert(*target);
                }
            }
        }

        snapshot
    }

    // ==================== Invariants ====================

    /// All hub-presence and target-placement violations in the current state
    pub fn invariant_violations(&self) -> Vec<InvariantViolation> {
        invariants::find_violations(
            &self.router_subnets,
            &self.target_subnets,
            self.id_scheme.as_ref(),
        )
    }

    /// Fails with the first violation found, if any
    pub fn check_invariants(&self) -> Result<()> {
        match self.invariant_violations().into_iter().next() {
            Some(violation) => Err(Error::InvariantViolated(violation.to_string())),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for SubnetManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubnetManager")
            .field("config", &self.config)
            .field("router_subnets", &self.router_subnets)
            .field("target_subnets", &self.target_subnets)
            .field("next_sequence", &self.next_sequence)
            .finish_non_exhaustive()
    }
}
