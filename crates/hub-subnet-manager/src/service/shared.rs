//! Thread-safe handle around [`SubnetManager`]
//!
//! Vacancy evaluation reads the state produced by the router reassignment
//! of the same call, so two moves must never interleave. The handle runs
//! each move, including event delivery, under one exclusive lock.

use super::manager::{MoveSummary, SubnetManager};
use crate::models::{NetworkSnapshot, RouterId, SubnetId, TargetId};
use crate::Result;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Cloneable, lock-protected subnet manager
#[derive(Clone, Debug)]
pub struct SharedSubnetManager {
    inner: Arc<Mutex<SubnetManager>>,
}

impl SharedSubnetManager {
    pub fn new(manager: SubnetManager) -> Self {
        Self {
            inner: Arc::new(Mutex::new(manager)),
        }
    }

    pub fn move_targets<I>(&self, targets: I, new_subnet: Option<SubnetId>) -> Result<MoveSummary>
    where
        I: IntoIterator,
        I::Item: Into<TargetId>,
    {
        self.inner.lock().move_targets(targets, new_subnet)
    }

    pub fn move_routers<I>(&self, routers: I, new_subnet: Option<SubnetId>) -> Result<MoveSummary>
    where
        I: IntoIterator,
        I::Item: Into<RouterId>,
    {
        self.inner.lock().move_routers(routers, new_subnet)
    }

    pub fn routers_in(&self, subnet: SubnetId) -> BTreeSet<RouterId> {
        self.inner.lock().routers_in(subnet)
    }

    pub fn targets_in(&self, subnet: SubnetId) -> BTreeSet<TargetId> {
        self.inner.lock().targets_in(subnet)
    }

    pub fn snapshot(&self) -> NetworkSnapshot {
        self.inner.lock().snapshot()
    }

    pub fn check_invariants(&self) -> Result<()> {
        self.inner.lock().check_invariants()
    }

    /// Run `f` with exclusive access, for multi-step reads or custom queries
    pub fn with<R>(&self, f: impl FnOnce(&mut SubnetManager) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl From<SubnetManager> for SharedSubnetManager {
    fn from(manager: SubnetManager) -> Self {
        Self::new(manager)
    }
}
