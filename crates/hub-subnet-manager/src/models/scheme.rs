//! Hub identity scheme
//!
//! A subnet's identity is tied to the router acting as its hub. The
//! [`IdScheme`] maps between the two and is injected into the manager so
//! deployments can choose their own convention.

use super::ids::{RouterId, SubnetId};

/// Mapping between hub routers and the subnets they host.
///
/// Implementations must be total, deterministic and mutually inverse:
/// `hub_of_subnet(subnet_of_hub(r)) == r` for every router `r`.
pub trait IdScheme: Send + Sync {
    /// Subnet that `router` hosts when activated as a hub
    fn subnet_of_hub(&self, router: RouterId) -> SubnetId;

    /// Router that acts as the hub of `subnet`
    fn hub_of_subnet(&self, subnet: SubnetId) -> RouterId;
}

/// Fixed-offset convention: `subnet = router - offset`.
///
/// Arithmetic wraps so both directions stay total over the whole ID space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetIdScheme {
    offset: u64,
}

impl OffsetIdScheme {
    /// Default hub offset
    pub const DEFAULT_OFFSET: u64 = 1;

    pub fn new(offset: u64) -> Self {
        Self { offset }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }
}

impl Default for OffsetIdScheme {
    fn default() -> Self {
        Self::new(Self::DEFAULT_OFFSET)
    }
}

impl IdScheme for OffsetIdScheme {
    fn subnet_of_hub(&self, router: RouterId) -> SubnetId {
        SubnetId::new(router.get().wrapping_sub(self.offset))
    }

    fn hub_of_subnet(&self, subnet: SubnetId) -> RouterId {
        RouterId::new(subnet.get().wrapping_add(self.offset))
    }
}
