//! Error types for subnet membership management

use crate::models::{EntityRef, RouterId, SubnetId};
use thiserror::Error;

/// Result type for subnet operations
pub type Result<T> = std::result::Result<T, Error>;

/// Subnet manager errors
///
/// Every variant except `InvariantViolated` is raised before the network
/// is mutated or any event is emitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    // Universe errors
    #[error("Unknown {0}")]
    UnknownEntity(EntityRef),

    #[error("Duplicate {0} in network universe")]
    DuplicateEntity(EntityRef),

    // Subnet errors
    #[error("Cannot activate subnet {subnet}: hub router {hub} is not being moved into it")]
    InvalidHubAssignment { subnet: SubnetId, hub: RouterId },

    #[error("Subnet {0} is not active")]
    InactiveSubnet(SubnetId),

    // Internal consistency
    #[error("Network invariant violated: {0}")]
    InvariantViolated(String),
}

impl Error {
    /// True for errors caused by referencing an ID outside the fixed universe
    pub fn is_unknown_entity(&self) -> bool {
        matches!(self, Error::UnknownEntity(_))
    }
}
