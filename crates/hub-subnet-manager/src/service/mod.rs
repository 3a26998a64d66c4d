//! Subnet membership service

mod config;
mod invariants;
mod manager;
mod shared;

pub use config::SubnetManagerConfig;
pub use invariants::InvariantViolation;
pub use manager::{MoveSummary, SubnetManager, SubnetManagerBuilder};
pub use shared::SharedSubnetManager;
