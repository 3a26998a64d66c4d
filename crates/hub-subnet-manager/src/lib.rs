//! Hub Subnet Manager
//!
//! Tracks which routers and leaf targets belong to which subnet and keeps
//! subnet structure consistent as members move:
//! - Every subnet is identified by the router acting as its hub
//! - A subnet is active while at least one router belongs to it
//! - A subnet never outlives its hub: when the hub leaves, the remaining
//!   members fold into a successor subnet or the subnet is torn down
//!
//! Features:
//! - Batched router and target moves with validate-then-commit semantics
//! - Ordered hub lifecycle events delivered to pluggable sinks
//! - Injectable hub identity scheme
//! - Lock-protected handle for concurrent callers
//! - TOML-scripted scenarios and membership snapshots for reporting
//!
//! # Example
//!
//! ```
//! use hub_subnet_manager::{InMemorySink, SubnetId, SubnetManager};
//! use std::sync::Arc;
//!
//! let sink = Arc::new(InMemorySink::new());
//! let mut manager = SubnetManager::builder()
//!     .routers([3u64, 5, 7, 9])
//!     .targets([1u64, 2, 3, 4])
//!     .sink(sink.clone())
//!     .build()?;
//!
//! manager.move_targets([1u64, 3], Some(SubnetId::new(2)))?;
//! manager.move_routers([5u64, 7], Some(SubnetId::new(2)))?;
//!
//! assert_eq!(manager.routers_in(SubnetId::new(2)).len(), 3);
//! assert_eq!(sink.len(), 4);
//! # Ok::<(), hub_subnet_manager::Error>(())
//! ```

pub mod error;
pub mod events;
pub mod models;
pub mod scenario;
pub mod service;

// Re-export core types
pub use error::{Error, Result};
pub use events::{
    BroadcastSink, EventSink, FanoutSink, InMemorySink, SubnetEvent, SubnetMessage,
    SubnetMessageKind, TracingSink,
};
pub use models::{
    EntityRef, IdScheme, NetworkSnapshot, OffsetIdScheme, RouterId, SubnetId, SubnetMembers,
    TargetId,
};
pub use scenario::{Scenario, ScenarioError, ScenarioReport, Step, StepReport};
pub use service::{
    InvariantViolation, MoveSummary, SharedSubnetManager, SubnetManager, SubnetManagerBuilder,
    SubnetManagerConfig,
};
