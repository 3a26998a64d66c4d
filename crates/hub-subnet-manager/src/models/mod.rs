//! Data models for subnet membership

mod ids;
mod scheme;
mod snapshot;

pub use ids::{EntityRef, RouterId, SubnetId, TargetId};
pub use scheme::{IdScheme, OffsetIdScheme};
pub use snapshot::{NetworkSnapshot, SubnetMembers};
