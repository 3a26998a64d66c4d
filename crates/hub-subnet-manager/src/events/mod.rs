//! Subnet lifecycle events
//!
//! The manager turns every membership change into a short, ordered sequence
//! of [`SubnetEvent`]s addressed to subnet hubs and hands them to an
//! [`EventSink`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        SubnetManager                          │
//! │  ┌──────────────┐    ┌──────────────┐    ┌────────────────┐  │
//! │  │ move_routers │───►│ SubnetEvent  │───►│   EventSink    │  │
//! │  │ move_targets │    │ (sequenced)  │    │   .notify()    │  │
//! │  └──────────────┘    └──────────────┘    └───────┬────────┘  │
//! └──────────────────────────────────────────────────┼───────────┘
//!                                                    │
//!          ┌───────────────┬───────────────┬─────────┴──────┐
//!          ▼               ▼               ▼                ▼
//!   ┌─────────────┐ ┌─────────────┐ ┌──────────────┐ ┌────────────┐
//!   │InMemorySink │ │ TracingSink │ │BroadcastSink │ │ FanoutSink │
//!   └─────────────┘ └─────────────┘ └──────────────┘ └────────────┘
//! ```
//!
//! # Message kinds
//!
//! | Kind | Payload | Sent when |
//! |------|---------|-----------|
//! | `ADD_TARGETS` | targets | targets move into the subnet |
//! | `REMOVE_TARGETS` | targets | targets move out of the subnet |
//! | `ADD_ROUTERS` | routers | routers move into the subnet |
//! | `REMOVE_ROUTERS` | routers | non-hub routers leave the subnet |
//! | `ACTIVATE_HUB` | routers, targets | a subnet comes up |
//! | `DEACTIVATE_HUB` | none | a subnet loses its hub or its last router |

pub mod messages;
pub mod sink;

pub use messages::{SubnetEvent, SubnetMessage, SubnetMessageKind};
pub use sink::{BroadcastSink, EventSink, FanoutSink, InMemorySink, TracingSink};
