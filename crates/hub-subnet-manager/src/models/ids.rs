//! Identifier newtypes for routers, targets and subnets

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw identifier
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// Get the raw identifier
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(
    /// Identifier of a router. Unique among all routers.
    RouterId
);

id_newtype!(
    /// Identifier of a leaf target. Unique among all targets.
    TargetId
);

id_newtype!(
    /// Identifier of a subnet, tied to the router acting as its hub
    SubnetId
);

/// Reference to a router or target, used in error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum EntityRef {
    Router(RouterId),
    Target(TargetId),
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Router(id) => write!(f, "router {}", id),
            EntityRef::Target(id) => write!(f, "target {}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_order_by_raw_value() {
        let mut routers = vec![RouterId::new(9), RouterId::new(3), RouterId::new(5)];
        routers.sort();
        assert_eq!(routers, vec![RouterId::new(3), RouterId::new(5), RouterId::new(9)]);
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let json = serde_json::to_string(&SubnetId::new(8)).unwrap();
        assert_eq!(json, "8");

        let id: TargetId = serde_json::from_str("4").unwrap();
        assert_eq!(id, TargetId::from(4));
    }

    #[test]
    fn test_entity_ref_display() {
        assert_eq!(EntityRef::Router(RouterId::new(3)).to_string(), "router 3");
        assert_eq!(EntityRef::Target(TargetId::new(4)).to_string(), "target 4");
    }
}
