//! Manager configuration

use crate::models::OffsetIdScheme;
use serde::{Deserialize, Serialize};

/// Configuration for SubnetManager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetManagerConfig {
    /// Offset used by the default hub scheme (`subnet = router - hub_offset`)
    #[serde(default = "default_hub_offset")]
    pub hub_offset: u64,

    /// Re-check membership invariants after every move
    #[serde(default = "default_true")]
    pub verify_invariants: bool,
}

fn default_hub_offset() -> u64 {
    OffsetIdScheme::DEFAULT_OFFSET
}

fn default_true() -> bool {
    true
}

impl Default for SubnetManagerConfig {
    fn default() -> Self {
        Self {
            hub_offset: default_hub_offset(),
            verify_invariants: true,
        }
    }
}

impl SubnetManagerConfig {
    /// Id scheme derived from this configuration
    pub fn id_scheme(&self) -> OffsetIdScheme {
        OffsetIdScheme::new(self.hub_offset)
    }
}
