//! World configuration.

use plaza_proximity::ProximityConfig;
use plaza_registry::RegistryConfig;
use serde::{Deserialize, Serialize};

/// Everything needed to start a world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Pairwise calls or zone calls.
    pub proximity: ProximityConfig,

    /// Spawn point and scatter for new players.
    pub registry: RegistryConfig,

    /// Capacity of the actor's command channel. Handlers wait when it is
    /// full.
    pub channel_size: usize,

    /// Undelivered messages a single player may have queued before the
    /// world drops them as too slow.
    #[serde(default = "default_outbound_capacity")]
    pub outbound_capacity: usize,
}

impl WorldConfig {
    pub const DEFAULT_CHANNEL_SIZE: usize = 256;
    pub const DEFAULT_OUTBOUND_CAPACITY: usize = 1024;
}

fn default_outbound_capacity() -> usize {
    WorldConfig::DEFAULT_OUTBOUND_CAPACITY
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            proximity: ProximityConfig::default(),
            registry: RegistryConfig::default(),
            channel_size: Self::DEFAULT_CHANNEL_SIZE,
            outbound_capacity: Self::DEFAULT_OUTBOUND_CAPACITY,
        }
    }
}
