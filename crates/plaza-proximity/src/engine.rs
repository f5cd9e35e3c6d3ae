//! The proximity engine: registry in, relationships out.
//!
//! No spatial index. At tens of players a linear scan per update is cheaper
//! than keeping an index in sync, and it makes the exact-threshold rule
//! trivial to get right.

use std::collections::BTreeSet;
use std::sync::Arc;

use plaza_protocol::{PlayerId, Position};
use plaza_registry::PlayerRegistry;

use crate::{PeerPair, ProximityConfig, Relationship, Zone, ZoneError, ZoneTable};

/// The rule in force for this world.
#[derive(Debug, Clone)]
pub enum ProximityStrategy {
    /// Pair players strictly closer than `threshold`.
    Pairwise { threshold: f64 },
    /// Put players into the zone they stand in.
    Zones(Arc<ZoneTable>),
}

/// Strictly-less-than distance test with a symmetric result.
///
/// The two endpoints are put in id order before any arithmetic, so asking
/// "is B near A" runs the exact same float operations as "is A near B".
pub fn within(a: (PlayerId, Position), b: (PlayerId, Position), threshold: f64) -> bool {
    let (p, q) = if a.0 <= b.0 { (a.1, b.1) } else { (b.1, a.1) };
    (p.x - q.x).hypot(p.y - q.y) < threshold
}

/// Computes relationships from the current registry state.
#[derive(Debug, Clone)]
pub struct ProximityEngine {
    strategy: ProximityStrategy,
}

impl ProximityEngine {
    pub fn pairwise(threshold: f64) -> Self {
        Self {
            strategy: ProximityStrategy::Pairwise { threshold },
        }
    }

    pub fn zones(table: ZoneTable) -> Self {
        Self {
            strategy: ProximityStrategy::Zones(Arc::new(table)),
        }
    }

    /// Builds the engine a deployment asked for, loading the map if needed.
    ///
    /// # Errors
    /// Any [`ZoneError`] from reading or parsing the map.
    pub fn from_config(config: &ProximityConfig) -> Result<Self, ZoneError> {
        match config.clone().validated() {
            ProximityConfig::Pairwise { threshold } => Ok(Self::pairwise(threshold)),
            ProximityConfig::Zones {
                map_path,
                room_property,
            } => Ok(Self::zones(ZoneTable::load(map_path, &room_property)?)),
        }
    }

    pub fn strategy(&self) -> &ProximityStrategy {
        &self.strategy
    }

    /// Other players strictly within the call radius of `player`.
    ///
    /// Empty under the zone strategy, or if `player` is not registered.
    pub fn neighbors(&self, player: PlayerId, registry: &PlayerRegistry) -> BTreeSet<PlayerId> {
        let ProximityStrategy::Pairwise { threshold } = self.strategy else {
            return BTreeSet::new();
        };
        let Some(me) = registry.get(player) else {
            return BTreeSet::new();
        };
        registry
            .iter()
            .filter(|other| other.id != player)
            .filter(|other| within((me.id, me.position), (other.id, other.position), threshold))
            .map(|other| other.id)
            .collect()
    }

    /// The zone containing `pos`, first-loaded-wins. Always `None` under
    /// the pairwise strategy.
    pub fn zone_for(&self, pos: Position) -> Option<&Zone> {
        match &self.strategy {
            ProximityStrategy::Zones(table) => table.zone_for(pos),
            ProximityStrategy::Pairwise { .. } => None,
        }
    }

    /// Every relationship currently true that involves `player`.
    pub fn relationships_for(
        &self,
        player: PlayerId,
        registry: &PlayerRegistry,
    ) -> BTreeSet<Relationship> {
        match &self.strategy {
            ProximityStrategy::Pairwise { .. } => self
                .neighbors(player, registry)
                .into_iter()
                .filter_map(|other| PeerPair::new(player, other))
                .map(Relationship::Pair)
                .collect(),
            ProximityStrategy::Zones(_) => registry
                .get(player)
                .and_then(|p| self.zone_for(p.position))
                .map(|zone| zone_relationship(player, zone))
                .into_iter()
                .collect(),
        }
    }

    /// Every relationship currently true in the whole world.
    ///
    /// Each unordered pair is measured once.
    pub fn relationships(&self, registry: &PlayerRegistry) -> BTreeSet<Relationship> {
        match &self.strategy {
            ProximityStrategy::Pairwise { threshold } => {
                let players: Vec<_> = registry.iter().collect();
                let mut out = BTreeSet::new();
                for (i, a) in players.iter().enumerate() {
                    for b in &players[i + 1..] {
                        if within((a.id, a.position), (b.id, b.position), *threshold) {
                            if let Some(pair) = PeerPair::new(a.id, b.id) {
                                out.insert(Relationship::Pair(pair));
                            }
                        }
                    }
                }
                out
            }
            ProximityStrategy::Zones(table) => registry
                .iter()
                .filter_map(|p| table.zone_for(p.position).map(|z| zone_relationship(p.id, z)))
                .collect(),
        }
    }
}

fn zone_relationship(player: PlayerId, zone: &Zone) -> Relationship {
    Relationship::Zone {
        player,
        zone: zone.id.clone(),
        room: zone.room.clone(),
    }
}
