//! The player record and registry settings.

use plaza_protocol::{Facing, PlayerId, PlayerInfo, Position, ZoneId};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RegistryConfig
// ---------------------------------------------------------------------------

/// Where new players appear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Spawn point for every new player.
    pub spawn: Position,

    /// Radius of a uniform random offset added to the spawn point.
    ///
    /// With many players spawning on one spot they would all start inside
    /// each other's call radius. A small scatter avoids that. `0.0` keeps
    /// spawning deterministic.
    pub spawn_scatter: f64,
}

impl RegistryConfig {
    /// Returns a config whose spawn point is finite. A non-finite spawn
    /// falls back to the origin with a warning.
    pub fn validated(self) -> Self {
        if self.spawn.is_finite() {
            return self;
        }
        tracing::warn!(
            x = self.spawn.x,
            y = self.spawn.y,
            "non-finite spawn point, using the origin"
        );
        Self {
            spawn: Position::new(0.0, 0.0),
            ..self
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            spawn: Position::new(0.0, 0.0),
            spawn_scatter: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// One connected player.
///
/// Only [`PlayerRegistry`](crate::PlayerRegistry) can change a `Player`;
/// everyone else gets shared references or clones.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Connection identity. Stable for the life of the connection.
    pub id: PlayerId,
    /// Display name. Unauthenticated; any non-empty text.
    pub name: String,
    /// Cosmetic label with no effect on behavior.
    pub role: String,
    /// Last reported position.
    pub position: Position,
    /// Last reported facing.
    pub facing: Facing,
    /// Zone call the player currently belongs to.
    pub zone: Option<ZoneId>,
}

impl Player {
    /// The wire view of this player.
    pub fn info(&self) -> PlayerInfo {
        PlayerInfo {
            id: self.id,
            name: self.name.clone(),
            role: self.role.clone(),
            x: self.position.x,
            y: self.position.y,
            facing: self.facing,
            zone: self.zone.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_config_default_spawns_at_origin_without_scatter() {
        let config = RegistryConfig::default();
        assert_eq!(config.spawn, Position::new(0.0, 0.0));
        assert_eq!(config.spawn_scatter, 0.0);
    }

    #[test]
    fn test_validated_replaces_non_finite_spawn() {
        for (x, y) in [(f64::NAN, 0.0), (0.0, f64::INFINITY), (f64::NEG_INFINITY, f64::NAN)] {
            let config = RegistryConfig {
                spawn: Position::new(x, y),
                spawn_scatter: 3.0,
            }
            .validated();
            assert_eq!(config.spawn, Position::new(0.0, 0.0), "spawn ({x}, {y})");
            assert_eq!(config.spawn_scatter, 3.0);
        }
    }

    #[test]
    fn test_validated_keeps_finite_spawn() {
        let config = RegistryConfig {
            spawn: Position::new(-40.0, 12.5),
            spawn_scatter: 0.0,
        };
        assert_eq!(config.clone().validated(), config);
    }

    #[test]
    fn test_player_info_copies_every_field() {
        let player = Player {
            id: PlayerId(3),
            name: "ada".into(),
            role: "host".into(),
            position: Position::new(4.0, -2.0),
            facing: Facing::Right,
            zone: Some(ZoneId::new("lobby")),
        };

        let info = player.info();

        assert_eq!(info.id, PlayerId(3));
        assert_eq!(info.name, "ada");
        assert_eq!(info.role, "host");
        assert_eq!((info.x, info.y), (4.0, -2.0));
        assert_eq!(info.facing, Facing::Right);
        assert_eq!(info.zone, Some(ZoneId::new("lobby")));
    }
}
