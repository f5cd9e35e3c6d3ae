//! The registry: every connected player, keyed by connection id.
//!
//! # Concurrency note
//!
//! `PlayerRegistry` is a plain owned struct, not a concurrent map. Exactly
//! one task (the world actor) owns it and applies mutations one at a time,
//! which is what rules out a `remove` racing a read of the same id.

use std::collections::HashMap;

use plaza_protocol::{Facing, PlayerId, Position, ZoneId};
use rand::Rng;

use crate::{Player, RegistryConfig, RegistryError};

/// All players currently in the world.
///
/// ```text
/// register() --> [present] --update_position()--> [present]
///                    |
///                    +--remove()--> [gone]  (further updates: UnknownConnection)
/// ```
pub struct PlayerRegistry {
    players: HashMap<PlayerId, Player>,

    /// Join order, kept in step with `players`. Only used so snapshots come
    /// out in a stable order.
    order: Vec<PlayerId>,

    config: RegistryConfig,
}

impl PlayerRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            players: HashMap::new(),
            order: Vec::new(),
            config: config.validated(),
        }
    }

    /// Adds a player at the spawn point.
    ///
    /// # Errors
    /// [`RegistryError::DuplicateConnection`] if `id` is already present.
    /// The existing record is left untouched.
    pub fn register(
        &mut self,
        id: PlayerId,
        name: impl Into<String>,
        role: impl Into<String>,
    ) -> Result<&Player, RegistryError> {
        if self.players.contains_key(&id) {
            tracing::error!(player_id = %id, "duplicate registration rejected");
            return Err(RegistryError::DuplicateConnection(id));
        }

        let player = Player {
            id,
            name: name.into(),
            role: role.into(),
            position: self.spawn_position(),
            facing: Facing::default(),
            zone: None,
        };
        tracing::info!(
            player_id = %id,
            name = %player.name,
            x = player.position.x,
            y = player.position.y,
            "player registered"
        );

        self.order.push(id);
        self.players.insert(id, player);
        Ok(self.players.get(&id).expect("just inserted"))
    }

    /// Records a new position and facing.
    ///
    /// Coordinates are taken as given; bounds and collisions are somebody
    /// else's concern.
    ///
    /// # Errors
    /// [`RegistryError::UnknownConnection`] if `id` is not registered. A
    /// removed player is never brought back by a late update.
    pub fn update_position(
        &mut self,
        id: PlayerId,
        position: Position,
        facing: Facing,
    ) -> Result<&Player, RegistryError> {
        let player = self
            .players
            .get_mut(&id)
            .ok_or(RegistryError::UnknownConnection(id))?;
        player.position = position;
        player.facing = facing;
        Ok(player)
    }

    /// Records which zone call the player is in (`None` for none).
    ///
    /// # Errors
    /// [`RegistryError::UnknownConnection`] if `id` is not registered.
    pub fn set_zone(&mut self, id: PlayerId, zone: Option<ZoneId>) -> Result<(), RegistryError> {
        let player = self
            .players
            .get_mut(&id)
            .ok_or(RegistryError::UnknownConnection(id))?;
        player.zone = zone;
        Ok(())
    }

    /// Removes a player. Idempotent: a second call returns `None`.
    pub fn remove(&mut self, id: PlayerId) -> Option<Player> {
        let removed = self.players.remove(&id)?;
        self.order.retain(|p| *p != id);
        tracing::info!(player_id = %id, "player removed");
        Some(removed)
    }

    /// Clones every player in join order.
    pub fn snapshot(&self) -> Vec<Player> {
        self.iter().cloned().collect()
    }

    /// Iterates players in join order without cloning.
    pub fn iter(&self) -> impl Iterator<Item = &Player> + '_ {
        self.order.iter().filter_map(|id| self.players.get(id))
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    fn spawn_position(&self) -> Position {
        let spawn = self.config.spawn;
        let scatter = self.config.spawn_scatter;
        if !(scatter.is_finite() && scatter > 0.0) {
            return spawn;
        }
        // sqrt keeps the points uniform over the disc instead of bunching
        // up at the center.
        let mut rng = rand::rng();
        let angle = rng.random_range(0.0..std::f64::consts::TAU);
        let radius = scatter * rng.random::<f64>().sqrt();
        Position::new(spawn.x + radius * angle.cos(), spawn.y + radius * angle.sin())
    }
}

impl Default for PlayerRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}
