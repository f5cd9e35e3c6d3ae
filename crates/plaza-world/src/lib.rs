//! The world: one task that owns all shared state.
//!
//! A single actor owns the [`PlayerRegistry`](plaza_registry::PlayerRegistry),
//! the [`ProximityEngine`](plaza_proximity::ProximityEngine) and the
//! [`CallOrchestrator`](plaza_call::CallOrchestrator). Connection handlers
//! talk to it through a [`WorldHandle`]; every mutation and every
//! recomputation runs one at a time inside the actor, so a disconnect can
//! never race a read of the same player.
//!
//! # Key types
//!
//! - [`WorldHandle`]: send commands to the running world
//! - [`WorldConfig`]: proximity strategy, spawn rules, channel sizes
//! - [`Fanout`]: per-player outbound channels, also the relay's
//!   [`Outbox`](plaza_call::Outbox)
//! - [`WorldInfo`]: player and session counts

mod config;
mod error;
mod fanout;
mod world;

pub use config::WorldConfig;
pub use error::WorldError;
pub use fanout::{Fanout, PlayerReceiver, PlayerSender, player_channel};
pub use world::{WorldHandle, WorldInfo, spawn_world, spawn_world_with};
