//! Proximity rules for Plaza.
//!
//! Turns registry state into *relationships*: the facts "these two players
//! are close enough to talk" or "this player stands in that zone". The call
//! orchestrator keys its sessions by these.
//!
//! Two strategies, picked per deployment:
//!
//! - **Pairwise**: players strictly closer than a threshold are paired.
//! - **Zones**: a player inside a rectangle from the map joins that
//!   rectangle's call room.
//!
//! Both are pure functions of the registry and the (immutable) zone table.

mod config;
mod engine;
mod error;
mod map;
mod relationship;
mod zone;

pub use config::ProximityConfig;
pub use engine::{ProximityEngine, ProximityStrategy, within};
pub use error::ZoneError;
pub use map::ZoneTable;
pub use relationship::{PeerPair, Relationship};
pub use zone::Zone;
