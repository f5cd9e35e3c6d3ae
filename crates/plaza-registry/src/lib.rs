//! Player registry for Plaza.
//!
//! The registry is the single source of truth for who is in the world and
//! where they stand. It holds nothing on disk: a record exists exactly while
//! its connection does.
//!
//! # How it fits in the stack
//!
//! ```text
//! World actor (above)  <- serializes every call into the registry
//!     |
//! Registry (this crate) <- register / update_position / remove / snapshot
//!     |
//! Protocol (below)     <- PlayerId, Position, Facing, PlayerInfo
//! ```
//!
//! The registry never broadcasts. Callers decide who hears about a change,
//! which keeps this crate testable without any transport.

mod error;
mod player;
mod registry;

pub use error::RegistryError;
pub use player::{Player, RegistryConfig};
pub use registry::PlayerRegistry;
