//! # Plaza
//!
//! A shared 2-D space for many clients. Each client reports its own
//! position; the server fans the move out to everyone else and decides,
//! from positions alone, who should be in a call with whom.
//!
//! Two deployment modes, never mixed:
//!
//! - **Pairwise**: players closer than a threshold get a direct
//!   peer-to-peer session. The server relays their negotiation blobs.
//! - **Zones**: players standing inside a map rectangle join that zone's
//!   hosted call room.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use plaza::prelude::*;
//!
//! # async fn start() -> Result<(), PlazaError> {
//! let server = PlazaServer::builder().bind("0.0.0.0:8080").build().await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::PlazaError;
pub use server::{PlazaServer, PlazaServerBuilder};

pub mod prelude {
    pub use crate::{PlazaError, PlazaServer, PlazaServerBuilder};
    pub use plaza_protocol::{
        CallTarget, ClientMessage, Facing, PlayerId, PlayerInfo, Position, ServerMessage,
        SignalPayload, ZoneId,
    };
    pub use plaza_proximity::ProximityConfig;
    pub use plaza_registry::RegistryConfig;
    pub use plaza_world::{WorldConfig, WorldHandle, WorldInfo};
}
