//! Wire protocol for Plaza.
//!
//! - **Types**: [`ClientMessage`] and [`ServerMessage`], the closed set of
//!   events exchanged with clients, plus the identifiers and geometry they
//!   carry ([`PlayerId`], [`ZoneId`], [`Position`], [`CallTarget`]).
//! - **Codec**: [`Codec`] trait and [`JsonCodec`].
//! - **Errors**: [`ProtocolError`].
//!
//! ```text
//! Transport (bytes) -> Protocol (ClientMessage) -> World (registry, calls)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    CallTarget, ClientMessage, Facing, PlayerId, PlayerInfo, Position, Recipient, ServerMessage,
    SignalPayload, ZoneId,
};
