//! Call sessions for Plaza.
//!
//! - [`CallOrchestrator`] turns *changes* in proximity into session
//!   open/close events, at most one live session per relationship.
//! - [`relay`] forwards opaque signaling blobs between two players for the
//!   peer-to-peer variant.
//!
//! Neither touches a socket. Events come back as values and the caller
//! (the world actor) decides how to deliver them.

mod error;
mod event;
mod orchestrator;
mod relay;

pub use error::RelayError;
pub use event::{CallEvent, SessionChange};
pub use orchestrator::{CallOrchestrator, SessionState};
pub use relay::{Outbox, relay};
