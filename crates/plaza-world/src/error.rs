//! Error types for the world layer.

use plaza_proximity::ZoneError;
use plaza_registry::RegistryError;

/// Errors that can occur talking to the world.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The registry refused the operation.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The zone map could not be loaded at startup.
    #[error(transparent)]
    Zone(#[from] ZoneError),

    /// The world's command channel is closed: the actor has shut down.
    #[error("world is unavailable")]
    Unavailable,
}
