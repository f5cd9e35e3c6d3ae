//! Error types for the registry.

use plaza_protocol::PlayerId;

/// Errors returned by [`PlayerRegistry`](crate::PlayerRegistry) operations.
///
/// Neither is fatal to the process. Both are confined to the one request
/// that triggered them.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The id is not registered. Usually a stale message that raced a
    /// disconnect; callers log and drop it, never retry.
    #[error("unknown connection {0}")]
    UnknownConnection(PlayerId),

    /// The id is already registered. Unreachable while the transport hands
    /// out unique ids, so this points at a logic fault in the caller.
    #[error("connection {0} is already registered")]
    DuplicateConnection(PlayerId),
}
