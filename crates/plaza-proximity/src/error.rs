//! Errors raised while loading the zone table.

use std::path::PathBuf;

use plaza_protocol::ZoneId;

/// Why a map could not be turned into a zone table.
///
/// All of these happen once, at startup, before any client connects.
#[derive(Debug, thiserror::Error)]
pub enum ZoneError {
    /// The map file could not be read.
    #[error("failed to read map {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The map file is not valid map JSON.
    #[error("failed to parse map: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two zones share an id.
    #[error("duplicate zone id {0}")]
    DuplicateZone(ZoneId),

    /// A zone rectangle has a negative or non-finite extent.
    #[error("zone {zone} has an invalid rectangle: {reason}")]
    InvalidRect { zone: ZoneId, reason: String },
}
