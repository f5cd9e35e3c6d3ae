//! Everything that travels on the wire.
//!
//! Client frames decode into the closed [`ClientMessage`] enum and are
//! checked by [`ClientMessage::validate`] before the world ever sees them, so
//! the core only handles well-formed requests.

use std::fmt;

use plaza_transport::ConnectionId;
use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Identity of a player. It *is* the connection id: one player per live
/// connection, created on join and gone on disconnect.
///
/// The derived `Ord` is the total order used to pick a call initiator, so
/// both peers reach the same answer without talking to each other.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl From<ConnectionId> for PlayerId {
    fn from(id: ConnectionId) -> Self {
        Self(id.into_inner())
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// Identifier of a trigger zone, unique within a loaded map.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(pub String);

impl ZoneId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// A point in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// `true` when both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Which way the avatar looks. Drives the client's walk animation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

// ---------------------------------------------------------------------------
// Player and call views
// ---------------------------------------------------------------------------

/// A player as other clients see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub name: String,
    pub role: String,
    pub x: f64,
    pub y: f64,
    pub facing: Facing,
    /// The zone call this player currently sits in, if any.
    #[serde(default)]
    pub zone: Option<ZoneId>,
}

/// What a session-open or session-close event is about.
///
/// `#[serde(tag = "kind")]` keeps the outer `"type"` tag of
/// [`ServerMessage`] free:
///   `{"type":"SessionOpen","target":{"kind":"Peer","peer":4,"initiator":true}}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum CallTarget {
    /// A direct peer-to-peer call with `peer`. Exactly one side of the pair
    /// receives `initiator: true` and starts the negotiation.
    Peer { peer: PlayerId, initiator: bool },

    /// A provider-hosted call bound to a zone. `room` is the provider's
    /// room name for the zone.
    Zone { zone: ZoneId, room: String },
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Who an outbound message is for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    /// Every joined player.
    All,
    /// One player.
    Player(PlayerId),
    /// Everyone except this player (the usual "tell the others" case).
    AllExcept(PlayerId),
}

/// Body of a signaling message. Any JSON value: an SDP object, a candidate,
/// or a plain string. Relayed exactly as it was decoded.
pub type SignalPayload = serde_json::Value;

// ---------------------------------------------------------------------------
// Client -> server
// ---------------------------------------------------------------------------

/// Everything a client may send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Enter the world. Must be the first message on a connection.
    Join { name: String, role: String },

    /// Report the client's own position.
    Move {
        x: f64,
        y: f64,
        #[serde(default)]
        facing: Facing,
    },

    /// Forward an opaque negotiation blob (SDP offer/answer, ICE candidate)
    /// to another player. The server never looks inside `payload`.
    Signal {
        target: PlayerId,
        payload: SignalPayload,
    },

    /// Leave the world and close the connection.
    Leave,
}

impl ClientMessage {
    /// Checks the field rules serde cannot express.
    ///
    /// # Errors
    /// [`ProtocolError::InvalidPayload`] naming the offending field.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        match self {
            Self::Join { name, .. } if name.trim().is_empty() => Err(
                ProtocolError::InvalidPayload("name must not be empty".into()),
            ),
            Self::Move { x, y, .. } if !Position::new(*x, *y).is_finite() => Err(
                ProtocolError::InvalidPayload("coordinates must be finite".into()),
            ),
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Server -> client
// ---------------------------------------------------------------------------

/// Everything the server may send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Reply to `Join`: your id plus everyone already present (you included).
    Snapshot { you: PlayerId, players: Vec<PlayerInfo> },

    /// Somebody else joined.
    PeerJoined { player: PlayerInfo },

    /// Somebody else moved. Sent regardless of proximity.
    PeerMoved { id: PlayerId, x: f64, y: f64, facing: Facing },

    /// Somebody else left.
    PeerLeft { id: PlayerId },

    /// A relayed negotiation blob, untouched.
    SignalReceived { from: PlayerId, payload: SignalPayload },

    /// A call relationship became active.
    SessionOpen { target: CallTarget },

    /// A call relationship ended.
    SessionClose { target: CallTarget },

    /// A request was rejected. Codes follow HTTP habits
    /// (400 bad payload or not joined yet, 409 already joined).
    Error { code: u16, message: String },
}
