//! A rectangular trigger zone.

use plaza_protocol::{Position, ZoneId};
use serde::{Deserialize, Serialize};

use crate::ZoneError;

/// An axis-aligned rectangle bound to a call room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    /// Provider room name clients join while inside the zone.
    pub room: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Zone {
    /// Builds a zone, rejecting negative or non-finite geometry.
    ///
    /// # Errors
    /// [`ZoneError::InvalidRect`] describing the bad field.
    pub fn new(
        id: ZoneId,
        room: impl Into<String>,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<Self, ZoneError> {
        let invalid = |reason: &str| ZoneError::InvalidRect {
            zone: id.clone(),
            reason: reason.to_string(),
        };
        if !(x.is_finite() && y.is_finite()) {
            return Err(invalid("origin must be finite"));
        }
        if !(width.is_finite() && height.is_finite()) {
            return Err(invalid("size must be finite"));
        }
        if width < 0.0 || height < 0.0 {
            return Err(invalid("size must not be negative"));
        }
        Ok(Self {
            room: room.into(),
            id,
            x,
            y,
            width,
            height,
        })
    }

    /// Point-in-rectangle, inclusive on every edge.
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.x
            && pos.x <= self.x + self.width
            && pos.y >= self.y
            && pos.y <= self.y + self.height
    }

    /// `true` if some point lies in both zones. Shared edges count, since
    /// [`contains`](Self::contains) is inclusive.
    pub fn overlaps(&self, other: &Zone) -> bool {
        self.x <= other.x + other.width
            && other.x <= self.x + self.width
            && self.y <= other.y + other.height
            && other.y <= self.y + self.height
    }
}
