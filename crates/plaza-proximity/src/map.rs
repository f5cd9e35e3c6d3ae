//! The zone table and the map loader that fills it.
//!
//! Maps are Tiled-style JSON. Only the parts that describe zones are read:
//!
//! ```text
//! { "layers": [
//!     { "type": "objectgroup",
//!       "objects": [
//!         { "id": 3, "name": "meeting", "x": 0, "y": 0, "width": 50, "height": 50,
//!           "properties": [ { "name": "room", "type": "string", "value": "conf1" } ] }
//!       ] },
//!     { "type": "group", "layers": [ ... ] }
//! ] }
//! ```
//!
//! Any object that carries the room property becomes a [`Zone`]. Tile data,
//! tilesets and everything else in the file are ignored.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use plaza_protocol::{Position, ZoneId};
use serde::Deserialize;

use crate::{Zone, ZoneError};

// ---------------------------------------------------------------------------
// Map file shape
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct MapFile {
    #[serde(default)]
    layers: Vec<MapLayer>,
}

#[derive(Deserialize)]
struct MapLayer {
    #[serde(default)]
    objects: Vec<MapObject>,
    /// Children of a `group` layer.
    #[serde(default)]
    layers: Vec<MapLayer>,
}

#[derive(Deserialize)]
struct MapObject {
    #[serde(default)]
    id: u64,
    #[serde(default)]
    name: String,
    x: f64,
    y: f64,
    #[serde(default)]
    width: f64,
    #[serde(default)]
    height: f64,
    #[serde(default)]
    properties: Properties,
}

/// Tiled writes properties as a list; very old exports used a plain map.
#[derive(Deserialize)]
#[serde(untagged)]
enum Properties {
    List(Vec<Property>),
    Map(HashMap<String, serde_json::Value>),
}

impl Default for Properties {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

#[derive(Deserialize)]
struct Property {
    name: String,
    value: serde_json::Value,
}

impl Properties {
    fn get_str(&self, key: &str) -> Option<&str> {
        match self {
            Self::List(list) => list
                .iter()
                .find(|p| p.name == key)
                .and_then(|p| p.value.as_str()),
            Self::Map(map) => map.get(key).and_then(|v| v.as_str()),
        }
    }
}

// ---------------------------------------------------------------------------
// ZoneTable
// ---------------------------------------------------------------------------

/// Every zone of the loaded map, in load order. Immutable after load.
#[derive(Debug, Clone, Default)]
pub struct ZoneTable {
    zones: Vec<Zone>,
}

impl ZoneTable {
    /// Builds a table from zones already in memory.
    ///
    /// Overlapping zones are allowed but logged; [`zone_for`](Self::zone_for)
    /// resolves them first-loaded-wins.
    ///
    /// # Errors
    /// [`ZoneError::DuplicateZone`] if two zones share an id.
    pub fn new(zones: Vec<Zone>) -> Result<Self, ZoneError> {
        let mut seen = HashSet::new();
        for zone in &zones {
            if !seen.insert(&zone.id) {
                return Err(ZoneError::DuplicateZone(zone.id.clone()));
            }
        }

        for (i, a) in zones.iter().enumerate() {
            for b in &zones[i + 1..] {
                if a.overlaps(b) {
                    tracing::warn!(
                        first = %a.id,
                        second = %b.id,
                        "zones overlap; the first one loaded wins"
                    );
                }
            }
        }

        tracing::info!(zones = zones.len(), "zone table loaded");
        Ok(Self { zones })
    }

    /// Parses map JSON, keeping every object that has `room_property` set
    /// to a string.
    ///
    /// # Errors
    /// [`ZoneError::Parse`] for malformed JSON, plus everything
    /// [`Zone::new`] and [`ZoneTable::new`] reject.
    pub fn from_map_json(json: &str, room_property: &str) -> Result<Self, ZoneError> {
        let map: MapFile = serde_json::from_str(json)?;
        let mut zones = Vec::new();
        collect_zones(&map.layers, room_property, &mut zones)?;
        Self::new(zones)
    }

    /// Reads and parses a map file.
    ///
    /// # Errors
    /// [`ZoneError::Io`] if the file cannot be read, otherwise as
    /// [`from_map_json`](Self::from_map_json).
    pub fn load(path: impl AsRef<Path>, room_property: &str) -> Result<Self, ZoneError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ZoneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loading map");
        Self::from_map_json(&json, room_property)
    }

    /// The zone containing `pos`. When several do, the one loaded first.
    pub fn zone_for(&self, pos: Position) -> Option<&Zone> {
        self.zones.iter().find(|z| z.contains(pos))
    }

    pub fn get(&self, id: &ZoneId) -> Option<&Zone> {
        self.zones.iter().find(|z| &z.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Zone> + '_ {
        self.zones.iter()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

fn collect_zones(
    layers: &[MapLayer],
    room_property: &str,
    out: &mut Vec<Zone>,
) -> Result<(), ZoneError> {
    for layer in layers {
        for object in &layer.objects {
            let Some(room) = object.properties.get_str(room_property) else {
                continue;
            };
            let id = if object.name.is_empty() {
                ZoneId(format!("zone-{}", object.id))
            } else {
                ZoneId(object.name.clone())
            };
            out.push(Zone::new(
                id,
                room,
                object.x,
                object.y,
                object.width,
                object.height,
            )?);
        }
        collect_zones(&layer.layers, room_property, out)?;
    }
    Ok(())
}
