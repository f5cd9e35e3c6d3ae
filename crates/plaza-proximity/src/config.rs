//! Deployment choice of proximity strategy.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Which relationship rule a deployment runs.
///
/// The two are mutually exclusive: a world either pairs players by distance
/// or assigns them to zone calls, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ProximityConfig {
    /// Direct peer-to-peer calls between players closer than `threshold`.
    Pairwise { threshold: f64 },

    /// Provider-hosted calls for players standing in a map zone.
    Zones {
        /// Map file read once at startup.
        map_path: PathBuf,
        /// Object property naming a zone's call room.
        room_property: String,
    },
}

impl ProximityConfig {
    /// Call radius used when none is configured.
    pub const DEFAULT_THRESHOLD: f64 = 100.0;

    /// Property name used when none is configured.
    pub const DEFAULT_ROOM_PROPERTY: &'static str = "room";

    /// Replaces an unusable threshold (negative, zero, NaN, infinite)
    /// with the default.
    pub fn validated(self) -> Self {
        match self {
            Self::Pairwise { threshold } if !(threshold.is_finite() && threshold > 0.0) => {
                tracing::warn!(
                    threshold,
                    default = Self::DEFAULT_THRESHOLD,
                    "invalid proximity threshold, using default"
                );
                Self::Pairwise {
                    threshold: Self::DEFAULT_THRESHOLD,
                }
            }
            other => other,
        }
    }
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self::Pairwise {
            threshold: Self::DEFAULT_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_pairwise_with_default_threshold() {
        assert_eq!(
            ProximityConfig::default(),
            ProximityConfig::Pairwise { threshold: 100.0 }
        );
    }

    #[test]
    fn test_validated_replaces_bad_thresholds() {
        for bad in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let fixed = ProximityConfig::Pairwise { threshold: bad }.validated();
            assert_eq!(fixed, ProximityConfig::default(), "threshold {bad}");
        }
    }

    #[test]
    fn test_validated_keeps_good_config() {
        let zones = ProximityConfig::Zones {
            map_path: "map.json".into(),
            room_property: "room".into(),
        };
        assert_eq!(zones.clone().validated(), zones);

        let pairwise = ProximityConfig::Pairwise { threshold: 15.0 };
        assert_eq!(pairwise.clone().validated(), pairwise);
    }

    #[test]
    fn test_deserializes_from_tagged_json() {
        let config: ProximityConfig =
            serde_json::from_str(r#"{"mode":"pairwise","threshold":42.5}"#).unwrap();
        assert_eq!(config, ProximityConfig::Pairwise { threshold: 42.5 });
    }
}
