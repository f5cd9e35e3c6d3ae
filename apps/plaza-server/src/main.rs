//! Plaza presence server.
//!
//! Every flag can also come from a `PLAZA_*` environment variable.
//!
//! ```text
//! plaza-server --bind 0.0.0.0:8080 --mode pairwise --threshold 120
//! plaza-server --mode zones --map assets/office.json --room-property room
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use plaza::prelude::*;
use tracing_subscriber::EnvFilter;

/// Which proximity rule the world runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Direct calls between players closer than `--threshold`.
    Pairwise,
    /// Hosted room calls for players inside a map zone.
    Zones,
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "PLAZA_BIND", default_value = PlazaServerBuilder::DEFAULT_BIND)]
    bind: String,

    /// Proximity strategy.
    #[arg(long, env = "PLAZA_MODE", value_enum, default_value_t = Mode::Pairwise)]
    mode: Mode,

    /// Call radius for pairwise mode. Invalid values fall back to the
    /// default.
    #[arg(long, env = "PLAZA_THRESHOLD", default_value_t = ProximityConfig::DEFAULT_THRESHOLD)]
    threshold: f64,

    /// Tiled JSON map with the zones. Required in zones mode.
    #[arg(long, env = "PLAZA_MAP", required_if_eq("mode", "zones"))]
    map: Option<PathBuf>,

    /// Object property naming a zone's call room.
    #[arg(long, env = "PLAZA_ROOM_PROPERTY", default_value = ProximityConfig::DEFAULT_ROOM_PROPERTY)]
    room_property: String,

    /// Spawn point, x. A non-finite spawn point falls back to the origin.
    #[arg(long, env = "PLAZA_SPAWN_X", default_value_t = 0.0, allow_negative_numbers = true)]
    spawn_x: f64,

    /// Spawn point, y.
    #[arg(long, env = "PLAZA_SPAWN_Y", default_value_t = 0.0, allow_negative_numbers = true)]
    spawn_y: f64,

    /// Random offset radius around the spawn point. 0 disables it.
    #[arg(long, env = "PLAZA_SPAWN_SCATTER", default_value_t = 0.0)]
    spawn_scatter: f64,
}

impl Args {
    fn world_config(&self) -> WorldConfig {
        let proximity = match (self.mode, &self.map) {
            (Mode::Zones, Some(map_path)) => ProximityConfig::Zones {
                map_path: map_path.clone(),
                room_property: self.room_property.clone(),
            },
            // clap enforces --map in zones mode
            (Mode::Zones, None) | (Mode::Pairwise, _) => ProximityConfig::Pairwise {
                threshold: self.threshold,
            },
        };

        WorldConfig {
            proximity,
            registry: RegistryConfig {
                spawn: Position::new(self.spawn_x, self.spawn_y),
                spawn_scatter: self.spawn_scatter,
            }
            .validated(),
            ..WorldConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = args.world_config();
    tracing::info!(bind = %args.bind, mode = ?args.mode, "starting plaza server");

    let server = PlazaServer::builder()
        .bind(&args.bind)
        .world_config(config)
        .build()
        .await?;
    let world = server.world();

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupt received, shutting down");
            let _ = world.shutdown().await;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults_give_pairwise_world() {
        let args = Args::try_parse_from(["plaza-server"]).unwrap();

        assert_eq!(args.bind, "127.0.0.1:8080");
        assert_eq!(args.world_config(), WorldConfig::default());
    }

    #[test]
    fn test_args_zones_mode_requires_map() {
        assert!(Args::try_parse_from(["plaza-server", "--mode", "zones"]).is_err());

        let args = Args::try_parse_from([
            "plaza-server",
            "--mode",
            "zones",
            "--map",
            "office.json",
            "--room-property",
            "jitsi",
        ])
        .unwrap();

        assert_eq!(
            args.world_config().proximity,
            ProximityConfig::Zones {
                map_path: "office.json".into(),
                room_property: "jitsi".into(),
            }
        );
    }

    #[test]
    fn test_args_spawn_accepts_negative_coordinates() {
        let args = Args::try_parse_from([
            "plaza-server",
            "--spawn-x",
            "-40",
            "--spawn-y",
            "12.5",
            "--spawn-scatter",
            "8",
            "--threshold",
            "64",
        ])
        .unwrap();
        let config = args.world_config();

        assert_eq!(config.registry.spawn, Position::new(-40.0, 12.5));
        assert_eq!(config.registry.spawn_scatter, 8.0);
        assert_eq!(config.proximity, ProximityConfig::Pairwise { threshold: 64.0 });
    }

    #[test]
    fn test_args_nan_spawn_falls_back_to_origin() {
        let args =
            Args::try_parse_from(["plaza-server", "--spawn-x", "NaN", "--spawn-y", "3"]).unwrap();

        assert!(args.spawn_x.is_nan());
        assert_eq!(args.world_config().registry.spawn, Position::new(0.0, 0.0));
    }
}
