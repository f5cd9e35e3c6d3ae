//! World actor: an isolated Tokio task that owns the shared state.
//!
//! Handlers never touch the registry directly. They send a [`WorldCommand`]
//! through a bounded mpsc channel, and the actor applies commands strictly
//! one after another:
//!
//! ```text
//! move ─> registry.update_position ─> engine.relationships_for
//!      ─> calls.sync_player ─> session events ─> PeerMoved to the others
//! ```

use plaza_call::{CallEvent, CallOrchestrator, SessionChange, relay};
use plaza_protocol::{
    CallTarget, Facing, PlayerId, Position, Recipient, ServerMessage, SignalPayload,
};
use plaza_proximity::ProximityEngine;
use plaza_registry::{PlayerRegistry, RegistryConfig, RegistryError};
use tokio::sync::{mpsc, oneshot};

use crate::{Fanout, PlayerSender, WorldConfig, WorldError};

/// Commands sent to the world actor through its channel.
///
/// Variants carrying a `oneshot::Sender` expect a reply; the rest are
/// fire-and-forget.
enum WorldCommand {
    /// Register a player and start delivering to `sender`.
    Join {
        player_id: PlayerId,
        name: String,
        role: String,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<(), WorldError>>,
    },

    /// Apply a position report.
    Move {
        player_id: PlayerId,
        position: Position,
        facing: Facing,
    },

    /// Relay an opaque signaling payload.
    Signal {
        from: PlayerId,
        to: PlayerId,
        payload: SignalPayload,
    },

    /// Remove a player and tear down their sessions.
    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<()>,
    },

    /// Request counters.
    Info { reply: oneshot::Sender<WorldInfo> },

    /// Stop the actor.
    Shutdown,
}

/// A snapshot of world counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldInfo {
    /// Players currently registered.
    pub player_count: usize,
    /// Call sessions currently `ACTIVE`.
    pub active_sessions: usize,
}

/// Handle to a running world actor.
///
/// Cheap to clone: it wraps an `mpsc::Sender`. Every connection handler
/// holds one.
#[derive(Clone)]
pub struct WorldHandle {
    sender: mpsc::Sender<WorldCommand>,
}

impl WorldHandle {
    /// Registers `player_id` and subscribes `sender` to world events.
    ///
    /// On success the first message on `sender` is a
    /// [`ServerMessage::Snapshot`], followed by any session events the
    /// spawn position triggers.
    ///
    /// # Errors
    /// [`WorldError::Registry`] with `DuplicateConnection` if the id is
    /// already present, [`WorldError::Unavailable`] if the world is gone.
    pub async fn join(
        &self,
        player_id: PlayerId,
        name: impl Into<String>,
        role: impl Into<String>,
        sender: PlayerSender,
    ) -> Result<(), WorldError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(WorldCommand::Join {
            player_id,
            name: name.into(),
            role: role.into(),
            sender,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| WorldError::Unavailable)?
    }

    /// Reports a new position (fire-and-forget).
    ///
    /// A report for a player that has already left is dropped inside the
    /// actor.
    pub async fn move_to(
        &self,
        player_id: PlayerId,
        position: Position,
        facing: Facing,
    ) -> Result<(), WorldError> {
        self.send(WorldCommand::Move {
            player_id,
            position,
            facing,
        })
        .await
    }

    /// Relays `payload` from `from` to `to` (fire-and-forget). Nobody is
    /// told if `to` is not connected.
    pub async fn signal(
        &self,
        from: PlayerId,
        to: PlayerId,
        payload: SignalPayload,
    ) -> Result<(), WorldError> {
        self.send(WorldCommand::Signal { from, to, payload }).await
    }

    /// Removes `player_id`. Idempotent. Resolves once the removal and the
    /// resulting session teardown have been applied.
    pub async fn leave(&self, player_id: PlayerId) -> Result<(), WorldError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(WorldCommand::Leave {
            player_id,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| WorldError::Unavailable)
    }

    /// Current player and session counts.
    pub async fn info(&self) -> Result<WorldInfo, WorldError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(WorldCommand::Info { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| WorldError::Unavailable)
    }

    /// Tells the world to shut down. Every subscriber channel closes.
    pub async fn shutdown(&self) -> Result<(), WorldError> {
        self.send(WorldCommand::Shutdown).await
    }

    async fn send(&self, cmd: WorldCommand) -> Result<(), WorldError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| WorldError::Unavailable)
    }
}

/// The internal actor state. Runs inside a Tokio task.
struct WorldActor {
    registry: PlayerRegistry,
    engine: ProximityEngine,
    calls: CallOrchestrator,
    fanout: Fanout,
    receiver: mpsc::Receiver<WorldCommand>,
}

impl WorldActor {
    /// Processes commands until shutdown or until every handle is dropped.
    async fn run(mut self) {
        tracing::info!("world actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                WorldCommand::Join {
                    player_id,
                    name,
                    role,
                    sender,
                    reply,
                } => {
                    let result = self.handle_join(player_id, name, role, sender);
                    let _ = reply.send(result);
                }
                WorldCommand::Move {
                    player_id,
                    position,
                    facing,
                } => self.handle_move(player_id, position, facing),
                WorldCommand::Signal { from, to, payload } => {
                    // Failures are logged by the relay and otherwise
                    // swallowed: the sender is never told.
                    let _ = relay(&mut self.fanout, from, to, payload);
                }
                WorldCommand::Leave { player_id, reply } => {
                    self.handle_leave(player_id);
                    let _ = reply.send(());
                }
                WorldCommand::Info { reply } => {
                    let _ = reply.send(self.info());
                }
                WorldCommand::Shutdown => {
                    tracing::info!(players = self.registry.len(), "world shutting down");
                    break;
                }
            }
            self.evict_lagging();
        }

        tracing::info!("world actor stopped");
    }

    fn handle_join(
        &mut self,
        player_id: PlayerId,
        name: String,
        role: String,
        sender: PlayerSender,
    ) -> Result<(), WorldError> {
        let info = self.registry.register(player_id, name, role)?.info();

        self.fanout.insert(player_id, sender);
        let players = self.registry.iter().map(|p| p.info()).collect();
        self.fanout.send_to(
            player_id,
            ServerMessage::Snapshot {
                you: player_id,
                players,
            },
        );
        self.fanout.dispatch(
            Recipient::AllExcept(player_id),
            ServerMessage::PeerJoined { player: info },
        );

        tracing::info!(%player_id, players = self.registry.len(), "player joined");
        self.recompute(player_id);
        Ok(())
    }

    fn handle_move(&mut self, player_id: PlayerId, position: Position, facing: Facing) {
        match self.registry.update_position(player_id, position, facing) {
            Ok(_) => {}
            Err(RegistryError::UnknownConnection(_)) => {
                tracing::debug!(%player_id, "move from unknown player, dropping");
                return;
            }
            Err(e) => {
                tracing::warn!(%player_id, error = %e, "move rejected");
                return;
            }
        }

        self.recompute(player_id);
        self.fanout.dispatch(
            Recipient::AllExcept(player_id),
            ServerMessage::PeerMoved {
                id: player_id,
                x: position.x,
                y: position.y,
                facing,
            },
        );
    }

    fn handle_leave(&mut self, player_id: PlayerId) {
        // Remove first: close events must not address the leaver.
        if self.registry.remove(player_id).is_none() {
            tracing::debug!(%player_id, "leave for unknown player, ignoring");
            return;
        }
        self.fanout.remove(player_id);

        let events = self.calls.on_disconnect(player_id, &self.registry);
        self.apply(events);
        self.fanout
            .dispatch(Recipient::All, ServerMessage::PeerLeft { id: player_id });

        tracing::info!(%player_id, players = self.registry.len(), "player left");
    }

    /// Removes players whose outbound queue overflowed. Their departure
    /// can overflow someone else's queue, so this repeats until nobody is
    /// left behind.
    fn evict_lagging(&mut self) {
        loop {
            let lagging = self.fanout.take_lagging();
            if lagging.is_empty() {
                break;
            }
            for player_id in lagging {
                tracing::warn!(%player_id, "player stopped reading, removing");
                self.handle_leave(player_id);
            }
        }
    }

    /// Diffs `player_id`'s relationships and delivers the transitions.
    fn recompute(&mut self, player_id: PlayerId) {
        let present = self.engine.relationships_for(player_id, &self.registry);
        let events = self.calls.sync_player(player_id, &present, &self.registry);
        self.apply(events);
    }

    /// Records zone membership and delivers session events in order.
    fn apply(&mut self, events: Vec<CallEvent>) {
        for event in events {
            if let CallTarget::Zone { zone, .. } = &event.target {
                let current = match event.change {
                    SessionChange::Open => Some(zone.clone()),
                    SessionChange::Close => None,
                };
                if let Err(e) = self.registry.set_zone(event.to, current) {
                    tracing::debug!(player_id = %event.to, error = %e, "zone change for unknown player");
                }
            }
            self.fanout.send_to(event.to, event.to_message());
        }
    }

    fn info(&self) -> WorldInfo {
        WorldInfo {
            player_count: self.registry.len(),
            active_sessions: self.calls.active_count(),
        }
    }
}

/// Builds the proximity engine from `config` (loading the zone map if
/// needed) and spawns the world.
///
/// # Errors
/// [`WorldError::Zone`] if the map cannot be read or parsed.
pub fn spawn_world(config: WorldConfig) -> Result<WorldHandle, WorldError> {
    let engine = ProximityEngine::from_config(&config.proximity)?;
    Ok(spawn_world_with(engine, config.registry, config.channel_size))
}

/// Spawns a world actor around an already-built engine.
///
/// `channel_size` controls backpressure: when the channel fills up,
/// handlers wait.
pub fn spawn_world_with(
    engine: ProximityEngine,
    registry: RegistryConfig,
    channel_size: usize,
) -> WorldHandle {
    let (tx, rx) = mpsc::channel(channel_size.max(1));

    let actor = WorldActor {
        registry: PlayerRegistry::new(registry),
        engine,
        calls: CallOrchestrator::new(),
        fanout: Fanout::new(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    WorldHandle { sender: tx }
}
