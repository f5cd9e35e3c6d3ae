//! `PlazaServer` builder and accept loop.
//!
//! Ties the layers together: transport -> protocol -> world.

use std::sync::Arc;
use std::time::Duration;

use plaza_protocol::{Codec, JsonCodec};
use plaza_transport::{Handshake, Transport, WebSocketTransport};
use plaza_world::{WorldConfig, WorldHandle, spawn_world};

use crate::PlazaError;
use crate::handler::handle_connection;

/// Shared state passed to each connection handler task.
///
/// No locks: the only mutable state lives inside the world actor.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) world: WorldHandle,
    pub(crate) codec: C,
    /// Capacity of each player's outbound channel.
    pub(crate) outbound_capacity: usize,
}

/// Builder for configuring and starting a Plaza server.
///
/// # Example
///
/// ```rust,no_run
/// use plaza::prelude::*;
///
/// # async fn start() -> Result<(), PlazaError> {
/// let server = PlazaServer::builder()
///     .bind("0.0.0.0:8080")
///     .world_config(WorldConfig {
///         proximity: ProximityConfig::Pairwise { threshold: 64.0 },
///         ..WorldConfig::default()
///     })
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct PlazaServerBuilder {
    bind_addr: String,
    world_config: WorldConfig,
    handshake_timeout: Duration,
}

impl PlazaServerBuilder {
    /// Address used when none is set.
    pub const DEFAULT_BIND: &'static str = "127.0.0.1:8080";

    pub fn new() -> Self {
        Self {
            bind_addr: Self::DEFAULT_BIND.to_string(),
            world_config: WorldConfig::default(),
            handshake_timeout: WebSocketTransport::DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }

    /// Sets the address to listen on.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the proximity strategy, spawn rules and channel sizes.
    pub fn world_config(mut self, config: WorldConfig) -> Self {
        self.world_config = config;
        self
    }

    /// How long a new client may take to complete the WebSocket upgrade
    /// before its socket is dropped.
    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Loads the zone map (if any), starts the world and binds the
    /// listener.
    ///
    /// Uses `JsonCodec` over `WebSocketTransport`.
    ///
    /// # Errors
    /// [`PlazaError::World`] if the map cannot be loaded,
    /// [`PlazaError::Transport`] if the address cannot be bound.
    pub async fn build(self) -> Result<PlazaServer<JsonCodec>, PlazaError> {
        let outbound_capacity = self.world_config.outbound_capacity;
        let world = spawn_world(self.world_config)?;
        let transport = WebSocketTransport::bind(&self.bind_addr)
            .await?
            .with_handshake_timeout(self.handshake_timeout);

        let state = Arc::new(ServerState {
            world,
            codec: JsonCodec,
            outbound_capacity,
        });

        Ok(PlazaServer { transport, state })
    }
}

impl Default for PlazaServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Plaza server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct PlazaServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl PlazaServer<JsonCodec> {
    pub fn builder() -> PlazaServerBuilder {
        PlazaServerBuilder::new()
    }
}

impl<C: Codec> PlazaServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// A handle to the world, for introspection and shutdown.
    pub fn world(&self) -> WorldHandle {
        self.state.world.clone()
    }

    /// Runs the accept loop, spawning one task per connection.
    ///
    /// The WebSocket upgrade happens inside that task, so a client that
    /// stalls mid-handshake never holds up the loop. Never returns on its
    /// own; a failed accept is logged and skipped.
    pub async fn run(mut self) -> Result<(), PlazaError> {
        match self.transport.local_addr() {
            Ok(addr) => tracing::info!(%addr, "plaza server listening"),
            Err(e) => tracing::warn!(error = %e, "plaza server listening on unknown address"),
        }

        loop {
            match self.transport.accept().await {
                Ok(pending) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        let peer = pending.peer_addr();
                        let conn = match pending.complete().await {
                            Ok(conn) => conn,
                            Err(e) => {
                                tracing::debug!(%peer, error = %e, "websocket handshake failed");
                                return;
                            }
                        };
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
