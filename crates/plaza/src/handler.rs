//! Per-connection handler: join, then route messages both ways.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Wait for `Join` (anything else gets a 400 and is ignored)
//!   2. Register with the world and subscribe to its events
//!   3. Loop: forward world events out, client messages in
//!   4. On close, `Leave`, or error: the guard removes the player

use std::sync::Arc;

use plaza_protocol::{ClientMessage, Codec, PlayerId, Position, ProtocolError, ServerMessage};
use plaza_transport::{Connection, WebSocketConnection};
use plaza_world::{WorldError, WorldHandle, player_channel};

use crate::PlazaError;
use crate::server::ServerState;

/// Error code for malformed or out-of-order messages.
const BAD_REQUEST: u16 = 400;
/// Error code for a second `Join` on a joined connection.
const CONFLICT: u16 = 409;

/// Drop guard that removes the player from the world when the handler
/// exits, however it exits.
///
/// `Drop` is synchronous, so the leave runs in a fire-and-forget task.
/// Leaving is idempotent; an explicit `Leave` that already went through is
/// harmless to repeat.
struct LeaveGuard {
    player_id: PlayerId,
    world: WorldHandle,
}

impl Drop for LeaveGuard {
    fn drop(&mut self) {
        let player_id = self.player_id;
        let world = self.world.clone();
        tokio::spawn(async move {
            if let Err(e) = world.leave(player_id).await {
                tracing::debug!(%player_id, error = %e, "leave after disconnect failed");
            }
        });
    }
}

/// What the message loop should do after handling one frame.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Close,
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), PlazaError> {
    let conn_id = conn.id();
    let player_id = PlayerId::from(conn_id);
    tracing::debug!(%conn_id, peer = %conn.peer_addr(), "handling new connection");

    // --- Step 1: Join ---
    let Some((name, role)) = await_join(&conn, &state.codec).await? else {
        tracing::debug!(%conn_id, "connection closed before join");
        return Ok(());
    };

    // --- Step 2: Register ---
    let (tx, mut outbound) = player_channel(state.outbound_capacity);
    if let Err(e) = state.world.join(player_id, name, role, tx).await {
        tracing::error!(%player_id, error = %e, "join rejected");
        if matches!(e, WorldError::Registry(_)) {
            send_error(&conn, &state.codec, CONFLICT, &e.to_string()).await?;
        }
        let _ = conn.close().await;
        return Err(e.into());
    }
    let _guard = LeaveGuard {
        player_id,
        world: state.world.clone(),
    };

    // --- Step 3: Message loop ---
    loop {
        tokio::select! {
            // Flush world events before reading more input.
            biased;

            event = outbound.recv() => match event {
                Some(msg) => {
                    let bytes = state.codec.encode(&msg)?;
                    conn.send(&bytes).await?;
                }
                None => {
                    tracing::info!(%player_id, "outbound channel closed, dropping connection");
                    let _ = conn.close().await;
                    break;
                }
            },

            frame = conn.recv() => match frame {
                Ok(Some(data)) => {
                    if handle_frame(&conn, &state, player_id, &data).await? == Flow::Close {
                        let _ = conn.close().await;
                        break;
                    }
                }
                Ok(None) => {
                    tracing::info!(%player_id, "connection closed cleanly");
                    break;
                }
                Err(e) => {
                    tracing::debug!(%player_id, error = %e, "recv error");
                    break;
                }
            },
        }
    }

    // _guard drops here -> player leaves the world.
    Ok(())
}

/// Reads frames until a valid `Join` arrives.
///
/// Returns `None` if the client closes, errors, or sends `Leave` first.
async fn await_join(
    conn: &WebSocketConnection,
    codec: &impl Codec,
) -> Result<Option<(String, String)>, PlazaError> {
    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => return Ok(None),
            Err(e) => {
                tracing::debug!(conn_id = %conn.id(), error = %e, "recv error before join");
                return Ok(None);
            }
        };

        match decode(codec, &data) {
            Ok(ClientMessage::Join { name, role }) => return Ok(Some((name, role))),
            Ok(ClientMessage::Leave) => return Ok(None),
            Ok(_) => {
                send_error(conn, codec, BAD_REQUEST, "join first").await?;
            }
            Err(e) if e.is_client_fault() => {
                tracing::debug!(conn_id = %conn.id(), error = %e, "invalid message before join");
                send_error(conn, codec, BAD_REQUEST, &e.to_string()).await?;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Handles one frame from a joined player.
async fn handle_frame<C: Codec>(
    conn: &WebSocketConnection,
    state: &ServerState<C>,
    player_id: PlayerId,
    data: &[u8],
) -> Result<Flow, PlazaError> {
    let msg = match decode(&state.codec, data) {
        Ok(msg) => msg,
        Err(e) if e.is_client_fault() => {
            tracing::debug!(%player_id, error = %e, "invalid message");
            send_error(conn, &state.codec, BAD_REQUEST, &e.to_string()).await?;
            return Ok(Flow::Continue);
        }
        Err(e) => return Err(e.into()),
    };

    match msg {
        ClientMessage::Move { x, y, facing } => {
            state
                .world
                .move_to(player_id, Position::new(x, y), facing)
                .await?;
        }
        ClientMessage::Signal { target, payload } => {
            state.world.signal(player_id, target, payload).await?;
        }
        ClientMessage::Join { .. } => {
            send_error(conn, &state.codec, CONFLICT, "already joined").await?;
        }
        ClientMessage::Leave => {
            tracing::info!(%player_id, "player asked to leave");
            state.world.leave(player_id).await?;
            return Ok(Flow::Close);
        }
    }

    Ok(Flow::Continue)
}

/// Decodes a frame and applies the field rules.
fn decode(codec: &impl Codec, data: &[u8]) -> Result<ClientMessage, ProtocolError> {
    let msg: ClientMessage = codec.decode(data)?;
    msg.validate()?;
    Ok(msg)
}

/// Sends a `ServerMessage::Error` to the client.
async fn send_error(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    code: u16,
    message: &str,
) -> Result<(), PlazaError> {
    let bytes = codec.encode(&ServerMessage::Error {
        code,
        message: message.to_string(),
    })?;
    conn.send(&bytes).await?;
    Ok(())
}
