//! WebSocket transport built on `tokio-tungstenite`.
//!
//! Accepting is two steps: [`WebSocketTransport::accept`] takes the TCP
//! socket and [`PendingWebSocket::complete`] runs the upgrade under a
//! deadline, normally in the connection's own task.
//!
//! Each connection is split into a write half and a read half behind their
//! own locks. A handler can sit in `recv` while world events are pushed
//! out through `send` without the two waiting on each other.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::{self, Message};

use crate::{Connection, ConnectionId, Handshake, Transport, TransportError};

/// Source of connection ids. Starts at 1 and only ever grows, so a closed
/// connection's id is never reissued.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

type WsSink = SplitSink<WebSocketStream<TcpStream>, Message>;
type WsSource = SplitStream<WebSocketStream<TcpStream>>;

/// Listens for WebSocket upgrades on a TCP port.
pub struct WebSocketTransport {
    listener: TcpListener,
    handshake_timeout: Duration,
}

impl WebSocketTransport {
    /// How long a client gets to send its upgrade request.
    pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

    /// Binds the listener. Use port `0` to let the OS pick one.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "websocket transport listening");
        Ok(Self {
            listener,
            handshake_timeout: Self::DEFAULT_HANDSHAKE_TIMEOUT,
        })
    }

    /// Sets the upgrade deadline for connections accepted from now on.
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }
}

impl Transport for WebSocketTransport {
    type Connection = WebSocketConnection;
    type Pending = PendingWebSocket;
    type Error = TransportError;

    /// Accepts one TCP connection. The upgrade runs later, in
    /// [`PendingWebSocket::complete`].
    async fn accept(&mut self) -> Result<Self::Pending, Self::Error> {
        let (stream, peer) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::trace!(%peer, "accepted tcp connection");

        Ok(PendingWebSocket {
            stream,
            peer,
            timeout: self.handshake_timeout,
        })
    }

    fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

/// A TCP client that has not sent its WebSocket upgrade yet.
pub struct PendingWebSocket {
    stream: TcpStream,
    peer: SocketAddr,
    timeout: Duration,
}

impl PendingWebSocket {
    /// Remote address of the client.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

impl Handshake for PendingWebSocket {
    type Connection = WebSocketConnection;
    type Error = TransportError;

    /// Runs the upgrade handshake, giving up after the transport's
    /// handshake timeout. Dropping the socket on failure closes it.
    async fn complete(self) -> Result<Self::Connection, Self::Error> {
        let Self {
            stream,
            peer,
            timeout,
        } = self;

        let ws = match tokio::time::timeout(timeout, tokio_tungstenite::accept_async(stream)).await
        {
            Ok(Ok(ws)) => ws,
            Ok(Err(e)) => {
                return Err(TransportError::AcceptFailed(to_io(
                    e,
                    std::io::ErrorKind::ConnectionRefused,
                )));
            }
            Err(_) => {
                tracing::debug!(%peer, ?timeout, "websocket handshake timed out");
                return Err(TransportError::HandshakeTimeout(timeout));
            }
        };

        let id = ConnectionId::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(%id, %peer, "accepted websocket connection");

        let (sink, source) = ws.split();
        Ok(WebSocketConnection {
            id,
            peer,
            sink: Mutex::new(sink),
            source: Mutex::new(source),
        })
    }
}

/// One upgraded WebSocket client.
pub struct WebSocketConnection {
    id: ConnectionId,
    peer: SocketAddr,
    sink: Mutex<WsSink>,
    source: Mutex<WsSource>,
}

impl WebSocketConnection {
    /// Remote address of the client.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

impl Connection for WebSocketConnection {
    type Error = TransportError;

    /// UTF-8 payloads go out as text frames (what browser JSON clients
    /// expect); anything else as binary.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        let msg = match std::str::from_utf8(data) {
            Ok(text) => Message::Text(text.to_owned().into()),
            Err(_) => Message::Binary(data.to_vec().into()),
        };
        self.sink
            .lock()
            .await
            .send(msg)
            .await
            .map_err(|e| TransportError::SendFailed(to_io(e, std::io::ErrorKind::BrokenPipe)))
    }

    /// Text and binary frames are both handed up as bytes. Control frames
    /// are skipped; tungstenite answers pings on its own.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        let mut source = self.source.lock().await;
        while let Some(frame) = source.next().await {
            match frame {
                Ok(Message::Text(text)) => return Ok(Some(text.as_bytes().to_vec())),
                Ok(Message::Binary(data)) => return Ok(Some(data.to_vec())),
                Ok(Message::Close(_)) => return Ok(None),
                Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => {}
                Err(e) => {
                    return Err(TransportError::ReceiveFailed(to_io(
                        e,
                        std::io::ErrorKind::ConnectionReset,
                    )));
                }
            }
        }
        Ok(None)
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.sink
            .lock()
            .await
            .close()
            .await
            .map_err(|e| TransportError::SendFailed(to_io(e, std::io::ErrorKind::BrokenPipe)))
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}

fn to_io(e: tungstenite::Error, kind: std::io::ErrorKind) -> std::io::Error {
    std::io::Error::new(kind, e)
}
