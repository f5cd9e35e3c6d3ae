//! Integration tests for the WebSocket transport against a real client.

#[cfg(feature = "websocket")]
mod websocket {
    use std::time::Duration;

    use futures_util::{SinkExt, StreamExt};
    use plaza_transport::{
        Connection, Handshake, Transport, TransportError, WebSocketConnection, WebSocketTransport,
    };
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpStream;
    use tokio_tungstenite::tungstenite::Message;

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    async fn connect_client(addr: &str) -> ClientWs {
        let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
            .await
            .expect("client should connect");
        ws
    }

    async fn accept_ws(transport: &mut WebSocketTransport) -> WebSocketConnection {
        let pending = transport.accept().await.expect("should accept");
        pending.complete().await.expect("handshake should succeed")
    }

    #[tokio::test]
    async fn test_websocket_text_round_trip() {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("bound").to_string();

        let server = tokio::spawn(async move { accept_ws(&mut transport).await });
        let mut client = connect_client(&addr).await;
        let conn = server.await.expect("task should complete");

        assert!(conn.id().into_inner() > 0);

        // JSON is valid UTF-8, so it must arrive as a text frame.
        conn.send(br#"{"type":"PeerLeft","id":1}"#).await.expect("send");
        let msg = client.next().await.unwrap().unwrap();
        assert!(msg.is_text(), "expected text frame, got {msg:?}");
        assert_eq!(msg.into_text().unwrap().as_str(), r#"{"type":"PeerLeft","id":1}"#);

        client
            .send(Message::Text(r#"{"type":"Leave"}"#.into()))
            .await
            .expect("client send");
        let received = conn.recv().await.expect("recv").expect("some data");
        assert_eq!(received, br#"{"type":"Leave"}"#);
    }

    #[tokio::test]
    async fn test_websocket_non_utf8_goes_out_as_binary() {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0").await.unwrap();
        let addr = transport.local_addr().unwrap().to_string();

        let server = tokio::spawn(async move { accept_ws(&mut transport).await });
        let mut client = connect_client(&addr).await;
        let conn = server.await.unwrap();

        conn.send(&[0xff, 0xfe, 0x00]).await.unwrap();
        let msg = client.next().await.unwrap().unwrap();
        assert!(msg.is_binary());
        assert_eq!(msg.into_data().as_ref(), &[0xff, 0xfe, 0x00]);
    }

    #[tokio::test]
    async fn test_websocket_client_close_yields_none() {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0").await.unwrap();
        let addr = transport.local_addr().unwrap().to_string();

        let server = tokio::spawn(async move { accept_ws(&mut transport).await });
        let mut client = connect_client(&addr).await;
        let conn = server.await.unwrap();

        client.close(None).await.expect("close");

        let result = conn.recv().await.expect("clean close is not an error");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_websocket_ids_are_never_reused() {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0").await.unwrap();
        let addr = transport.local_addr().unwrap().to_string();

        let server = tokio::spawn(async move {
            let a = accept_ws(&mut transport).await;
            let b = accept_ws(&mut transport).await;
            (a.id(), b.id())
        });
        let _c1 = connect_client(&addr).await;
        let _c2 = connect_client(&addr).await;
        let (a, b) = server.await.unwrap();

        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_websocket_send_while_recv_pending() {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0").await.unwrap();
        let addr = transport.local_addr().unwrap().to_string();

        let server = tokio::spawn(async move { accept_ws(&mut transport).await });
        let mut client = connect_client(&addr).await;
        let conn = std::sync::Arc::new(server.await.unwrap());
        assert!(conn.peer_addr().ip().is_loopback());

        let reader = {
            let conn = std::sync::Arc::clone(&conn);
            tokio::spawn(async move { conn.recv().await })
        };
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        // The reader is parked on the read half; the write half is free.
        tokio::time::timeout(std::time::Duration::from_secs(1), conn.send(b"tick"))
            .await
            .expect("send must not wait for recv")
            .unwrap();
        assert_eq!(client.next().await.unwrap().unwrap().into_data().as_ref(), b"tick");

        client.send(Message::Text("tock".into())).await.unwrap();
        let got = reader.await.unwrap().unwrap();
        assert_eq!(got.as_deref(), Some(&b"tock"[..]));
    }

    #[tokio::test]
    async fn test_websocket_silent_socket_does_not_block_next_accept() {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0").await.unwrap();
        let addr = transport.local_addr().unwrap().to_string();

        // Connects but never sends an upgrade request.
        let _silent = TcpStream::connect(&addr).await.unwrap();
        let stalled = transport.accept().await.unwrap();
        assert!(stalled.peer_addr().ip().is_loopback());

        let server = tokio::spawn(async move { accept_ws(&mut transport).await });
        let mut client = tokio::time::timeout(Duration::from_secs(3), connect_client(&addr))
            .await
            .expect("second client must not wait for the first");
        let conn = server.await.unwrap();

        conn.send(b"hello").await.unwrap();
        assert_eq!(client.next().await.unwrap().unwrap().into_data().as_ref(), b"hello");
        drop(stalled);
    }

    #[tokio::test]
    async fn test_websocket_handshake_timeout_closes_silent_socket() {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .unwrap()
            .with_handshake_timeout(Duration::from_millis(100));
        let addr = transport.local_addr().unwrap().to_string();

        let mut silent = TcpStream::connect(&addr).await.unwrap();
        let pending = transport.accept().await.unwrap();

        let result = pending.complete().await;
        assert!(matches!(result, Err(TransportError::HandshakeTimeout(_))));

        // The server side is gone, so the client reads end-of-stream.
        let mut buf = [0u8; 16];
        let n = tokio::time::timeout(Duration::from_secs(1), silent.read(&mut buf))
            .await
            .expect("socket should be closed")
            .unwrap();
        assert_eq!(n, 0);
    }
}
