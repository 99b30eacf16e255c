//! Integration tests for the WebSocket transport.
//!
//! A real listener and a real client are used so frames actually cross
//! a socket.

#[cfg(feature = "websocket")]
mod websocket {
    use std::time::Duration;

    use futures_util::{SinkExt, StreamExt};
    use tabula_transport::{
        Connection, Incoming, Transport, TransportError, WebSocketConnection, WebSocketTransport,
    };
    use tokio_tungstenite::tungstenite::Message;

    const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    async fn connect_client(addr: &str) -> ClientWs {
        let url = format!("ws://{addr}");
        let (ws, _) = tokio_tungstenite::connect_async(&url)
            .await
            .expect("client should connect");
        ws
    }

    /// Binds to an OS-assigned port and returns the transport and its address.
    async fn bind() -> (WebSocketTransport, String) {
        let transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("local addr").to_string();
        (transport, addr)
    }

    /// Accepts one socket and completes its handshake.
    async fn accept_upgraded(transport: &mut WebSocketTransport) -> WebSocketConnection {
        let incoming = transport.accept().await.expect("should accept");
        incoming
            .upgrade(HANDSHAKE_TIMEOUT)
            .await
            .expect("handshake should succeed")
    }

    #[tokio::test]
    async fn test_websocket_accept_and_send_receive() {
        let (mut transport, addr) = bind().await;

        let server_handle =
            tokio::spawn(async move { accept_upgraded(&mut transport).await });

        let mut client_ws = connect_client(&addr).await;
        let server_conn = server_handle.await.expect("task should complete");

        assert!(server_conn.id().into_inner() > 0);

        // --- Server sends, client receives a text frame ---
        server_conn
            .send(br#"{"event":"listRooms"}"#)
            .await
            .expect("send should succeed");

        let msg = client_ws.next().await.unwrap().unwrap();
        assert!(msg.is_text(), "UTF-8 payloads go out as text frames");
        assert_eq!(msg.into_data().as_ref(), br#"{"event":"listRooms"}"#);

        // --- Client sends text, server receives bytes ---
        client_ws
            .send(Message::text(r#"{"event":"quitRoom"}"#.to_string()))
            .await
            .unwrap();

        let received = server_conn
            .recv()
            .await
            .expect("recv should succeed")
            .expect("should have data");
        assert_eq!(received, br#"{"event":"quitRoom"}"#);

        server_conn.close().await.expect("close should succeed");
    }

    #[tokio::test]
    async fn test_websocket_non_utf8_goes_out_as_binary() {
        let (mut transport, addr) = bind().await;
        let server_handle =
            tokio::spawn(async move { accept_upgraded(&mut transport).await });

        let mut client_ws = connect_client(&addr).await;
        let server_conn = server_handle.await.unwrap();

        server_conn.send(&[0xff, 0xfe, 0x00]).await.unwrap();

        let msg = client_ws.next().await.unwrap().unwrap();
        assert!(msg.is_binary());
        assert_eq!(msg.into_data().as_ref(), &[0xff, 0xfe, 0x00]);
    }

    #[tokio::test]
    async fn test_websocket_recv_returns_none_on_client_close() {
        let (mut transport, addr) = bind().await;

        let server_handle =
            tokio::spawn(async move { accept_upgraded(&mut transport).await });

        let mut client_ws = connect_client(&addr).await;
        let server_conn = server_handle.await.unwrap();

        client_ws.send(Message::Close(None)).await.unwrap();

        let result = server_conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on client close");
    }

    #[tokio::test]
    async fn test_websocket_connection_ids_are_unique() {
        let (mut transport, addr) = bind().await;

        let server_handle = tokio::spawn(async move {
            let a = accept_upgraded(&mut transport).await;
            let b = accept_upgraded(&mut transport).await;
            (a, b)
        });

        let _c1 = connect_client(&addr).await;
        let _c2 = connect_client(&addr).await;
        let (a, b) = server_handle.await.unwrap();

        assert_ne!(a.id(), b.id());
    }

    #[tokio::test]
    async fn test_accept_returns_before_handshake() {
        let (mut transport, addr) = bind().await;

        // A raw socket that never sends an upgrade request.
        let _idle = tokio::net::TcpStream::connect(&addr).await.unwrap();

        let incoming = tokio::time::timeout(Duration::from_secs(1), transport.accept())
            .await
            .expect("accept should not wait for the handshake")
            .expect("should accept");
        assert!(incoming.id().into_inner() > 0);
    }

    #[tokio::test]
    async fn test_upgrade_times_out_on_silent_peer() {
        let (mut transport, addr) = bind().await;
        let _idle = tokio::net::TcpStream::connect(&addr).await.unwrap();

        let incoming = transport.accept().await.expect("should accept");
        let result = incoming.upgrade(Duration::from_millis(50)).await;

        assert!(matches!(result, Err(TransportError::HandshakeTimeout(_))));
    }
}
