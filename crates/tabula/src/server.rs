//! `TabulaServer` builder and accept loop.
//!
//! This is the entry point for running a Tabula server. It ties together
//! all the layers: transport → protocol → hub → lobby.

use std::sync::Arc;
use std::time::Duration;

use tabula_protocol::{Codec, JsonCodec};
use tabula_room::RoomConfig;
use tabula_transport::{Incoming, Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::hub::{HubHandle, spawn_hub};
use crate::TabulaError;

/// Default bound on the hub's command queue.
const DEFAULT_HUB_CHANNEL_SIZE: usize = 256;

/// Default number of events queued for one connection before it is
/// dropped as too slow.
const DEFAULT_OUTBOUND_BUFFER: usize = 128;

/// Default time a peer gets to finish the WebSocket upgrade.
const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared server state passed to each connection handler task.
///
/// Room state lives in the hub task, so nothing here needs a lock.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) hub: HubHandle,
    pub(crate) codec: C,
    /// Capacity of each connection's outbound queue.
    pub(crate) outbound_buffer: usize,
}

/// Builder for configuring and starting a Tabula server.
///
/// # Example
///
/// ```rust,no_run
/// use tabula::prelude::*;
///
/// # async fn start() -> Result<(), TabulaError> {
/// let server = TabulaServer::builder()
///     .bind("0.0.0.0:3000")
///     .room_config(RoomConfig {
///         max_spectators: 8,
///         ..RoomConfig::default()
///     })
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct TabulaServerBuilder {
    bind_addr: String,
    room_config: RoomConfig,
    report_errors: bool,
    hub_channel_size: usize,
    outbound_buffer: usize,
    handshake_timeout: Duration,
}

impl TabulaServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            room_config: RoomConfig::default(),
            report_errors: true,
            hub_channel_size: DEFAULT_HUB_CHANNEL_SIZE,
            outbound_buffer: DEFAULT_OUTBOUND_BUFFER,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets seat count and spectator limits for every room.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Whether refused commands are answered with an `error` event.
    /// When off, they are only logged.
    pub fn report_errors(mut self, enabled: bool) -> Self {
        self.report_errors = enabled;
        self
    }

    pub fn hub_channel_size(mut self, size: usize) -> Self {
        self.hub_channel_size = size.max(1);
        self
    }

    /// Events a connection may have queued before it is disconnected for
    /// not keeping up.
    pub fn outbound_buffer(mut self, size: usize) -> Self {
        self.outbound_buffer = size.max(1);
        self
    }

    /// How long an accepted socket has to complete the WebSocket upgrade.
    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Binds the listener and starts the hub.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(self) -> Result<TabulaServer<JsonCodec>, TabulaError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        let hub = spawn_hub(self.room_config, self.report_errors, self.hub_channel_size);

        let state = Arc::new(ServerState {
            hub,
            codec: JsonCodec,
            outbound_buffer: self.outbound_buffer,
        });

        Ok(TabulaServer {
            transport,
            state,
            handshake_timeout: self.handshake_timeout,
        })
    }
}

impl Default for TabulaServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Tabula server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct TabulaServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
    handshake_timeout: Duration,
}

impl TabulaServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> TabulaServerBuilder {
        TabulaServerBuilder::new()
    }
}

impl<C: Codec> TabulaServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// A handle to the hub, for querying rooms from outside a connection.
    pub fn hub(&self) -> HubHandle {
        self.state.hub.clone()
    }

    /// Runs the accept loop, spawning a task per accepted socket. The
    /// WebSocket upgrade happens inside that task, so a peer that never
    /// finishes it only ties up its own task. Runs until the process is
    /// terminated.
    pub async fn run(mut self) -> Result<(), TabulaError> {
        tracing::info!("Tabula server running");

        loop {
            match self.transport.accept().await {
                Ok(incoming) => {
                    let state = Arc::clone(&self.state);
                    let timeout = self.handshake_timeout;
                    tokio::spawn(async move {
                        let id = incoming.id();
                        let peer = incoming.peer_addr();
                        let conn = match incoming.upgrade(timeout).await {
                            Ok(conn) => conn,
                            Err(e) => {
                                tracing::debug!(%id, %peer, error = %e, "handshake failed");
                                return;
                            }
                        };
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(%id, error = %e, "connection ended with error");
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
