//! Per-connection handler: registration and frame pumping.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Register with the hub → `playerConnected` comes back first
//!   2. Loop: decode inbound frames into hub commands, encode hub events
//!      into outbound frames
//!   3. On exit (clean close, error, or panic) the guard disconnects

use std::sync::Arc;
use std::time::Duration;

use tabula_protocol::{ClientEvent, Codec, ConnectionId};
use tabula_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::hub::HubHandle;
use crate::server::ServerState;
use crate::TabulaError;

/// How long one outbound frame may take to reach the socket before the
/// peer is treated as gone.
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Drop guard that tells the hub a connection is gone when the handler
/// exits, however it exits.
struct ConnectionGuard {
    conn_id: ConnectionId,
    hub: HubHandle,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.hub.disconnect_now(self.conn_id);
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), TabulaError> {
    let conn_id = conn.id();
    let (tx, mut rx) = mpsc::channel(state.outbound_buffer);

    state.hub.connect(conn_id, tx).await?;
    let _guard = ConnectionGuard {
        conn_id,
        hub: state.hub.clone(),
    };

    loop {
        tokio::select! {
            inbound = conn.recv() => {
                let data = match inbound {
                    Ok(Some(data)) => data,
                    Ok(None) => {
                        tracing::debug!(%conn_id, "connection closed cleanly");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(%conn_id, error = %e, "recv error");
                        break;
                    }
                };

                let event: ClientEvent = match state.codec.decode(&data) {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::debug!(%conn_id, error = %e, "failed to decode event");
                        continue;
                    }
                };
                state.hub.dispatch(conn_id, event).await?;
            }
            outbound = rx.recv() => {
                // The hub dropped our sender: it shut down, or evicted us
                // for falling behind.
                let Some(event) = outbound else { break };
                let bytes = state.codec.encode(&event)?;
                match tokio::time::timeout(SEND_TIMEOUT, conn.send(&bytes)).await {
                    Ok(sent) => sent?,
                    Err(_) => {
                        tracing::debug!(%conn_id, "send timed out");
                        break;
                    }
                }
            }
        }
    }

    // _guard drops here → hub disconnect fires.
    Ok(())
}
