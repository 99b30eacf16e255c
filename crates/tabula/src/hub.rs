//! The hub: a single task that owns the lobby and every connection's
//! outbound channel.
//!
//! Connection tasks never touch room state. They send [`HubCommand`]s
//! through a [`HubHandle`], and the hub applies them one at a time, so
//! commands from different connections are serialized in arrival order.
//!
//! ```text
//! conn task ──HubCommand──→ Hub ──Lobby::handle──→ Vec<Outbound>
//!     ↑                                                  │
//!     └──────────── ServerEvent (bounded) ←──────────────┘
//! ```

use std::collections::HashMap;

use tabula_protocol::{ClientEvent, ConnectionId, RoomSnapshot, ServerEvent};
use tabula_room::{Command, LeaveReason, Lobby, Outbound, Recipient, RoomConfig};
use tokio::sync::{mpsc, oneshot};

use crate::TabulaError;

/// Channel the hub uses to push events to one connection task. It is
/// bounded; a connection that lets it fill up is disconnected.
pub type EventSender = mpsc::Sender<ServerEvent>;

/// Commands sent to the hub through its channel.
pub(crate) enum HubCommand {
    /// Register a connection and greet it with its id.
    Connect {
        conn: ConnectionId,
        sender: EventSender,
    },

    /// A decoded event from a client.
    Event {
        conn: ConnectionId,
        event: ClientEvent,
    },

    /// The connection is gone; leave its room and forget it.
    Disconnect { conn: ConnectionId },

    /// Request the current room list.
    Rooms {
        reply: oneshot::Sender<Vec<RoomSnapshot>>,
    },
}

/// Handle to the running hub. Cheap to clone.
#[derive(Clone)]
pub struct HubHandle {
    sender: mpsc::Sender<HubCommand>,
}

impl HubHandle {
    /// Registers a connection. The hub answers with `playerConnected` on
    /// `sender` before anything else.
    pub async fn connect(
        &self,
        conn: ConnectionId,
        sender: EventSender,
    ) -> Result<(), TabulaError> {
        self.send(HubCommand::Connect { conn, sender }).await
    }

    /// Forwards a client event (fire-and-forget).
    pub async fn dispatch(
        &self,
        conn: ConnectionId,
        event: ClientEvent,
    ) -> Result<(), TabulaError> {
        self.send(HubCommand::Event { conn, event }).await
    }

    /// Tells the hub a connection is gone.
    pub async fn disconnect(&self, conn: ConnectionId) -> Result<(), TabulaError> {
        self.send(HubCommand::Disconnect { conn }).await
    }

    /// Same as [`disconnect`](Self::disconnect), for callers that cannot
    /// await. Falls back to a spawned send when the channel is full.
    pub(crate) fn disconnect_now(&self, conn: ConnectionId) {
        match self.sender.try_send(HubCommand::Disconnect { conn }) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(cmd)) => {
                let sender = self.sender.clone();
                match tokio::runtime::Handle::try_current() {
                    Ok(runtime) => {
                        runtime.spawn(async move {
                            let _ = sender.send(cmd).await;
                        });
                    }
                    Err(_) => tracing::warn!(%conn, "no runtime to deliver disconnect"),
                }
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(%conn, "hub gone before disconnect");
            }
        }
    }

    /// Snapshot of every room in creation order.
    pub async fn rooms(&self) -> Result<Vec<RoomSnapshot>, TabulaError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(HubCommand::Rooms { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| TabulaError::HubUnavailable)
    }

    async fn send(&self, cmd: HubCommand) -> Result<(), TabulaError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| TabulaError::HubUnavailable)
    }
}

struct Hub {
    lobby: Lobby,
    /// Outbound channel of every live connection.
    registry: HashMap<ConnectionId, EventSender>,
    /// Connections whose outbound queue overflowed during this command.
    lagging: Vec<ConnectionId>,
    report_errors: bool,
    receiver: mpsc::Receiver<HubCommand>,
}

impl Hub {
    /// Runs until every [`HubHandle`] is dropped.
    async fn run(mut self) {
        tracing::debug!("hub started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                HubCommand::Connect { conn, sender } => {
                    self.registry.insert(conn, sender);
                    let connections = self.registry.len();
                    tracing::info!(%conn, connections, "client connected");
                    self.apply(conn, Command::Connect, false);
                }
                HubCommand::Event { conn, event } => {
                    let report = self.report_errors;
                    self.apply(conn, event.into(), report);
                }
                HubCommand::Disconnect { conn } => {
                    if self.drop_connection(conn) {
                        let connections = self.registry.len();
                        tracing::info!(%conn, connections, "client disconnected");
                    }
                }
                HubCommand::Rooms { reply } => {
                    let _ = reply.send(self.lobby.rooms());
                }
            }
            self.evict_lagging();
        }

        tracing::debug!("hub stopped");
    }

    fn apply(&mut self, conn: ConnectionId, command: Command, report: bool) {
        match self.lobby.handle(conn, command) {
            Ok(effects) => self.deliver(effects),
            Err(e) => {
                tracing::debug!(%conn, error = %e, "command rejected");
                if report {
                    self.send_to(conn, e.to_event());
                }
            }
        }
    }

    /// Forgets a connection and takes it out of its room. Returns `false`
    /// if it was already gone.
    fn drop_connection(&mut self, conn: ConnectionId) -> bool {
        if self.registry.remove(&conn).is_none() {
            return false;
        }
        self.apply(conn, Command::Leave(LeaveReason::Disconnect), false);
        true
    }

    /// Disconnects every connection that could not keep up. Dropping its
    /// sender ends the connection task once the queue is drained.
    fn evict_lagging(&mut self) {
        while let Some(conn) = self.lagging.pop() {
            if self.drop_connection(conn) {
                tracing::warn!(%conn, "outbound queue full, disconnecting slow client");
            }
        }
    }

    fn deliver(&mut self, effects: Vec<Outbound>) {
        for Outbound { to, event } in effects {
            match to {
                Recipient::Connection(conn) => self.send_to(conn, event),
                Recipient::Members(members) => {
                    for conn in members {
                        self.send_to(conn, event.clone());
                    }
                }
                Recipient::Everyone => {
                    for (conn, sender) in &self.registry {
                        push(*conn, sender, event.clone(), &mut self.lagging);
                    }
                }
            }
        }
    }

    fn send_to(&mut self, conn: ConnectionId, event: ServerEvent) {
        match self.registry.get(&conn) {
            Some(sender) => push(conn, sender, event, &mut self.lagging),
            None => tracing::trace!(%conn, "no such connection"),
        }
    }
}

/// Queues `event` without waiting. A full queue marks the connection as
/// lagging.
fn push(
    conn: ConnectionId,
    sender: &EventSender,
    event: ServerEvent,
    lagging: &mut Vec<ConnectionId>,
) {
    match sender.try_send(event) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(_)) => {
            if !lagging.contains(&conn) {
                lagging.push(conn);
            }
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            tracing::trace!(%conn, "connection task already gone");
        }
    }
}

/// Spawns the hub task and returns a handle to it.
///
/// `channel_size` bounds the command queue; connection tasks wait when it
/// is full.
pub fn spawn_hub(config: RoomConfig, report_errors: bool, channel_size: usize) -> HubHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let hub = Hub {
        lobby: Lobby::new(config),
        registry: HashMap::new(),
        lagging: Vec::new(),
        report_errors,
        receiver: rx,
    };

    tokio::spawn(hub.run());

    HubHandle { sender: tx }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::Receiver;

    fn cid(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    async fn register(hub: &HubHandle, id: u64) -> Receiver<ServerEvent> {
        register_with_buffer(hub, id, 32).await
    }

    async fn register_with_buffer(
        hub: &HubHandle,
        id: u64,
        buffer: usize,
    ) -> Receiver<ServerEvent> {
        let (tx, mut rx) = mpsc::channel(buffer);
        hub.connect(cid(id), tx).await.unwrap();
        assert_eq!(rx.recv().await, Some(ServerEvent::PlayerConnected(cid(id))));
        rx
    }

    #[tokio::test]
    async fn test_connect_greets_with_id() {
        let hub = spawn_hub(RoomConfig::default(), true, 8);
        let _rx = register(&hub, 1).await;
    }

    #[tokio::test]
    async fn test_create_room_broadcasts_list_to_everyone() {
        let hub = spawn_hub(RoomConfig::default(), true, 8);
        let mut alice = register(&hub, 1).await;
        let mut bob = register(&hub, 2).await;

        hub.dispatch(cid(1), ClientEvent::CreateRoom("alpha".into()))
            .await
            .unwrap();

        assert!(matches!(alice.recv().await, Some(ServerEvent::RoomCreated(_))));
        assert!(matches!(
            alice.recv().await,
            Some(ServerEvent::RoomList(rooms)) if rooms.len() == 1
        ));
        assert!(matches!(
            bob.recv().await,
            Some(ServerEvent::RoomList(rooms)) if rooms.len() == 1
        ));
    }

    #[tokio::test]
    async fn test_rejection_reported_as_error_event() {
        let hub = spawn_hub(RoomConfig::default(), true, 8);
        let mut alice = register(&hub, 1).await;

        hub.dispatch(cid(1), ClientEvent::JoinRoom("ghost".into()))
            .await
            .unwrap();

        assert_eq!(
            alice.recv().await,
            Some(ServerEvent::Error {
                code: 404,
                message: "room ghost not found".into(),
            })
        );
    }

    #[tokio::test]
    async fn test_rejection_silent_when_reporting_disabled() {
        let hub = spawn_hub(RoomConfig::default(), false, 8);
        let mut alice = register(&hub, 1).await;

        hub.dispatch(cid(1), ClientEvent::QuitRoom).await.unwrap();
        hub.dispatch(cid(1), ClientEvent::ListRooms).await.unwrap();

        // The quit produced nothing; the next event is the list.
        assert_eq!(alice.recv().await, Some(ServerEvent::RoomList(vec![])));
    }

    #[tokio::test]
    async fn test_disconnect_removes_player_from_room() {
        let hub = spawn_hub(RoomConfig::default(), true, 8);
        let _alice = register(&hub, 1).await;
        let mut bob = register(&hub, 2).await;

        hub.dispatch(cid(1), ClientEvent::CreateRoom("alpha".into()))
            .await
            .unwrap();
        hub.dispatch(cid(2), ClientEvent::JoinRoom("alpha".into()))
            .await
            .unwrap();
        hub.disconnect(cid(1)).await.unwrap();

        let rooms = hub.rooms().await.unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].players, vec![cid(2)]);

        let mut saw_left = false;
        while let Ok(event) = bob.try_recv() {
            if event == ServerEvent::PlayerLeft(cid(1)) {
                saw_left = true;
            }
        }
        assert!(saw_left);
    }

    #[tokio::test]
    async fn test_second_disconnect_is_ignored() {
        let hub = spawn_hub(RoomConfig::default(), true, 8);
        let _alice = register(&hub, 1).await;

        hub.disconnect(cid(1)).await.unwrap();
        hub.disconnect(cid(1)).await.unwrap();

        assert!(hub.rooms().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_disconnect_now_reaches_hub() {
        let hub = spawn_hub(RoomConfig::default(), true, 8);
        let _alice = register(&hub, 1).await;
        hub.dispatch(cid(1), ClientEvent::CreateRoom("alpha".into()))
            .await
            .unwrap();

        hub.disconnect_now(cid(1));

        assert!(hub.rooms().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_slow_client_is_disconnected() {
        let hub = spawn_hub(RoomConfig::default(), true, 8);
        let mut slow = register_with_buffer(&hub, 1, 1).await;
        let mut bob = register(&hub, 2).await;

        // roomCreated fills the one slot; the roomList broadcast overflows.
        hub.dispatch(cid(1), ClientEvent::CreateRoom("alpha".into()))
            .await
            .unwrap();

        assert!(hub.rooms().await.unwrap().is_empty());
        assert!(matches!(slow.recv().await, Some(ServerEvent::RoomCreated(_))));
        assert_eq!(slow.recv().await, None);

        // Bob saw the room appear and then vanish with its evicted creator.
        assert!(matches!(
            bob.recv().await,
            Some(ServerEvent::RoomList(rooms)) if rooms.len() == 1
        ));
        assert_eq!(bob.recv().await, Some(ServerEvent::RoomList(vec![])));
    }
}
