//! Commands going into the lobby and effects coming out of it.

use tabula_protocol::{ClientEvent, ConnectionId, Payload, ServerEvent};

/// Something a connection asked the lobby to do.
///
/// Mirrors [`ClientEvent`] plus the two events only the transport raises:
/// a connection arriving and a connection going away.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// The transport accepted a new connection.
    Connect,
    CreateRoom { name: String },
    ListRooms,
    JoinRoom { name: String },
    JoinRoomAsSpectator { name: String },
    Leave(LeaveReason),
    UpdateBoard(Payload),
    RemovePiece(Payload),
}

/// Why a connection is leaving its room. Both are handled identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveReason {
    /// The client sent `quitRoom`.
    Quit,
    /// The transport lost the connection.
    Disconnect,
}

impl From<ClientEvent> for Command {
    fn from(event: ClientEvent) -> Self {
        match event {
            ClientEvent::CreateRoom(name) => Self::CreateRoom { name },
            ClientEvent::ListRooms => Self::ListRooms,
            ClientEvent::JoinRoom(name) => Self::JoinRoom { name },
            ClientEvent::JoinRoomAsSpectator(name) => Self::JoinRoomAsSpectator { name },
            ClientEvent::QuitRoom => Self::Leave(LeaveReason::Quit),
            ClientEvent::UpdateBoard(payload) => Self::UpdateBoard(payload),
            ClientEvent::RemovePiece(payload) => Self::RemovePiece(payload),
        }
    }
}

/// Who should receive an outbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    /// Unicast to one connection.
    Connection(ConnectionId),

    /// Multicast to a room's members, resolved when the effect was produced.
    Members(Vec<ConnectionId>),

    /// Every connected client, including ones in no room. Only the
    /// connection registry knows that set, so it is resolved on delivery.
    Everyone,
}

/// One outbound event and where it goes.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub to: Recipient,
    pub event: ServerEvent,
}

impl Outbound {
    pub fn to(conn: ConnectionId, event: ServerEvent) -> Self {
        Self {
            to: Recipient::Connection(conn),
            event,
        }
    }

    pub fn members(members: Vec<ConnectionId>, event: ServerEvent) -> Self {
        Self {
            to: Recipient::Members(members),
            event,
        }
    }

    pub fn everyone(event: ServerEvent) -> Self {
        Self {
            to: Recipient::Everyone,
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_room_becomes_leave() {
        assert_eq!(
            Command::from(ClientEvent::QuitRoom),
            Command::Leave(LeaveReason::Quit)
        );
    }

    #[test]
    fn test_join_room_keeps_name() {
        assert_eq!(
            Command::from(ClientEvent::JoinRoom("alpha".into())),
            Command::JoinRoom {
                name: "alpha".into()
            }
        );
    }

    #[test]
    fn test_outbound_constructors() {
        let conn = ConnectionId::new(1);
        let out = Outbound::to(conn, ServerEvent::PlayerLeft(conn));
        assert_eq!(out.to, Recipient::Connection(conn));

        let out = Outbound::everyone(ServerEvent::RoomList(vec![]));
        assert_eq!(out.to, Recipient::Everyone);
    }
}
