//! Wire events exchanged between clients and the relay.
//!
//! Both directions use the same adjacently tagged JSON shape:
//!
//! ```text
//! { "event": "joinRoom", "data": "alpha" }
//! { "event": "listRooms" }
//! ```
//!
//! Event names are camelCase, matching what browser clients emit.

use serde::{Deserialize, Serialize};
use tabula_transport::ConnectionId;

/// Opaque game payload relayed between room members.
///
/// The relay never inspects it; any JSON value is accepted.
pub type Payload = serde_json::Value;

// ---------------------------------------------------------------------------
// RoomSnapshot
// ---------------------------------------------------------------------------

/// A room as clients see it.
///
/// `players` is in seat order: the creator is seat 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub name: String,
    pub players: Vec<ConnectionId>,
    pub spectators: Vec<ConnectionId>,
}

// ---------------------------------------------------------------------------
// ClientEvent
// ---------------------------------------------------------------------------

/// Events a client may send.
///
/// `disconnect` is deliberately absent: it is raised by the transport when
/// the socket goes away, never sent by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Create a room with the given name and take seat 1.
    CreateRoom(String),

    /// Ask for the current room list.
    ListRooms,

    /// Take the next free seat in a named room.
    JoinRoom(String),

    /// Watch a named room without taking a seat.
    JoinRoomAsSpectator(String),

    /// Leave whatever room this connection is in.
    QuitRoom,

    /// Board state to forward to the sender's room.
    UpdateBoard(Payload),

    /// Piece removal to forward to the sender's room.
    RemovePiece(Payload),
}

// ---------------------------------------------------------------------------
// ServerEvent
// ---------------------------------------------------------------------------

/// Events the relay sends to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// First event on every connection: the id the server assigned to it.
    PlayerConnected(ConnectionId),

    /// Sent to the creator once the room exists.
    RoomCreated(RoomSnapshot),

    /// Sent to a player who took a seat.
    RoomJoined(RoomSnapshot),

    /// Sent to a new spectator along with its own id.
    #[serde(rename_all = "camelCase")]
    JoinAsSpectatorClient {
        room: RoomSnapshot,
        spectator_id: ConnectionId,
    },

    /// Every seat is taken; sent to all room members.
    StartGame(RoomSnapshot),

    /// A member left; sent to the members that remain.
    PlayerLeft(ConnectionId),

    /// Every room, in creation order. Clients replace their view wholesale.
    RoomList(Vec<RoomSnapshot>),

    /// Relayed `updateBoard` payload.
    BoardUpdated(Payload),

    /// Relayed `removePiece` payload.
    PieceRemoved(Payload),

    /// A command was rejected. `code` follows HTTP conventions
    /// (404 = no such room, 409 = conflict, ...).
    Error { code: u16, message: String },
}

// =========================================================================
// Tests
// =========================================================================
