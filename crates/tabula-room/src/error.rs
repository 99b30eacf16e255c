//! Error types for the room layer.

use tabula_protocol::{ConnectionId, ServerEvent};

/// Why the lobby refused a command.
///
/// A refused command leaves the room store untouched and produces no
/// outbound events.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// No room with this name exists.
    #[error("room {0} not found")]
    NotFound(String),

    /// Every seat in the room is taken.
    #[error("room {0} is full")]
    RoomFull(String),

    /// The connection is already seated in, or watching, a room.
    #[error("{0} is already in room {1}")]
    AlreadyInRoom(ConnectionId, String),

    /// The connection is not in any room.
    #[error("{0} is not in any room")]
    NotInRoom(ConnectionId),

    /// Spectating is disabled by the lobby's configuration.
    #[error("room {0} does not accept spectators")]
    SpectatorsNotAllowed(String),

    /// The room already has as many spectators as allowed.
    #[error("room {0} has no spectator slots left")]
    SpectatorLimit(String),

    /// Someone created a new room under this name, closing the room the
    /// connection was in.
    #[error("room {0} was replaced by a new room of the same name")]
    Replaced(String),
}

impl RoomError {
    /// HTTP-style status code sent to clients alongside the message.
    pub fn code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::NotInRoom(_) => 400,
            Self::SpectatorsNotAllowed(_) => 403,
            Self::RoomFull(_) | Self::AlreadyInRoom(..) | Self::SpectatorLimit(_) => 409,
            Self::Replaced(_) => 410,
        }
    }

    /// The `error` event that tells a client about this error.
    pub fn to_event(&self) -> ServerEvent {
        ServerEvent::Error {
            code: self.code(),
            message: self.to_string(),
        }
    }
}
