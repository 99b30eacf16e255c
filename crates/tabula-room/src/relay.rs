//! Relay of game payloads to the sender's room.

use tabula_protocol::{ConnectionId, ServerEvent};

use crate::{Lobby, Outbound, RoomError};

impl Lobby {
    /// Forwards `event` to every member of the sender's room, the sender
    /// included. Payloads are not inspected.
    pub(crate) fn relay(
        &self,
        conn: ConnectionId,
        event: ServerEvent,
    ) -> Result<Vec<Outbound>, RoomError> {
        let room = self.store().room_of(conn).ok_or(RoomError::NotInRoom(conn))?;
        tracing::trace!(room = %room.name(), %conn, "relaying game event");
        Ok(vec![Outbound::members(room.members(), event)])
    }
}
