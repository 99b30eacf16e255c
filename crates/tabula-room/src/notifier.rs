//! Room list notifications.
//!
//! There is no diffing: every notification carries the full list.

use tabula_protocol::{ConnectionId, ServerEvent};

use crate::{Lobby, Outbound};

impl Lobby {
    /// The room list for one connection.
    pub(crate) fn room_list_to(&self, conn: ConnectionId) -> Outbound {
        Outbound::to(conn, ServerEvent::RoomList(self.rooms()))
    }

    /// The room list for every connected client.
    pub(crate) fn room_list_to_everyone(&self) -> Outbound {
        Outbound::everyone(ServerEvent::RoomList(self.rooms()))
    }
}
