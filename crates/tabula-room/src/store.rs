//! The room store: every live room, plus who is where.

use std::collections::HashMap;

use tabula_protocol::{ConnectionId, RoomSnapshot};

use crate::{Room, Seat};

/// In-memory registry of rooms keyed by name.
///
/// Two invariants hold after every public call:
///
/// - `members` maps a connection to a room name iff that room lists the
///   connection as a player or spectator. Lookups by connection are O(1).
/// - `order` holds exactly the keys of `rooms`, in creation order.
///
/// `RoomStore` is not thread-safe; the lobby that owns it is driven by a
/// single task.
#[derive(Debug, Default)]
pub struct RoomStore {
    rooms: HashMap<String, Room>,

    /// Room names in creation order, for the room list.
    order: Vec<String>,

    /// Reverse index: connection → name of the room it is in.
    members: HashMap<ConnectionId, String>,
}

impl RoomStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a room, replacing any room with the same name.
    ///
    /// A replaced room keeps its position in the list; its members are
    /// dropped from the index and the replaced room is returned.
    pub fn insert(&mut self, room: Room) -> Option<Room> {
        let name = room.name().to_owned();
        let replaced = self.rooms.remove(&name);
        match &replaced {
            Some(old) => self.unindex(old),
            None => self.order.push(name.clone()),
        }
        for conn in room.members() {
            self.members.insert(conn, name.clone());
        }
        self.rooms.insert(name, room);
        replaced
    }

    pub fn get(&self, name: &str) -> Option<&Room> {
        self.rooms.get(name)
    }

    /// Room the connection is in, if any.
    pub fn room_of(&self, conn: ConnectionId) -> Option<&Room> {
        self.members.get(&conn).and_then(|name| self.rooms.get(name))
    }

    /// Adds `conn` to a room. Returns `None` if the room doesn't exist.
    ///
    /// The caller is responsible for checking that `conn` is not already in
    /// a room.
    pub fn attach(&mut self, conn: ConnectionId, name: &str, seat: Seat) -> Option<&Room> {
        let room = self.rooms.get_mut(name)?;
        room.push(conn, seat);
        self.members.insert(conn, name.to_owned());
        Some(room)
    }

    /// Removes `conn` from its room. Returns the room name and the seat it
    /// held, or `None` if it was in no room.
    ///
    /// The room itself stays, even if this emptied its seats.
    pub fn detach(&mut self, conn: ConnectionId) -> Option<(String, Seat)> {
        let name = self.members.remove(&conn)?;
        let seat = self.rooms.get_mut(&name)?.remove(conn)?;
        Some((name, seat))
    }

    /// Deletes a room and releases all of its members.
    pub fn remove(&mut self, name: &str) -> Option<Room> {
        let room = self.rooms.remove(name)?;
        self.order.retain(|n| n != name);
        self.unindex(&room);
        Some(room)
    }

    /// Every room in creation order.
    pub fn snapshots(&self) -> Vec<RoomSnapshot> {
        self.order
            .iter()
            .filter_map(|name| self.rooms.get(name))
            .map(Room::snapshot)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    fn unindex(&mut self, room: &Room) {
        for conn in room.members() {
            if self.members.get(&conn).map(String::as_str) == Some(room.name()) {
                self.members.remove(&conn);
            }
        }
    }
}
