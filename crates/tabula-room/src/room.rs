//! A single room: its name and who is in it.

use tabula_protocol::{ConnectionId, RoomSnapshot};

use crate::{RoomConfig, RoomState};

/// How a connection takes part in a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seat {
    Player,
    Spectator,
}

/// Membership of one room.
///
/// Rooms are only mutated through [`RoomStore`](crate::RoomStore), which
/// keeps the connection → room index in step with these lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    name: String,
    players: Vec<ConnectionId>,
    spectators: Vec<ConnectionId>,
}

impl Room {
    /// A fresh room with its creator in seat 1.
    pub fn new(name: impl Into<String>, creator: ConnectionId) -> Self {
        Self {
            name: name.into(),
            players: vec![creator],
            spectators: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Players in seat order.
    pub fn players(&self) -> &[ConnectionId] {
        &self.players
    }

    pub fn spectators(&self) -> &[ConnectionId] {
        &self.spectators
    }

    pub fn state(&self, config: &RoomConfig) -> RoomState {
        RoomState::for_players(self.players.len(), config)
    }

    /// Every member, players first. This is the room's multicast group.
    pub fn members(&self) -> Vec<ConnectionId> {
        self.players
            .iter()
            .chain(self.spectators.iter())
            .copied()
            .collect()
    }

    pub fn is_member(&self, conn: ConnectionId) -> bool {
        self.seat_of(conn).is_some()
    }

    /// Players are checked before spectators.
    pub fn seat_of(&self, conn: ConnectionId) -> Option<Seat> {
        if self.players.contains(&conn) {
            Some(Seat::Player)
        } else if self.spectators.contains(&conn) {
            Some(Seat::Spectator)
        } else {
            None
        }
    }

    pub fn has_players(&self) -> bool {
        !self.players.is_empty()
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            name: self.name.clone(),
            players: self.players.clone(),
            spectators: self.spectators.clone(),
        }
    }

    pub(crate) fn push(&mut self, conn: ConnectionId, seat: Seat) {
        match seat {
            Seat::Player => self.players.push(conn),
            Seat::Spectator => self.spectators.push(conn),
        }
    }

    /// Removes `conn` from both lists. Returns the seat it held, if any.
    pub(crate) fn remove(&mut self, conn: ConnectionId) -> Option<Seat> {
        let seat = self.seat_of(conn)?;
        self.players.retain(|id| *id != conn);
        self.spectators.retain(|id| *id != conn);
        Some(seat)
    }
}
