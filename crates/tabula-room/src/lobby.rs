//! The lobby: room lifecycle state machine.
//!
//! [`Lobby::handle`] is the whole engine. It takes the connection a command
//! came from and the command, updates the room store, and returns the
//! events to deliver. It performs no I/O, so the transport, the hub and the
//! tests all drive it the same way.
//!
//! ```text
//! Command ──→ Lobby::handle ──→ RoomStore mutated
//!                   │
//!                   └──→ Vec<Outbound> (unicast / room multicast / broadcast)
//! ```

use tabula_protocol::{ConnectionId, RoomSnapshot, ServerEvent};

use crate::{Command, Outbound, Room, RoomConfig, RoomError, RoomState, RoomStore, Seat};

/// Owns the room store and applies commands to it.
#[derive(Debug, Default)]
pub struct Lobby {
    store: RoomStore,
    config: RoomConfig,
}

impl Lobby {
    pub fn new(config: RoomConfig) -> Self {
        Self {
            store: RoomStore::new(),
            config,
        }
    }

    pub fn store(&self) -> &RoomStore {
        &self.store
    }

    /// Every room in creation order.
    pub fn rooms(&self) -> Vec<RoomSnapshot> {
        self.store.snapshots()
    }

    /// Applies one command from `conn`.
    ///
    /// # Errors
    /// A lookup miss or a violated room invariant is returned as a
    /// [`RoomError`]; the store is left unchanged and nothing is sent.
    ///
    /// Creating a room under a taken name is not an error: the old room is
    /// dropped, and its members get an `error` event with code 410 and are
    /// free to join elsewhere.
    pub fn handle(
        &mut self,
        conn: ConnectionId,
        command: Command,
    ) -> Result<Vec<Outbound>, RoomError> {
        match command {
            Command::Connect => Ok(vec![Outbound::to(conn, ServerEvent::PlayerConnected(conn))]),
            Command::CreateRoom { name } => self.create_room(conn, name),
            Command::ListRooms => Ok(vec![self.room_list_to(conn)]),
            Command::JoinRoom { name } => self.join_room(conn, &name),
            Command::JoinRoomAsSpectator { name } => self.join_as_spectator(conn, &name),
            Command::Leave(reason) => {
                tracing::debug!(%conn, ?reason, "leaving room");
                self.leave(conn)
            }
            Command::UpdateBoard(payload) => self.relay(conn, ServerEvent::BoardUpdated(payload)),
            Command::RemovePiece(payload) => self.relay(conn, ServerEvent::PieceRemoved(payload)),
        }
    }

    /// Creates a room with `conn` in seat 1. A room already using the name
    /// is replaced, and its members are told with a `Replaced` error.
    fn create_room(
        &mut self,
        conn: ConnectionId,
        name: String,
    ) -> Result<Vec<Outbound>, RoomError> {
        self.ensure_roomless(conn)?;

        let room = Room::new(name, conn);
        let snapshot = room.snapshot();
        let mut out = vec![Outbound::to(conn, ServerEvent::RoomCreated(snapshot.clone()))];
        match self.store.insert(room) {
            Some(replaced) => {
                let evicted = replaced.members();
                tracing::info!(
                    room = %snapshot.name,
                    evicted = evicted.len(),
                    "room replaced by a new room of the same name"
                );
                let notice = RoomError::Replaced(snapshot.name.clone()).to_event();
                out.push(Outbound::members(evicted, notice));
            }
            None => tracing::info!(room = %snapshot.name, %conn, "room created"),
        }

        out.push(self.room_list_to_everyone());
        Ok(out)
    }

    fn join_room(&mut self, conn: ConnectionId, name: &str) -> Result<Vec<Outbound>, RoomError> {
        self.ensure_roomless(conn)?;

        let room = self
            .store
            .get(name)
            .ok_or_else(|| RoomError::NotFound(name.to_owned()))?;
        if !room.state(&self.config).is_joinable() {
            return Err(RoomError::RoomFull(name.to_owned()));
        }

        let room = self
            .store
            .attach(conn, name, Seat::Player)
            .ok_or_else(|| RoomError::NotFound(name.to_owned()))?;
        let snapshot = room.snapshot();
        let members = room.members();
        let state = room.state(&self.config);
        tracing::info!(
            room = %name,
            %conn,
            players = snapshot.players.len(),
            %state,
            "player joined"
        );

        let mut out = vec![Outbound::to(conn, ServerEvent::RoomJoined(snapshot.clone()))];
        if state == RoomState::InProgress {
            out.push(Outbound::members(members, ServerEvent::StartGame(snapshot)));
            out.push(self.room_list_to_everyone());
        }
        Ok(out)
    }

    fn join_as_spectator(
        &mut self,
        conn: ConnectionId,
        name: &str,
    ) -> Result<Vec<Outbound>, RoomError> {
        self.ensure_roomless(conn)?;

        let room = self
            .store
            .get(name)
            .ok_or_else(|| RoomError::NotFound(name.to_owned()))?;
        if !self.config.allow_spectators {
            return Err(RoomError::SpectatorsNotAllowed(name.to_owned()));
        }
        if !self.config.has_spectator_slot(room.spectators().len()) {
            return Err(RoomError::SpectatorLimit(name.to_owned()));
        }

        let room = self
            .store
            .attach(conn, name, Seat::Spectator)
            .ok_or_else(|| RoomError::NotFound(name.to_owned()))?;
        let snapshot = room.snapshot();
        tracing::info!(
            room = %name,
            %conn,
            spectators = snapshot.spectators.len(),
            "spectator joined"
        );

        Ok(vec![
            Outbound::to(
                conn,
                ServerEvent::JoinAsSpectatorClient {
                    room: snapshot,
                    spectator_id: conn,
                },
            ),
            self.room_list_to_everyone(),
        ])
    }

    /// Removes `conn` from its room, tearing the room down once no player
    /// is left. Remaining spectators of a torn-down room are released
    /// without a `playerLeft`.
    fn leave(&mut self, conn: ConnectionId) -> Result<Vec<Outbound>, RoomError> {
        let (name, seat) = self.store.detach(conn).ok_or(RoomError::NotInRoom(conn))?;

        let remaining = match self.store.get(&name) {
            Some(room) if room.has_players() => Some(room.members()),
            _ => None,
        };

        let mut out = Vec::with_capacity(2);
        match remaining {
            Some(members) => {
                tracing::info!(room = %name, %conn, ?seat, "member left");
                out.push(Outbound::members(members, ServerEvent::PlayerLeft(conn)));
            }
            None => {
                let released = self
                    .store
                    .remove(&name)
                    .map(|room| room.members().len())
                    .unwrap_or(0);
                tracing::info!(room = %name, %conn, released, "room removed");
            }
        }
        out.push(self.room_list_to_everyone());
        Ok(out)
    }

    fn ensure_roomless(&self, conn: ConnectionId) -> Result<(), RoomError> {
        match self.store.room_of(conn) {
            Some(room) => Err(RoomError::AlreadyInRoom(conn, room.name().to_owned())),
            None => Ok(()),
        }
    }
}
