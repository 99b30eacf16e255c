//! Room lifecycle and event relay for Tabula.
//!
//! The engine is synchronous and transport-free: a [`Lobby`] receives a
//! [`Command`] from a connection and returns the [`Outbound`] events to
//! deliver. Whoever owns the lobby (the server's hub task) serializes
//! commands, so no locking is needed here.
//!
//! # Key types
//!
//! - [`Lobby`]: applies commands, produces effects
//! - [`RoomStore`]: rooms by name plus a connection → room index
//! - [`Room`]: seat-ordered players and spectators
//! - [`RoomConfig`]: seat count and spectator limits
//! - [`RoomError`]: why a command was refused

mod config;
mod effect;
mod error;
mod lobby;
mod notifier;
mod relay;
mod room;
mod store;

pub use config::{RoomConfig, RoomState};
pub use effect::{Command, LeaveReason, Outbound, Recipient};
pub use error::RoomError;
pub use lobby::Lobby;
pub use room::{Room, Seat};
pub use store::RoomStore;
