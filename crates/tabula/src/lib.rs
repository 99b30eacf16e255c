//! # Tabula
//!
//! Room and relay server for two-player board games with spectators.
//!
//! Clients connect over WebSocket and exchange JSON events. Two players
//! share a room; once both seats are filled the game starts, and every
//! board update or piece removal from a member is relayed to the room's
//! players and spectators. The server never looks inside game payloads.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tabula::prelude::*;
//!
//! # async fn start() -> Result<(), TabulaError> {
//! let server = TabulaServer::builder().bind("0.0.0.0:3000").build().await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
pub mod hub;
mod server;

pub use error::TabulaError;
pub use server::{TabulaServer, TabulaServerBuilder};

pub mod prelude {
    pub use crate::hub::HubHandle;
    pub use crate::{TabulaError, TabulaServer, TabulaServerBuilder};
    pub use tabula_protocol::{ClientEvent, ConnectionId, RoomSnapshot, ServerEvent};
    pub use tabula_room::RoomConfig;
}
