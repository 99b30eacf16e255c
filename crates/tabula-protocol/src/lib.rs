//! Wire protocol for Tabula.
//!
//! This crate defines what clients and the server say to each other:
//!
//! - **Events** ([`ClientEvent`], [`ServerEvent`], [`RoomSnapshot`]): the
//!   named messages that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those events are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong while doing so.
//!
//! Every frame is a JSON object of the form
//! `{"event": "<name>", "data": <payload>}`; events without a payload omit
//! `data`.
//!
//! ```text
//! Transport (bytes) → Protocol (events) → Room engine (commands/effects)
//! ```

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use tabula_transport::ConnectionId;
pub use types::{ClientEvent, Payload, RoomSnapshot, ServerEvent};
