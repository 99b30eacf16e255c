//! Unified error type for the Tabula server.

use tabula_protocol::ProtocolError;
use tabula_transport::TransportError;

/// Top-level error for the server and its connection tasks.
///
/// Room refusals never surface here: the hub turns them into `error`
/// events for the client that caused them.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum TabulaError {
    /// A transport-level error (accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The hub task has stopped and can no longer take commands.
    #[error("hub is no longer running")]
    HubUnavailable,
}
