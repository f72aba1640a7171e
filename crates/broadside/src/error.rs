//! Unified error type for Broadside.

use broadside_protocol::ProtocolError;
use broadside_room::RoomError;
use broadside_session::SessionError;
use broadside_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impl, so
/// `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum BroadsideError {
    /// A transport-level error (connect, send, recv, oversized frame).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (id space exhausted, unknown player).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A room-level error (full, not found, already seated).
    #[error(transparent)]
    Room(#[from] RoomError),
}
