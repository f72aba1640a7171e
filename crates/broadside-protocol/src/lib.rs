//! Wire protocol for Broadside.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Types** ([`PlayerId`], [`RoomId`], [`Cell`], [`ShipLayout`], etc.):
//!   the values that appear inside messages.
//! - **Messages** ([`ClientMessage`], [`ServerMessage`]): one variant per
//!   `action`, decoded through a tagged-union deserializer.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how messages are turned
//!   into frame payloads and back.
//! - **Errors** ([`ProtocolError`]): what can go wrong doing so.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw frames) and the room
//! layer (game rules). It doesn't know about sockets or rooms; it only
//! knows how messages look on the wire.
//!
//! ```text
//! Transport (frames) → Protocol (ClientMessage) → Room (Game)
//! ```

mod codec;
mod error;
mod messages;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use messages::{ClientMessage, ServerMessage};
pub use types::{
    Cell, GRID_SIZE, PlayerId, Recipient, RoomId, RoomType, ShipLayout,
    ShotStatus,
};
