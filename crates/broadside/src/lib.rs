//! # Broadside
//!
//! Authoritative server for two-player battleship over TCP.
//!
//! Each player holds one connection carrying length-prefixed JSON frames.
//! The server hands out player ids, pairs players into rooms (by id or by
//! random matchmaking), enforces turn order and resolves every shot.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use broadside::prelude::*;
//!
//! # async fn run() -> Result<(), BroadsideError> {
//! let server = BroadsideServer::builder()
//!     .bind("127.0.0.1:65432")
//!     .build()
//!     .await?;
//! server.run_until(async {
//!     let _ = tokio::signal::ctrl_c().await;
//! })
//! .await
//! # }
//! ```

mod client;
mod error;
mod handler;
mod server;

pub use client::BroadsideClient;
pub use error::BroadsideError;
pub use handler::UNJOINABLE_ROOM_MSG;
pub use broadside_transport::DEFAULT_MAX_FRAME_LEN;
pub use server::{BroadsideServer, BroadsideServerBuilder, DEFAULT_BIND_ADDR};

/// Re-exports of the types most users need.
pub mod prelude {
    pub use crate::{
        BroadsideClient, BroadsideError, BroadsideServer,
        BroadsideServerBuilder, UNJOINABLE_ROOM_MSG,
    };
    pub use broadside_protocol::{
        Cell, ClientMessage, PlayerId, RoomId, RoomType, ServerMessage,
        ShipLayout, ShotStatus,
    };
    pub use broadside_room::RoomConfig;
    pub use broadside_session::SessionConfig;
}
