//! Rooms, matchmaking and game rules for Broadside.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns the
//! seats, fleets and turn of one two-player game.
//!
//! # Key types
//!
//! - [`RoomManager`]: creates/destroys rooms, routes players, matchmaking
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`Game`]: the synchronous state machine a room drives
//! - [`Fleet`]: one player's ships and remaining health
//! - [`RoomState`]: `Waiting` / `Playing`

mod config;
mod error;
mod fleet;
mod logic;
mod manager;
mod room;

pub use config::{MAX_PLAYERS, RoomConfig, RoomState};
pub use error::RoomError;
pub use fleet::{Fleet, Ship};
pub use logic::{Game, Outbound};
pub use manager::RoomManager;
pub use room::{PlayerSender, RoomHandle, RoomInfo};
