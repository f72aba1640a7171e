//! Session types: the data the server keeps per connected player.

use std::net::SocketAddr;
use std::time::Instant;

use broadside_protocol::PlayerId;

/// Configuration for player id allocation.
///
/// Ids are drawn at random from `id_min..=id_max` and are unique among
/// live sessions. The default gives the familiar 4-digit ids.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Lowest id handed out.
    pub id_min: u64,
    /// Highest id handed out.
    pub id_max: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            id_min: 1000,
            id_max: 9999,
        }
    }
}

/// A single connected player.
#[derive(Debug, Clone)]
pub struct Session {
    /// The id announced to the client in the `id` message.
    pub player_id: PlayerId,

    /// Remote address of the connection.
    pub peer: SocketAddr,

    /// When the connection was accepted.
    pub connected_at: Instant,
}
