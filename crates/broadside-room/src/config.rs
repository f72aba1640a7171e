//! Room configuration and state.

use serde::{Deserialize, Serialize};

/// Seats per room.
pub const MAX_PLAYERS: usize = 2;

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Configuration shared by every room the manager creates.
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// Lowest numeric room id.
    pub id_min: u32,

    /// Highest numeric room id.
    pub id_max: u32,

    /// Capacity of each room actor's command channel.
    pub channel_size: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            id_min: 1000,
            id_max: 9999,
            channel_size: 64,
        }
    }
}

// ---------------------------------------------------------------------------
// RoomState
// ---------------------------------------------------------------------------

/// The game phase of a room.
///
/// ```text
///            both seated + both fleets submitted
/// Waiting ───────────────────────────────────────→ Playing
///    ↑                                                │
///    └──── a fleet is destroyed, or a player leaves ──┘
/// ```
///
/// - **Waiting**: zero, one or two players; fleets may be submitted.
///   Public rooms in this state with a free seat are matchmaking targets.
/// - **Playing**: both fleets are on the board and turns alternate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomState {
    Waiting,
    Playing,
}

impl RoomState {
    /// Returns `true` if new players may be seated.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Waiting)
    }

    /// Returns `true` while a game is in progress.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Playing)
    }
}

impl std::fmt::Display for RoomState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Playing => write!(f, "playing"),
        }
    }
}
