//! Error types for the room layer.

use broadside_protocol::{PlayerId, RoomId};

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// Both seats are taken.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// The player is already in this room.
    #[error("player {0} already in room {1}")]
    AlreadyInRoom(PlayerId, RoomId),

    /// The player is not in this room.
    #[error("player {0} not in room {1}")]
    NotInRoom(PlayerId, RoomId),

    /// The operation conflicts with where the player currently is,
    /// e.g. creating a room while already seated in another one.
    #[error("{0}")]
    InvalidState(String),

    /// Every room id in the configured range is in use.
    #[error("no free room id in {min}..={max}")]
    IdSpaceExhausted {
        /// Lowest id in the range.
        min: u32,
        /// Highest id in the range.
        max: u32,
    },

    /// The room's command channel is closed.
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),
}

impl RoomError {
    /// Returns `true` for failures a joining player reports as
    /// "room full or does not exist".
    pub fn is_unjoinable(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::RoomFull(_) | Self::Unavailable(_)
        )
    }
}
