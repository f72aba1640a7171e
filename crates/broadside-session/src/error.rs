//! Error types for the session layer.

use broadside_protocol::PlayerId;

/// Errors that can occur during session management.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No session exists for the given player.
    #[error("session not found for player {0}")]
    NotFound(PlayerId),

    /// Every id in the configured range belongs to a live session.
    #[error("no free player id in {min}..={max}")]
    IdSpaceExhausted {
        /// Lowest id in the range.
        min: u64,
        /// Highest id in the range.
        max: u64,
    },
}
