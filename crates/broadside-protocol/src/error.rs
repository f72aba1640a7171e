//! Error types for the protocol layer.
//!
//! Each crate in Broadside defines its own error enum. When you see a
//! `ProtocolError`, you know the problem is in turning messages into
//! bytes or back, not in networking or room management.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, invalid UTF-8, a missing or unknown
    /// `action` tag, missing fields, or fields of the wrong type. On the
    /// server this is a framing error: the frame is dropped and the
    /// connection stays open.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}
