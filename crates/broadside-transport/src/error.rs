/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The connection was closed.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding or accepting connections failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// A length prefix announced a frame larger than the configured limit.
    ///
    /// The stream cannot be resynchronised after this, so callers treat it
    /// like any other receive failure.
    #[error("frame of {len} bytes exceeds limit of {max} bytes")]
    FrameTooLarge {
        /// Length announced by the prefix (or the payload being sent).
        len: usize,
        /// Configured maximum.
        max: usize,
    },

    /// The transport was shut down.
    #[error("transport shut down")]
    Shutdown,
}
