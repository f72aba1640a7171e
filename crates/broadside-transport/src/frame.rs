//! Length-prefixed framing.
//!
//! Each frame is a 4-byte big-endian length followed by exactly that many
//! payload bytes. [`FrameBuffer`] accumulates whatever the socket hands us
//! and yields complete payloads once they are fully buffered.

use crate::TransportError;

/// Size of the length prefix in bytes.
pub const LENGTH_PREFIX_LEN: usize = 4;

/// Default upper bound on a single frame's payload (1 MiB).
pub const DEFAULT_MAX_FRAME_LEN: usize = 1024 * 1024;

/// Prefixes `payload` with its length as a big-endian `u32`.
///
/// # Errors
/// Returns [`TransportError::FrameTooLarge`] if the payload does not fit
/// in a `u32` length.
pub fn encode_frame(payload: &[u8]) -> Result<Vec<u8>, TransportError> {
    let len = u32::try_from(payload.len()).map_err(|_| {
        TransportError::FrameTooLarge {
            len: payload.len(),
            max: u32::MAX as usize,
        }
    })?;

    let mut frame = Vec::with_capacity(LENGTH_PREFIX_LEN + payload.len());
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(payload);
    Ok(frame)
}

/// Reassembles frames from an arbitrary chunking of the byte stream.
#[derive(Debug)]
pub struct FrameBuffer {
    buf: Vec<u8>,
    max_frame_len: usize,
}

impl FrameBuffer {
    /// Creates an empty buffer that rejects frames above `max_frame_len`.
    pub fn new(max_frame_len: usize) -> Self {
        Self {
            buf: Vec::new(),
            max_frame_len,
        }
    }

    /// Appends freshly read bytes.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Number of buffered bytes not yet consumed as frames.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Extracts the next complete payload, if one is fully buffered.
    ///
    /// Returns `Ok(None)` when more data is needed, either because the
    /// prefix itself is incomplete or because the payload is still short.
    ///
    /// # Errors
    /// Returns [`TransportError::FrameTooLarge`] when the prefix announces a
    /// payload above the limit. The buffer is left untouched; the stream is
    /// considered desynchronised.
    pub fn next_frame(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        let Some(prefix) = self.buf.first_chunk::<LENGTH_PREFIX_LEN>() else {
            return Ok(None);
        };
        let len = u32::from_be_bytes(*prefix) as usize;

        if len > self.max_frame_len {
            return Err(TransportError::FrameTooLarge {
                len,
                max: self.max_frame_len,
            });
        }

        let end = LENGTH_PREFIX_LEN + len;
        if self.buf.len() < end {
            return Ok(None);
        }

        let payload = self.buf[LENGTH_PREFIX_LEN..end].to_vec();
        self.buf.drain(..end);
        Ok(Some(payload))
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_LEN)
    }
}
