//! Player session management for Broadside.
//!
//! A session is the server's record of one live TCP connection: the
//! ephemeral [`PlayerId`](broadside_protocol::PlayerId) it was given, the
//! peer address, and when it connected. Sessions are created on accept and
//! removed when the connection closes; there is no reconnection and no
//! authentication, so a returning client is simply a new player.
//!
//! # How it fits in the stack
//!
//! ```text
//! Room Layer (above)  ← seats players by PlayerId
//!     ↕
//! Session Layer (this crate)  ← hands out PlayerIds unique among live connections
//!     ↕
//! Protocol Layer (below)  ← defines PlayerId
//! ```

mod error;
mod manager;
mod session;

pub use error::SessionError;
pub use manager::SessionManager;
pub use session::{Session, SessionConfig};
