//! The session manager: tracks every live connection's player id.
//!
//! # Concurrency note
//!
//! `SessionManager` is NOT thread-safe by itself; it uses a plain
//! `HashMap`. The server wraps it in a mutex and holds the lock only long
//! enough to create or remove one session.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Instant;

use broadside_protocol::PlayerId;
use rand::Rng;

use crate::{Session, SessionConfig, SessionError};

/// Random draws attempted before falling back to a linear scan.
const RANDOM_ATTEMPTS: usize = 32;

/// Registry of connected players.
///
/// ```text
/// accept ──→ create() ──→ [live] ──→ remove() ──→ (id free again)
/// ```
pub struct SessionManager {
    /// Live sessions, keyed by player id.
    sessions: HashMap<PlayerId, Session>,

    /// Id range and other settings.
    config: SessionConfig,
}

impl SessionManager {
    /// Creates a new, empty session manager with the given config.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: HashMap::new(),
            config,
        }
    }

    /// Registers a new connection and returns its freshly allocated id.
    ///
    /// # Errors
    /// Returns [`SessionError::IdSpaceExhausted`] if every id in the
    /// configured range is taken.
    pub fn create(
        &mut self,
        peer: SocketAddr,
    ) -> Result<&Session, SessionError> {
        let player_id = self.allocate_id()?;

        let session = Session {
            player_id,
            peer,
            connected_at: Instant::now(),
        };
        tracing::info!(%player_id, %peer, "session created");

        Ok(self.sessions.entry(player_id).or_insert(session))
    }

    /// Removes a player's session, freeing its id.
    ///
    /// # Errors
    /// Returns [`SessionError::NotFound`] if no session exists.
    pub fn remove(
        &mut self,
        player_id: PlayerId,
    ) -> Result<Session, SessionError> {
        let session = self
            .sessions
            .remove(&player_id)
            .ok_or(SessionError::NotFound(player_id))?;

        tracing::info!(
            %player_id,
            connected_for = ?session.connected_at.elapsed(),
            "session removed"
        );
        Ok(session)
    }

    /// Looks up a session by player ID.
    pub fn get(&self, player_id: &PlayerId) -> Option<&Session> {
        self.sessions.get(player_id)
    }

    /// Returns the number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if there are no sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Picks an id not used by any live session.
    ///
    /// Random draws keep ids unpredictable; the scan guarantees success
    /// whenever at least one id is free.
    fn allocate_id(&self) -> Result<PlayerId, SessionError> {
        let SessionConfig { id_min, id_max } = self.config;
        let exhausted = SessionError::IdSpaceExhausted {
            min: id_min,
            max: id_max,
        };
        if id_min > id_max {
            return Err(exhausted);
        }

        let mut rng = rand::rng();
        for _ in 0..RANDOM_ATTEMPTS {
            let candidate = PlayerId(rng.random_range(id_min..=id_max));
            if !self.sessions.contains_key(&candidate) {
                return Ok(candidate);
            }
        }

        (id_min..=id_max)
            .map(PlayerId)
            .find(|id| !self.sessions.contains_key(id))
            .ok_or(exhausted)
    }
}
