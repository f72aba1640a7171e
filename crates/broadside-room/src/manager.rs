//! Room manager: creates, tracks, and routes players to rooms.

use std::collections::HashMap;

use broadside_protocol::{PlayerId, RoomId, RoomType};
use indexmap::IndexMap;
use rand::Rng;

use crate::room::spawn_room;
use crate::{PlayerSender, RoomConfig, RoomError, RoomHandle, RoomInfo};

/// Random draws attempted before falling back to a linear scan.
const RANDOM_ATTEMPTS: usize = 32;

/// Manages all live rooms and tracks which player sits where.
///
/// This is the entry point for room operations from the connection
/// handlers. It is not thread-safe by itself; the server keeps it behind
/// a mutex, and gameplay commands bypass it through cached
/// [`RoomHandle`]s.
pub struct RoomManager {
    /// Live rooms in creation order. `random_match` scans them oldest
    /// first, which is why this is an `IndexMap`.
    rooms: IndexMap<RoomId, RoomHandle>,

    /// Maps each player to the room they're currently in.
    /// A player can be in at most ONE room at a time.
    player_rooms: HashMap<PlayerId, RoomId>,

    config: RoomConfig,
}

impl RoomManager {
    /// Creates a new, empty room manager.
    pub fn new(config: RoomConfig) -> Self {
        Self {
            rooms: IndexMap::new(),
            player_rooms: HashMap::new(),
            config,
        }
    }

    /// Opens a new room of `room_type` and seats `player_id` in it.
    ///
    /// The player receives `room_created` from the new room.
    pub async fn create_room(
        &mut self,
        room_type: RoomType,
        player_id: PlayerId,
        sender: PlayerSender,
    ) -> Result<RoomHandle, RoomError> {
        self.ensure_unseated(player_id)?;

        let room_id = self.allocate_id()?;
        let handle =
            spawn_room(room_id.clone(), room_type, self.config.channel_size);
        self.rooms.insert(room_id.clone(), handle.clone());
        tracing::info!(%room_id, %room_type, %player_id, "room created");

        if let Err(e) = handle.join(player_id, sender).await {
            self.rooms.shift_remove(&room_id);
            let _ = handle.shutdown().await;
            return Err(e);
        }
        self.player_rooms.insert(player_id, room_id);
        Ok(handle)
    }

    /// Seats `player_id` in an existing room.
    ///
    /// Enforces the "one room at a time" invariant.
    pub async fn join_room(
        &mut self,
        player_id: PlayerId,
        room_id: &RoomId,
        sender: PlayerSender,
    ) -> Result<RoomHandle, RoomError> {
        self.ensure_unseated(player_id)?;

        let handle = self
            .rooms
            .get(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;

        handle.join(player_id, sender).await?;
        self.player_rooms.insert(player_id, room_id.clone());
        Ok(handle.clone())
    }

    /// Seats `player_id` in the oldest public room that is waiting with a
    /// free seat, or opens a new public room if there is none.
    pub async fn random_match(
        &mut self,
        player_id: PlayerId,
        sender: PlayerSender,
    ) -> Result<RoomHandle, RoomError> {
        self.ensure_unseated(player_id)?;

        // Snapshots are read without queueing behind each room's pending
        // gameplay commands, so a busy room never stalls the scan.
        for handle in self.rooms.values() {
            if !handle.snapshot().is_open_for_matchmaking() {
                continue;
            }
            // Seat counts only change under `&mut self`, but a failed join
            // just moves on.
            if handle.join(player_id, sender.clone()).await.is_ok() {
                let room_id = handle.room_id().clone();
                tracing::info!(%room_id, %player_id, "matched into public room");
                self.player_rooms.insert(player_id, room_id);
                return Ok(handle.clone());
            }
        }

        self.create_room(RoomType::Public, player_id, sender).await
    }

    /// Removes a player from their current room and returns its id.
    ///
    /// A room left empty is shut down and forgotten, so its id becomes
    /// available again.
    pub async fn leave_room(
        &mut self,
        player_id: PlayerId,
    ) -> Result<RoomId, RoomError> {
        let room_id =
            self.player_rooms.remove(&player_id).ok_or_else(|| {
                RoomError::InvalidState(format!(
                    "player {player_id} is not in any room"
                ))
            })?;

        let Some(handle) = self.rooms.get(&room_id) else {
            return Ok(room_id);
        };

        let remaining = match handle.leave(player_id).await {
            Ok(remaining) => remaining,
            Err(e) => {
                tracing::warn!(%room_id, %player_id, error = %e, "leave failed");
                0
            }
        };

        if remaining == 0 {
            self.destroy_room(&room_id).await;
        }
        Ok(room_id)
    }

    /// Returns info about a specific room.
    pub async fn get_room_info(
        &self,
        room_id: &RoomId,
    ) -> Result<RoomInfo, RoomError> {
        let handle = self
            .rooms
            .get(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
        handle.get_info().await
    }

    /// Returns the room a player is currently in, if any.
    pub fn player_room(&self, player_id: &PlayerId) -> Option<&RoomId> {
        self.player_rooms.get(player_id)
    }

    /// Returns `true` if a room with this id is live.
    pub fn contains_room(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    /// Returns the number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Lists live room ids, oldest first.
    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.keys().cloned().collect()
    }

    async fn destroy_room(&mut self, room_id: &RoomId) {
        if let Some(handle) = self.rooms.shift_remove(room_id) {
            let _ = handle.shutdown().await;
        }
        self.player_rooms.retain(|_, rid| rid != room_id);
        tracing::info!(%room_id, "room destroyed");
    }

    fn ensure_unseated(&self, player_id: PlayerId) -> Result<(), RoomError> {
        match self.player_rooms.get(&player_id) {
            Some(current) => Err(RoomError::InvalidState(format!(
                "player {player_id} is already in room {current}"
            ))),
            None => Ok(()),
        }
    }

    /// Picks a numeric room id not used by any live room.
    fn allocate_id(&self) -> Result<RoomId, RoomError> {
        let RoomConfig { id_min, id_max, .. } = self.config;
        let exhausted = RoomError::IdSpaceExhausted {
            min: id_min,
            max: id_max,
        };
        if id_min > id_max {
            return Err(exhausted);
        }

        let mut rng = rand::rng();
        for _ in 0..RANDOM_ATTEMPTS {
            let candidate =
                RoomId::from_number(rng.random_range(id_min..=id_max));
            if !self.rooms.contains_key(&candidate) {
                return Ok(candidate);
            }
        }

        (id_min..=id_max)
            .map(RoomId::from_number)
            .find(|id| !self.rooms.contains_key(id))
            .ok_or(exhausted)
    }
}

impl Default for RoomManager {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}
