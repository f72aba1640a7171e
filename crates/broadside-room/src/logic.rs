//! The per-room game state machine.
//!
//! [`Game`] holds the seats, the phase and whose turn it is. It is plain
//! synchronous data: every method applies one event and returns the
//! messages to broadcast, as `(Recipient, ServerMessage)` pairs. The room
//! actor owns one `Game` and delivers those messages; nothing here knows
//! about channels or sockets.

use broadside_protocol::{
    Cell, PlayerId, Recipient, ServerMessage, ShipLayout,
};

use crate::config::MAX_PLAYERS;
use crate::{Fleet, RoomState};

/// A message produced by the game, paired with who should get it.
pub type Outbound = (Recipient, ServerMessage);

/// One occupied seat.
#[derive(Debug, Clone)]
struct Seat {
    player_id: PlayerId,
    fleet: Fleet,
}

/// Seats, phase and turn of one room.
///
/// Invariants:
/// - at most [`MAX_PLAYERS`] seats, in join order;
/// - `turn`, when set, names a seated player;
/// - `turn` is set exactly while the state is [`RoomState::Playing`].
#[derive(Debug, Clone)]
pub struct Game {
    state: RoomState,
    turn: Option<PlayerId>,
    seats: Vec<Seat>,
}

impl Game {
    /// An empty room waiting for players.
    pub fn new() -> Self {
        Self {
            state: RoomState::Waiting,
            turn: None,
            seats: Vec::with_capacity(MAX_PLAYERS),
        }
    }

    /// Current phase.
    pub fn state(&self) -> RoomState {
        self.state
    }

    /// The player allowed to fire, if a game is running.
    pub fn turn(&self) -> Option<PlayerId> {
        self.turn
    }

    /// Seated players in join order.
    pub fn players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.seats.iter().map(|s| s.player_id)
    }

    /// Number of occupied seats.
    pub fn player_count(&self) -> usize {
        self.seats.len()
    }

    /// Returns `true` if both seats are taken.
    pub fn is_full(&self) -> bool {
        self.seats.len() >= MAX_PLAYERS
    }

    /// Returns `true` if `player_id` holds a seat.
    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.seats.iter().any(|s| s.player_id == player_id)
    }

    /// The fleet `player_id` submitted, if seated.
    pub fn fleet(&self, player_id: PlayerId) -> Option<&Fleet> {
        self.seats
            .iter()
            .find(|s| s.player_id == player_id)
            .map(|s| &s.fleet)
    }

    /// Seats a player with an empty fleet.
    ///
    /// Returns `false` (and changes nothing) if the room is full or the
    /// player is already seated. Capacity errors are reported by the
    /// caller, which knows the room id.
    pub fn seat(&mut self, player_id: PlayerId) -> bool {
        if self.is_full() || self.contains(player_id) {
            return false;
        }
        self.seats.push(Seat {
            player_id,
            fleet: Fleet::default(),
        });
        true
    }

    /// Frees a player's seat.
    ///
    /// Leaving mid-game abandons it: the room drops back to `Waiting` and
    /// the remaining fleet is cleared, so the survivor re-submits before
    /// the next game. Returns `false` if the player was not seated.
    pub fn unseat(&mut self, player_id: PlayerId) -> bool {
        let Some(index) =
            self.seats.iter().position(|s| s.player_id == player_id)
        else {
            return false;
        };
        self.seats.remove(index);

        if self.state.is_active() {
            self.reset();
        }
        true
    }

    /// Records a player's fleet and starts the game once both seats hold
    /// a fleet that is afloat.
    ///
    /// Ignored while a game is running or if the player isn't seated.
    /// The first player to have joined gets the opening turn.
    pub fn ready(
        &mut self,
        player_id: PlayerId,
        ships: &[ShipLayout],
    ) -> Vec<Outbound> {
        if self.state.is_active() {
            tracing::debug!(%player_id, "fleet submitted mid-game, ignoring");
            return Vec::new();
        }
        let Some(seat) =
            self.seats.iter_mut().find(|s| s.player_id == player_id)
        else {
            return Vec::new();
        };

        seat.fleet = Fleet::from_layouts(ships);
        tracing::debug!(
            %player_id,
            ships = seat.fleet.ships().len(),
            hits_left = seat.fleet.hits_left(),
            "fleet submitted"
        );

        if !self.is_full() || !self.seats.iter().all(|s| s.fleet.is_afloat())
        {
            return Vec::new();
        }

        let starter = self.seats[0].player_id;
        self.state = RoomState::Playing;
        self.turn = Some(starter);
        tracing::info!(turn = %starter, "game started");

        vec![(Recipient::All, ServerMessage::GameStart { turn: starter })]
    }

    /// Resolves `shooter` firing at `(x, y)` on the opponent's board.
    ///
    /// Ignored unless a game is running and it is `shooter`'s turn. The
    /// turn always passes to the target, even on a miss or a repeated
    /// shot. When the target's last cell goes down the winner is announced
    /// and the room resets for a rematch in the same step.
    pub fn fire(&mut self, shooter: PlayerId, x: u8, y: u8) -> Vec<Outbound> {
        if !self.state.is_active() || self.turn != Some(shooter) {
            tracing::debug!(%shooter, x, y, "out-of-turn shot, ignoring");
            return Vec::new();
        }
        let Some(target) =
            self.seats.iter_mut().find(|s| s.player_id != shooter)
        else {
            return Vec::new();
        };

        let cell = Cell(x, y);
        if !cell.in_bounds() {
            tracing::debug!(%shooter, x, y, "shot lands off the board");
        }

        let status = target.fleet.receive_fire(cell);
        let target_id = target.player_id;
        let sunk_fleet = !target.fleet.is_afloat();
        self.turn = Some(target_id);

        let mut out = vec![(
            Recipient::All,
            ServerMessage::UpdateBoard {
                x,
                y,
                status,
                shooter,
                turn: target_id,
            },
        )];

        if sunk_fleet {
            tracing::info!(winner = %shooter, loser = %target_id, "game over");
            out.push((
                Recipient::All,
                ServerMessage::GameOver { winner: shooter },
            ));
            self.reset();
        }

        out
    }

    /// Back to `Waiting` with no turn and every fleet cleared.
    fn reset(&mut self) {
        self.state = RoomState::Waiting;
        self.turn = None;
        for seat in &mut self.seats {
            seat.fleet.clear();
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
