//! Value types that appear inside Broadside messages.
//!
//! Everything here travels "on the wire", so the serde attributes are part
//! of the protocol: changing one changes what clients see.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Side length of the square board. Cells are 0-indexed, `0..GRID_SIZE`.
pub const GRID_SIZE: u8 = 10;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Per-connection player identity.
///
/// Assigned by the server when the connection is accepted and announced to
/// the client in the `id` message. It is ephemeral: reconnecting yields a
/// new id.
///
/// `#[serde(transparent)]` serializes `PlayerId(4821)` as just `4821`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// Short numeric room identifier, e.g. `"1234"`.
///
/// Room ids are strings on the wire because players type them in to join
/// a private room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    /// Builds a room id from its numeric form.
    pub fn from_number(n: u32) -> Self {
        Self(n.to_string())
    }

    /// Returns the id as it appears on the wire.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{}", self.0)
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Recipient: who should receive a message?
// ---------------------------------------------------------------------------

/// Specifies which occupants of a room receive a server message.
///
/// Game logic returns `(Recipient, ServerMessage)` pairs; the room actor
/// resolves each recipient against its current occupants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    /// Every player in the room.
    All,

    /// One specific player.
    Player(PlayerId),

    /// Everyone except the given player.
    AllExcept(PlayerId),
}

// ---------------------------------------------------------------------------
// Room type
// ---------------------------------------------------------------------------

/// Whether a room takes part in random matchmaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    /// Joinable only by explicit id (`create_room`).
    Private,
    /// Eligible for `random_match`.
    Public,
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Private => write!(f, "private"),
            Self::Public => write!(f, "public"),
        }
    }
}

// ---------------------------------------------------------------------------
// Board types
// ---------------------------------------------------------------------------

/// A board coordinate `(x, y)`.
///
/// A tuple struct with two fields serializes as a two-element JSON array,
/// so `Cell(3, 7)` is `[3, 7]` on the wire.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub struct Cell(pub u8, pub u8);

impl Cell {
    /// Column.
    pub fn x(self) -> u8 {
        self.0
    }

    /// Row.
    pub fn y(self) -> u8 {
        self.1
    }

    /// Returns `true` if the cell lies on the `GRID_SIZE` board.
    pub fn in_bounds(self) -> bool {
        self.0 < GRID_SIZE && self.1 < GRID_SIZE
    }
}

/// One ship as submitted by a client in `ready`.
///
/// The server trusts the geometry: it does not check that cells are
/// contiguous or that the fleet has a particular composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipLayout {
    /// Cells the ship occupies.
    pub cells: Vec<Cell>,
}

/// Outcome of a shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShotStatus {
    /// No ship occupies the cell.
    Miss,
    /// A ship occupies the cell (newly hit, or hit before).
    Hit,
    /// This shot hit the last unhit cell of a ship.
    Sunk,
}

impl fmt::Display for ShotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Miss => write!(f, "miss"),
            Self::Hit => write!(f, "hit"),
            Self::Sunk => write!(f, "sunk"),
        }
    }
}
