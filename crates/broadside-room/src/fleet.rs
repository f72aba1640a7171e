//! Ships, fleets and shot resolution.

use std::collections::HashSet;

use broadside_protocol::{Cell, ShipLayout, ShotStatus};

/// One ship on a player's board.
///
/// `hits` is always a duplicate-free subset of `cells`, so the ship is
/// sunk exactly when the two have the same length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ship {
    cells: Vec<Cell>,
    hits: Vec<Cell>,
}

impl Ship {
    /// Cells the ship occupies.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cells already hit.
    pub fn hits(&self) -> &[Cell] {
        &self.hits
    }

    /// Returns `true` if the ship occupies `cell`.
    pub fn occupies(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }

    /// Returns `true` once every cell has been hit.
    pub fn is_sunk(&self) -> bool {
        self.hits.len() == self.cells.len()
    }

    /// Number of cells not yet hit.
    pub fn unhit(&self) -> usize {
        self.cells.len() - self.hits.len()
    }
}

/// A player's submitted ships plus their remaining health.
///
/// Invariant: `hits_left` equals the sum of [`Ship::unhit`] over all ships.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fleet {
    ships: Vec<Ship>,
    hits_left: u32,
}

impl Fleet {
    /// Builds a fleet from a client's `ready` payload.
    ///
    /// Each board cell belongs to at most one ship: repeated cells within a
    /// ship collapse, and a cell already claimed by an earlier ship is
    /// dropped from later ones. Ships left without cells are discarded.
    pub fn from_layouts(layouts: &[ShipLayout]) -> Self {
        let mut claimed = HashSet::new();
        let ships: Vec<Ship> = layouts
            .iter()
            .map(|layout| Ship {
                cells: layout
                    .cells
                    .iter()
                    .copied()
                    .filter(|cell| claimed.insert(*cell))
                    .collect(),
                hits: Vec::new(),
            })
            .filter(|ship| !ship.cells.is_empty())
            .collect();

        let hits_left = ships.iter().map(|s| s.cells.len() as u32).sum();
        Self { ships, hits_left }
    }

    /// The fleet's ships in submission order.
    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    /// Fleet cells not yet hit.
    pub fn hits_left(&self) -> u32 {
        self.hits_left
    }

    /// Returns `true` if a non-empty fleet has been submitted and at least
    /// one of its cells is still afloat.
    pub fn is_afloat(&self) -> bool {
        self.hits_left > 0
    }

    /// Resolves a shot at `cell` against this fleet.
    ///
    /// - no ship there → `Miss`, nothing changes;
    /// - a ship there, cell not hit before → the hit is recorded,
    ///   `hits_left` drops by one, and the result is `Sunk` if that was
    ///   the ship's last cell, `Hit` otherwise;
    /// - a ship there, cell already hit → `Hit`, nothing changes.
    pub fn receive_fire(&mut self, cell: Cell) -> ShotStatus {
        let Some(ship) = self.ships.iter_mut().find(|s| s.occupies(cell)) else {
            return ShotStatus::Miss;
        };

        if ship.hits.contains(&cell) {
            return ShotStatus::Hit;
        }

        ship.hits.push(cell);
        self.hits_left = self.hits_left.saturating_sub(1);

        if ship.is_sunk() {
            ShotStatus::Sunk
        } else {
            ShotStatus::Hit
        }
    }

    /// Empties the fleet (post-game reset).
    pub fn clear(&mut self) {
        self.ships.clear();
        self.hits_left = 0;
    }
}
