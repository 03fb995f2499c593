//! Borrowed read-only views handed to systems.

use std::collections::BTreeMap;

use crate::{Building, CellCoord, Owner, PlayerId, Tile, Unit, UnitId};

/// Read-only view over the battlefield grid and the unit arena.
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a> {
    tiles: &'a [Tile],
    size: u32,
    units: &'a BTreeMap<UnitId, Unit>,
}

impl<'a> GridView<'a> {
    /// Captures a view backed by row-major `tiles` and the unit arena.
    #[must_use]
    pub fn new(tiles: &'a [Tile], size: u32, units: &'a BTreeMap<UnitId, Unit>) -> Self {
        Self { tiles, size, units }
    }

    /// Number of tiles along each side of the grid.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Returns the tile at `cell`, if it lies on the grid.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<&'a Tile> {
        if cell.column() >= self.size || cell.row() >= self.size {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.size).ok()?;
        self.tiles.get(row * width + column)
    }

    /// Territory owner of `cell`.
    #[must_use]
    pub fn owner(&self, cell: CellCoord) -> Option<Owner> {
        self.tile(cell).map(|tile| tile.owner)
    }

    /// Units standing on `cell` in insertion order.
    pub fn units_at(&self, cell: CellCoord) -> impl Iterator<Item = &'a Unit> + 'a {
        let units = self.units;
        self.tile(cell)
            .into_iter()
            .flat_map(|tile| tile.units.iter())
            .filter_map(move |id| units.get(id))
    }

    /// Building standing on `cell`, if any.
    #[must_use]
    pub fn building_at(&self, cell: CellCoord) -> Option<&'a Building> {
        self.tile(cell).and_then(|tile| tile.building.as_ref())
    }

    /// Looks up a unit by identifier.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&'a Unit> {
        self.units.get(&id)
    }

    /// Every building on the grid in scan order.
    pub fn buildings(&self) -> impl Iterator<Item = &'a Building> + 'a {
        self.tiles.iter().filter_map(|tile| tile.building.as_ref())
    }

    /// Cells owned by `player` in scan order.
    pub fn territory(&self, player: PlayerId) -> impl Iterator<Item = CellCoord> + 'a {
        self.tiles
            .iter()
            .filter(move |tile| tile.owner.is(player))
            .map(|tile| tile.cell)
    }

    /// Reports whether `cell` holds at least one living unit hostile to `player`.
    #[must_use]
    pub fn has_enemy_unit(&self, cell: CellCoord, player: PlayerId) -> bool {
        self.units_at(cell)
            .any(|unit| unit.owner != player && unit.is_alive())
    }
}

/// Main tower location of a player that is still in the match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Seat {
    /// Player occupying the seat.
    pub player: PlayerId,
    /// Cell of the player's main tower seat.
    pub tower: CellCoord,
}
