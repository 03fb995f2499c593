//! Dense tile storage used by the world crate.

use tower_conquest_core::{CellCoord, Owner, Tile};

/// Square array of tiles stored in row-major order.
///
/// The grid is rebuilt when a match starts and discarded when the world
/// returns to the menu. An empty grid has a side length of zero and rejects
/// every lookup.
#[derive(Clone, Debug, Default)]
pub(crate) struct Grid {
    size: u32,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Creates a grid whose tile owners are produced by `owner_of`.
    pub(crate) fn with_owners<F>(size: u32, mut owner_of: F) -> Self
    where
        F: FnMut(CellCoord) -> Owner,
    {
        let mut tiles = Vec::new();
        for row in 0..size {
            for column in 0..size {
                let cell = CellCoord::new(column, row);
                tiles.push(Tile::new(cell, owner_of(cell)));
            }
        }
        Self { size, tiles }
    }

    /// Side length of the grid.
    pub(crate) const fn size(&self) -> u32 {
        self.size
    }

    /// Reports whether `cell` lies on the grid.
    pub(crate) fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.size && cell.row() < self.size
    }

    pub(crate) fn tile(&self, cell: CellCoord) -> Option<&Tile> {
        self.index(cell).and_then(|index| self.tiles.get(index))
    }

    pub(crate) fn tile_mut(&mut self, cell: CellCoord) -> Option<&mut Tile> {
        self.index(cell).and_then(|index| self.tiles.get_mut(index))
    }

    /// Tiles in scan order.
    pub(crate) fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub(crate) fn tiles_mut(&mut self) -> impl Iterator<Item = &mut Tile> {
        self.tiles.iter_mut()
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.size).ok()?;
        Some(row * width + column)
    }
}
