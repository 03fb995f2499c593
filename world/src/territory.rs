//! Home territory layout and conquest transfers.

use tower_conquest_core::{CellCoord, GameMode, Owner, PlayerId};

use crate::grid::Grid;

/// Parameters that shape the initial territories.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TerritoryLayout {
    pub(crate) mode: GameMode,
    pub(crate) size: u32,
    pub(crate) radius: u32,
    pub(crate) band_depth: u32,
}

impl TerritoryLayout {
    /// Main tower cell of `player`, or `None` when the seat is unused in this mode.
    pub(crate) fn seat(&self, player: PlayerId) -> Option<CellCoord> {
        let last = self.size.saturating_sub(1);
        let middle = self.size / 2;
        let inset = 2.min(last);
        let far = self.size.saturating_sub(3);
        match (self.mode, player) {
            (GameMode::FourPlayer, PlayerId::One) => Some(CellCoord::new(middle, far)),
            (GameMode::FourPlayer, PlayerId::Two) => Some(CellCoord::new(inset, middle)),
            (GameMode::FourPlayer, PlayerId::Three) => Some(CellCoord::new(middle, inset)),
            (GameMode::FourPlayer, PlayerId::Four) => Some(CellCoord::new(far, middle)),
            (GameMode::TwoPlayer, PlayerId::One) => Some(CellCoord::new(middle, last)),
            (GameMode::TwoPlayer, PlayerId::Two) => Some(CellCoord::new(middle, 0)),
            (GameMode::TwoPlayer, _) => None,
        }
    }

    /// Initial owner of `cell`.
    ///
    /// Four-player territories are Manhattan diamonds around each seat and the
    /// first matching seat in turn order wins. Duels split the grid into a
    /// bottom band for player one and a top band for player two.
    pub(crate) fn owner_of(&self, cell: CellCoord) -> Owner {
        match self.mode {
            GameMode::FourPlayer => PlayerId::ALL
                .into_iter()
                .find(|player| {
                    self.seat(*player)
                        .is_some_and(|seat| seat.manhattan_distance(cell) <= self.radius)
                })
                .map_or(Owner::Neutral, Owner::Player),
            GameMode::TwoPlayer => {
                if cell.row() < self.band_depth {
                    Owner::Player(PlayerId::Two)
                } else if cell.row() >= self.size.saturating_sub(self.band_depth) {
                    Owner::Player(PlayerId::One)
                } else {
                    Owner::Neutral
                }
            }
        }
    }
}

/// Transfers every tile owned by `defeated` to `conqueror`.
///
/// Buildings standing on transferred tiles change hands when `defeated` owned
/// them. Tiles of third parties are untouched. Returns the number of tiles
/// transferred, which is zero when both players are the same or when
/// `defeated` owns nothing.
pub(crate) fn conquer(grid: &mut Grid, defeated: PlayerId, conqueror: PlayerId) -> u32 {
    if defeated == conqueror {
        return 0;
    }

    let mut transferred = 0;
    for tile in grid.tiles_mut() {
        if !tile.owner.is(defeated) {
            continue;
        }
        tile.owner = Owner::Player(conqueror);
        if let Some(building) = tile.building.as_mut() {
            if building.owner == defeated {
                building.owner = conqueror;
            }
        }
        transferred += 1;
    }
    transferred
}
