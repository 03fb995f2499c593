//! Read-only snapshots published to presentation layers once per tick.

use serde::{Deserialize, Serialize};

use crate::{
    Building, CellCoord, DamageNumber, Explosion, GameMode, Owner, Phase, PlayerId, PlayerState,
    Projectile, Unit, Winner,
};

/// Immutable representation of a single tile for rendering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileSnapshot {
    /// Location of the tile.
    pub cell: CellCoord,
    /// Territory owner.
    pub owner: Owner,
    /// Building occupying the tile, if any.
    pub building: Option<Building>,
    /// Units standing on the tile in insertion order.
    pub units: Vec<Unit>,
}

/// Player table entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    /// Seat the entry describes.
    pub player: PlayerId,
    /// Hit points, mana and status of the seat.
    pub state: PlayerState,
}

/// Complete picture of the battlefield at the end of a tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Mode the match was started in.
    pub mode: GameMode,
    /// Current phase.
    pub phase: Phase,
    /// Seconds remaining in the current phase.
    pub countdown: u32,
    /// Outcome, once the match reached its result phase.
    pub winner: Option<Winner>,
    /// Number of tiles along each side of the grid.
    pub grid_size: u32,
    /// Tiles in row-major order.
    pub tiles: Vec<TileSnapshot>,
    /// Player table in seat order.
    pub players: Vec<PlayerSnapshot>,
    /// Projectiles in flight.
    pub projectiles: Vec<Projectile>,
    /// Active explosion rings.
    pub explosions: Vec<Explosion>,
    /// Active floating numbers.
    pub damage_numbers: Vec<DamageNumber>,
}

impl WorldSnapshot {
    /// Returns the tile snapshot at `cell`, if it lies on the grid.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<&TileSnapshot> {
        if cell.column() >= self.grid_size || cell.row() >= self.grid_size {
            return None;
        }
        let index = usize::try_from(cell.row() * self.grid_size + cell.column()).ok()?;
        self.tiles.get(index)
    }

    /// Returns the player table entry for `player`.
    #[must_use]
    pub fn player(&self, player: PlayerId) -> Option<&PlayerState> {
        self.players
            .iter()
            .find(|entry| entry.player == player)
            .map(|entry| &entry.state)
    }

    /// Iterator over every unit on the grid in scan order.
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.tiles.iter().flat_map(|tile| tile.units.iter())
    }

    /// Iterator over every building on the grid in scan order.
    pub fn buildings(&self) -> impl Iterator<Item = &Building> {
        self.tiles.iter().filter_map(|tile| tile.building.as_ref())
    }
}
