//! Plain data records stored by the authoritative world.
//!
//! These types carry no behavior beyond construction helpers. The world owns
//! every instance and mutates them while applying commands; systems and
//! adapters only ever observe them through shared references or snapshots.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{
    BuildingId, BuildingKind, CardColor, CellCoord, Owner, PlayerId, ProjectileId, UnitId,
    UnitKind,
};

/// Maximum number of units that may share a tile after a move.
pub const TILE_UNIT_CAP: usize = 3;
/// Number of trailing positions retained per projectile for rendering.
pub const PROJECTILE_TRAIL_LEN: usize = 5;

/// Mobile combatant owned by exactly one tile at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Unique identifier.
    pub id: UnitId,
    /// Catalog archetype.
    pub kind: UnitKind,
    /// Controlling player.
    pub owner: PlayerId,
    /// Cell mirroring the containing tile.
    pub cell: CellCoord,
    /// Remaining hit points, never above `max_hp`.
    pub hp: u32,
    /// Hit point ceiling.
    pub max_hp: u32,
    /// Ticks until the unit may attack or move again.
    pub cooldown: u32,
    /// Ticks of freeze remaining.
    pub frozen: u32,
    /// Ticks until the unit may step again.
    pub move_cooldown: u32,
    /// Ticks until a healer may pulse again.
    pub heal_cooldown: u32,
    /// Player-issued manual destination.
    pub destination: Option<CellCoord>,
    /// Damage flash countdown for presentation.
    pub last_damage: Option<u32>,
    /// Whether the unit stepped recently.
    pub is_moving: bool,
}

impl Unit {
    /// Creates a fresh unit at full health with every counter cleared.
    #[must_use]
    pub const fn spawn(id: UnitId, kind: UnitKind, owner: PlayerId, cell: CellCoord) -> Self {
        let hp = kind.archetype().hp;
        Self {
            id,
            kind,
            owner,
            cell,
            hp,
            max_hp: hp,
            cooldown: 0,
            frozen: 0,
            move_cooldown: 0,
            heal_cooldown: 0,
            destination: None,
            last_damage: None,
            is_moving: false,
        }
    }

    /// Reports whether the unit still has hit points.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Reports whether the unit is alive and below its maximum hit points.
    #[must_use]
    pub const fn is_damaged(&self) -> bool {
        self.hp > 0 && self.hp < self.max_hp
    }
}

/// Static structure occupying a whole tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    /// Unique identifier.
    pub id: BuildingId,
    /// Catalog archetype.
    pub kind: BuildingKind,
    /// Controlling player.
    pub owner: PlayerId,
    /// Cell occupied by the building.
    pub cell: CellCoord,
    /// Remaining hit points.
    pub hp: u32,
    /// Hit point ceiling.
    pub max_hp: u32,
    /// Ticks until the next shot may be fired.
    pub cooldown: u32,
    /// Cell currently aimed at.
    pub target: Option<CellCoord>,
    /// Whether destroying this building eliminates its owner.
    pub is_main_tower: bool,
    /// Accumulated wind-up charges for artillery.
    pub charging: u32,
}

impl Building {
    /// Creates a freshly constructed building with catalog hit points.
    #[must_use]
    pub const fn construct(
        id: BuildingId,
        kind: BuildingKind,
        owner: PlayerId,
        cell: CellCoord,
    ) -> Self {
        let hp = kind.archetype().hp;
        Self {
            id,
            kind,
            owner,
            cell,
            hp,
            max_hp: hp,
            cooldown: 0,
            target: None,
            is_main_tower: false,
            charging: 0,
        }
    }

    /// Creates a player's main tower with the provided hit points.
    #[must_use]
    pub const fn main_tower(id: BuildingId, owner: PlayerId, cell: CellCoord, hp: u32) -> Self {
        Self {
            id,
            kind: BuildingKind::Tower,
            owner,
            cell,
            hp,
            max_hp: hp,
            cooldown: 0,
            target: None,
            is_main_tower: true,
            charging: 0,
        }
    }

    /// Reports whether the building has been reduced to zero hit points.
    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.hp == 0
    }
}

/// Origin of a projectile, used to derive impact behavior.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileSource {
    /// Fired by a ranged unit.
    Unit(UnitKind),
    /// Fired by a turret building.
    Building(BuildingKind),
}

impl ProjectileSource {
    /// Reports whether impacts splash onto the surrounding cells.
    #[must_use]
    pub const fn splashes(self) -> bool {
        match self {
            Self::Unit(_) => false,
            Self::Building(kind) => kind.archetype().splash,
        }
    }

    /// Cosmetic tint inherited from the source archetype.
    #[must_use]
    pub const fn color(self) -> CardColor {
        match self {
            Self::Unit(kind) => kind.archetype().color,
            Self::Building(kind) => kind.archetype().color,
        }
    }
}

/// Transient shot travelling toward a point locked at launch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    /// Unique identifier.
    pub id: ProjectileId,
    /// Launch point in cell units.
    pub from: Vec2,
    /// Target point in cell units.
    pub to: Vec2,
    /// Current position in cell units.
    pub position: Vec2,
    /// Displacement applied every tick.
    pub velocity: Vec2,
    /// Normalized flight progress; arrival is forced at 1.
    pub progress: f32,
    /// Progress gained every tick.
    pub speed: f32,
    /// Damage applied on impact.
    pub damage: u32,
    /// Player credited with the damage.
    pub owner: PlayerId,
    /// What launched the projectile.
    pub source: ProjectileSource,
    /// Recent positions, oldest first.
    pub trail: Vec<Vec2>,
}

/// Expanding, fading ring spawned by impacts and spell casts.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Explosion {
    /// Center in cell units.
    pub position: Vec2,
    /// Current radius in cells.
    pub radius: f32,
    /// Radius at which the explosion disappears.
    pub max_radius: f32,
    /// Remaining opacity in `0.0..=1.0`.
    pub opacity: f32,
    /// Cosmetic tint.
    pub color: CardColor,
}

/// Floating number describing damage or healing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DamageNumber {
    /// Position in cell units.
    pub position: Vec2,
    /// Drift applied every tick.
    pub velocity: Vec2,
    /// Amount displayed.
    pub amount: u32,
    /// Remaining opacity in `0.0..=1.0`.
    pub opacity: f32,
    /// Whether the number represents healing.
    pub is_healing: bool,
}

/// A single grid cell with ownership, an optional building and its units.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Location of the tile.
    pub cell: CellCoord,
    /// Territory owner.
    pub owner: Owner,
    /// Building occupying the tile, if any.
    pub building: Option<Building>,
    /// Units on the tile in insertion order.
    pub units: Vec<UnitId>,
}

impl Tile {
    /// Creates an empty tile owned by `owner`.
    #[must_use]
    pub const fn new(cell: CellCoord, owner: Owner) -> Self {
        Self {
            cell,
            owner,
            building: None,
            units: Vec::new(),
        }
    }

    /// Reports whether one more unit may step onto the tile.
    #[must_use]
    pub fn accepts_unit(&self) -> bool {
        self.building.is_none() && self.units.len() < TILE_UNIT_CAP
    }
}

/// Per-player match state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Mirrors the main tower's hit points.
    pub hp: u32,
    /// Spendable mana, bounded by the configured maximum.
    pub mana: u32,
    /// Cleared exactly once when the main tower falls.
    pub is_alive: bool,
    /// Whether the AI controller plays this seat.
    pub is_ai: bool,
}

impl PlayerState {
    /// Creates a seated player with full hit points and mana.
    #[must_use]
    pub const fn seated(hp: u32, mana: u32, is_ai: bool) -> Self {
        Self {
            hp,
            mana,
            is_alive: true,
            is_ai,
        }
    }

    /// Creates an empty seat that never participates in the match.
    #[must_use]
    pub const fn vacant(hp: u32, mana: u32) -> Self {
        Self {
            hp,
            mana,
            is_alive: false,
            is_ai: true,
        }
    }
}
