#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tower Conquest engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Systems and adapters submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then reports [`Event`] values
//! describing what changed or why a request was rejected. Everything the
//! world stores is plain data from this crate, so systems can inspect it
//! through borrowed views without owning any state of their own.

use std::{fmt, str::FromStr};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod catalog;
mod entity;
mod snapshot;
mod view;

pub use catalog::{
    default_deck, BuildingArchetype, BuildingKind, CardColor, CardKind, SpellArchetype,
    SpellEffect, SpellKind, UnitArchetype, UnitKind, UnknownCard, BUILDING_SHOT_PROGRESS,
    HEALER_PULSE_AMOUNT, HEALER_PULSE_COOLDOWN, SPLASH_BUILDING_FRACTION, SPLASH_UNIT_FRACTION,
    UNIT_ATTACK_COOLDOWN, UNIT_SHOT_PROGRESS, UNIT_SHOT_VELOCITY, UNIT_SIEGE_SHOT_VELOCITY,
};
pub use entity::{
    Building, DamageNumber, Explosion, PlayerState, Projectile, ProjectileSource, Tile, Unit,
    PROJECTILE_TRAIL_LEN, TILE_UNIT_CAP,
};
pub use snapshot::{PlayerSnapshot, TileSnapshot, WorldSnapshot};
pub use view::{GridView, Seat};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Tower Conquest.";

/// Gameplay phases of a single match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No match is running.
    Menu,
    /// Build-only countdown before combat begins.
    Prep,
    /// Full simulation is active.
    Battle,
    /// The match concluded and awaits acknowledgement.
    Result,
}

impl Phase {
    /// Reports whether players may deploy cards in this phase.
    #[must_use]
    pub const fn allows_deployment(self) -> bool {
        matches!(self, Self::Prep | Self::Battle)
    }
}

/// Number of seats taking part in a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    /// Classic duel with banded territories.
    #[serde(rename = "2player")]
    TwoPlayer,
    /// Four seats with diamond-shaped home territories.
    #[serde(rename = "4player")]
    FourPlayer,
}

impl GameMode {
    /// Seats that start the match alive.
    #[must_use]
    pub const fn seats(self) -> &'static [PlayerId] {
        match self {
            Self::TwoPlayer => &[PlayerId::One, PlayerId::Two],
            Self::FourPlayer => &PlayerId::ALL,
        }
    }
}

impl FromStr for GameMode {
    type Err = UnknownMode;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "2" | "2player" | "two" | "duel" => Ok(Self::TwoPlayer),
            "4" | "4player" | "four" => Ok(Self::FourPlayer),
            _ => Err(UnknownMode(value.to_owned())),
        }
    }
}

/// Raised when a string does not name a game mode.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown game mode `{0}`, expected `2player` or `4player`")]
pub struct UnknownMode(pub String);

/// Seat identifier for one of the four possible players.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlayerId {
    /// Bottom seat, the local player by default.
    #[serde(rename = "player1")]
    One,
    /// West seat in four-player mode, north seat in duels.
    #[serde(rename = "player2")]
    Two,
    /// North seat.
    #[serde(rename = "player3")]
    Three,
    /// East seat.
    #[serde(rename = "player4")]
    Four,
}

impl PlayerId {
    /// Every seat in turn order.
    pub const ALL: [PlayerId; 4] = [PlayerId::One, PlayerId::Two, PlayerId::Three, PlayerId::Four];

    /// Zero-based seat index.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
            Self::Three => 2,
            Self::Four => 3,
        }
    }

    /// Stable lowercase name used in logs and serialized output.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::One => "player1",
            Self::Two => "player2",
            Self::Three => "player3",
            Self::Four => "player4",
        }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Territory ownership of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Owner {
    /// Unclaimed tile.
    Neutral,
    /// Tile claimed by a player.
    Player(PlayerId),
}

impl Owner {
    /// Reports whether the tile belongs to `player`.
    #[must_use]
    pub fn is(self, player: PlayerId) -> bool {
        self == Self::Player(player)
    }
}

/// Outcome of a finished match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Winner {
    /// A single player prevailed.
    Player(PlayerId),
    /// No single player held the advantage.
    Tie,
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player(player) => write!(f, "{player}"),
            Self::Tie => f.write_str("tie"),
        }
    }
}

/// Unique identifier assigned to a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a building.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BuildingId(u32);

impl BuildingId {
    /// Creates a new building identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Computes the Chebyshev distance, the radius of the smallest square box covering both cells.
    #[must_use]
    pub fn chebyshev_distance(self, other: CellCoord) -> u32 {
        self.column()
            .abs_diff(other.column())
            .max(self.row().abs_diff(other.row()))
    }

    /// Computes the Euclidean distance between two cell coordinates.
    #[must_use]
    pub fn euclidean_distance(self, other: CellCoord) -> f32 {
        let dx = self.column().abs_diff(other.column()) as f32;
        let dy = self.row().abs_diff(other.row()) as f32;
        (dx * dx + dy * dy).sqrt()
    }

    /// Position of the cell in continuous cell units.
    #[must_use]
    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.column as f32, self.row as f32)
    }

    /// Offsets the cell, returning `None` when the result leaves a `size`×`size` grid.
    #[must_use]
    pub fn offset(self, dx: i64, dy: i64, size: u32) -> Option<CellCoord> {
        let column = i64::from(self.column) + dx;
        let row = i64::from(self.row) + dy;
        let bound = i64::from(size);
        if column < 0 || row < 0 || column >= bound || row >= bound {
            return None;
        }
        Some(CellCoord::new(
            u32::try_from(column).ok()?,
            u32::try_from(row).ok()?,
        ))
    }

    /// Moves one cell in `direction`, returning `None` when leaving the grid.
    #[must_use]
    pub fn step(self, direction: Direction, size: u32) -> Option<CellCoord> {
        let (dx, dy) = direction.delta();
        self.offset(dx, dy, size)
    }

    /// Iterates the in-bounds square neighborhood of `radius` in scan order.
    ///
    /// Rows form the outer loop and columns the inner loop, both ascending
    /// from `-radius`. The center cell is included.
    #[must_use]
    pub fn neighborhood(self, radius: u32, size: u32) -> Neighborhood {
        Neighborhood::new(self, radius, size)
    }
}

/// Iterator over a square neighborhood produced by [`CellCoord::neighborhood`].
#[derive(Clone, Debug)]
pub struct Neighborhood {
    center: CellCoord,
    radius: i64,
    size: u32,
    dx: i64,
    dy: i64,
}

impl Neighborhood {
    fn new(center: CellCoord, radius: u32, size: u32) -> Self {
        let radius = i64::from(radius);
        Self {
            center,
            radius,
            size,
            dx: -radius,
            dy: -radius,
        }
    }
}

impl Iterator for Neighborhood {
    type Item = CellCoord;

    fn next(&mut self) -> Option<Self::Item> {
        while self.dy <= self.radius {
            let (dx, dy) = (self.dx, self.dy);
            self.dx += 1;
            if self.dx > self.radius {
                self.dx = -self.radius;
                self.dy += 1;
            }
            if let Some(cell) = self.center.offset(dx, dy, self.size) {
                return Some(cell);
            }
        }
        None
    }
}

/// Cardinal movement directions available to units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Column and row delta of a single step.
    #[must_use]
    pub const fn delta(self) -> (i64, i64) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }
}

/// Entity a unit attack is aimed at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttackTarget {
    /// An enemy unit.
    Unit(UnitId),
    /// An enemy building.
    Building(BuildingId),
}

/// Aim computed for an armed building during a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildingTarget {
    /// Building that is aiming.
    pub building: BuildingId,
    /// Cell the building occupies.
    pub origin: CellCoord,
    /// Closest hostile cell within range, or `None` when nothing qualifies.
    pub cell: Option<CellCoord>,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Builds a fresh grid for `mode`, seats the players and enters prep.
    StartMatch {
        /// Mode that decides territories and seats.
        mode: GameMode,
        /// Per-seat AI flags in seat order.
        ai_players: [bool; 4],
    },
    /// Advances the one-second phase countdown, transitioning phases on expiry.
    AdvancePhaseClock,
    /// Grants every seat one mana, capped at the configured maximum.
    RegenerateMana,
    /// Moves projectiles and resolves impacts.
    AdvanceProjectiles,
    /// Fades explosions and floating numbers.
    DecayEffects,
    /// Decrements unit status counters and purges dead units.
    UpdateUnitStatus,
    /// Requests that a healer pulse onto a damaged ally.
    HealUnit {
        /// Healer performing the pulse.
        healer: UnitId,
        /// Ally receiving the heal.
        target: UnitId,
    },
    /// Requests that a unit attack an acquired target.
    Attack {
        /// Unit performing the attack.
        attacker: UnitId,
        /// Acquired target.
        target: AttackTarget,
    },
    /// Requests that a unit advance a single step in the specified direction.
    StepUnit {
        /// Unit attempting to move.
        unit: UnitId,
        /// Direction of travel.
        direction: Direction,
    },
    /// Adds one wind-up charge to an artillery building aiming at `target`.
    ChargeBuilding {
        /// Building winding up.
        building: BuildingId,
        /// Cell being aimed at.
        target: CellCoord,
    },
    /// Fires a building's shot at `target` and restarts its cooldown.
    FireBuilding {
        /// Building firing.
        building: BuildingId,
        /// Cell the shot is locked onto.
        target: CellCoord,
    },
    /// Drops a building's aim and wind-up because nothing is in range.
    ClearBuildingTarget {
        /// Building losing its target.
        building: BuildingId,
    },
    /// Decrements every building cooldown.
    CoolDownBuildings,
    /// Removes buildings reduced to zero hit points.
    PurgeDestroyedBuildings,
    /// Plays `card` for `player` at `cell`.
    DeployCard {
        /// Player paying for the card.
        player: PlayerId,
        /// Card being played.
        card: CardKind,
        /// Target tile.
        cell: CellCoord,
    },
    /// Issues a manual destination to a unit.
    SetUnitDestination {
        /// Player issuing the order.
        player: PlayerId,
        /// Unit receiving the order.
        unit: UnitId,
        /// Destination tile.
        cell: CellCoord,
    },
    /// Eliminates players whose main tower fell and transfers their territory.
    ResolveEliminations,
    /// Ends the battle once at most one player remains.
    CheckVictory,
    /// Leaves the result phase and discards the grid.
    ReturnToMenu,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A new match was set up.
    MatchStarted {
        /// Mode of the new match.
        mode: GameMode,
    },
    /// The match entered a new phase.
    PhaseChanged {
        /// Phase that became active.
        phase: Phase,
        /// Seconds on the new phase's countdown.
        countdown: u32,
    },
    /// The phase countdown ticked down by one second.
    CountdownAdvanced {
        /// Seconds remaining.
        remaining: u32,
    },
    /// Every seat gained mana.
    ManaRegenerated,
    /// A unit was deployed onto the grid.
    UnitDeployed {
        /// Identifier assigned to the unit.
        unit: UnitId,
        /// Archetype deployed.
        kind: UnitKind,
        /// Owning player.
        owner: PlayerId,
        /// Tile the unit was placed on.
        cell: CellCoord,
    },
    /// A building was constructed.
    BuildingPlaced {
        /// Identifier assigned to the building.
        building: BuildingId,
        /// Archetype constructed.
        kind: BuildingKind,
        /// Owning player.
        owner: PlayerId,
        /// Tile the building occupies.
        cell: CellCoord,
    },
    /// A spell resolved.
    SpellCast {
        /// Player who paid for the spell.
        caster: PlayerId,
        /// Spell that was cast.
        spell: SpellKind,
        /// Center of the area.
        cell: CellCoord,
    },
    /// A card could not be played; nothing changed.
    DeployRejected {
        /// Player attempting the play.
        player: PlayerId,
        /// Card requested.
        card: CardKind,
        /// Target tile requested.
        cell: CellCoord,
        /// Specific reason the play failed.
        reason: DeployError,
    },
    /// A unit moved between two tiles.
    UnitAdvanced {
        /// Unit that moved.
        unit: UnitId,
        /// Tile occupied before moving.
        from: CellCoord,
        /// Tile occupied after moving.
        to: CellCoord,
    },
    /// A step request was refused; the unit stayed put.
    UnitStepRejected {
        /// Unit that attempted the step.
        unit: UnitId,
        /// Specific reason the step failed.
        reason: StepError,
    },
    /// A unit received a manual destination.
    DestinationAssigned {
        /// Unit receiving the order.
        unit: UnitId,
        /// Destination tile.
        cell: CellCoord,
    },
    /// A manual destination was refused.
    DestinationRejected {
        /// Unit the order addressed.
        unit: UnitId,
        /// Destination tile requested.
        cell: CellCoord,
        /// Specific reason the order failed.
        reason: DestinationError,
    },
    /// A unit regained hit points.
    UnitHealed {
        /// Unit healed.
        unit: UnitId,
        /// Hit points restored.
        amount: u32,
        /// Hit points after healing.
        hp: u32,
    },
    /// A unit lost hit points.
    UnitDamaged {
        /// Unit damaged.
        unit: UnitId,
        /// Damage applied.
        amount: u32,
        /// Hit points after the hit.
        hp: u32,
    },
    /// A unit was frozen in place.
    UnitFrozen {
        /// Unit frozen.
        unit: UnitId,
        /// Ticks of freeze applied.
        ticks: u32,
    },
    /// A unit dropped to zero hit points.
    UnitDied {
        /// Unit that died.
        unit: UnitId,
        /// Tile the unit died on.
        cell: CellCoord,
    },
    /// A dead unit was purged from the grid.
    UnitRemoved {
        /// Unit removed.
        unit: UnitId,
    },
    /// A building lost hit points.
    BuildingDamaged {
        /// Building damaged.
        building: BuildingId,
        /// Damage applied.
        amount: u32,
        /// Hit points after the hit.
        hp: u32,
    },
    /// A building added a wind-up charge.
    BuildingCharging {
        /// Building winding up.
        building: BuildingId,
        /// Charges accumulated so far.
        charge: u32,
    },
    /// A destroyed building was removed from its tile.
    BuildingDestroyed {
        /// Building removed.
        building: BuildingId,
        /// Tile the building occupied.
        cell: CellCoord,
    },
    /// A projectile left its launcher.
    ProjectileLaunched {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Player credited with the damage.
        owner: PlayerId,
        /// Launch tile.
        from: CellCoord,
        /// Locked target tile.
        to: CellCoord,
    },
    /// A projectile arrived and was removed.
    ProjectileImpacted {
        /// Projectile that arrived.
        projectile: ProjectileId,
        /// Impact tile, or `None` when the projectile left the grid.
        cell: Option<CellCoord>,
    },
    /// A player's main tower fell.
    PlayerEliminated {
        /// Player knocked out.
        player: PlayerId,
        /// Player credited with the final blow.
        conqueror: PlayerId,
    },
    /// Territory changed hands after an elimination.
    TerritoryConquered {
        /// Player whose tiles were transferred.
        defeated: PlayerId,
        /// Player receiving the tiles.
        conqueror: PlayerId,
        /// Number of tiles transferred.
        tiles: u32,
    },
    /// The match reached its result.
    MatchEnded {
        /// Outcome of the match.
        winner: Winner,
    },
    /// The grid was discarded and the menu is active again.
    ReturnedToMenu,
}

/// Reasons a card play may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum DeployError {
    /// Cards can only be played during prep or battle.
    #[error("cards cannot be played in the current phase")]
    InvalidPhase,
    /// The player has been eliminated.
    #[error("eliminated players cannot play cards")]
    PlayerEliminated,
    /// The target tile lies outside the grid.
    #[error("target tile lies outside the grid")]
    OutOfBounds,
    /// The target tile is not part of the player's territory.
    #[error("target tile is not part of the player's territory")]
    NotOwnedTerritory,
    /// The player cannot afford the card.
    #[error("not enough mana")]
    InsufficientMana,
    /// A building already stands on the target tile.
    #[error("target tile already holds a building")]
    TileHasBuilding,
}

/// Reasons a unit step may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum StepError {
    /// The unit is unknown, dead, or not ready to move.
    #[error("unit cannot move this tick")]
    NotReady,
    /// The destination lies outside the grid.
    #[error("destination lies outside the grid")]
    OutOfBounds,
    /// The destination already holds the maximum number of units.
    #[error("destination tile is full")]
    TileFull,
    /// A building occupies the destination.
    #[error("destination tile is blocked by a building")]
    Blocked,
}

/// Reasons a manual destination may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum DestinationError {
    /// The unit does not exist or has died.
    #[error("unit no longer exists")]
    UnknownUnit,
    /// The unit belongs to another player.
    #[error("unit belongs to another player")]
    NotOwner,
    /// The destination lies outside the grid.
    #[error("destination lies outside the grid")]
    OutOfBounds,
    /// The destination lies inside an opponent's territory.
    #[error("destination lies inside hostile territory")]
    HostileTerritory,
}
