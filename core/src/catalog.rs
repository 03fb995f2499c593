//! Static archetype tables for every deployable card.
//!
//! The catalog is read-only configuration. Every other component resolves a
//! [`CardKind`] once and then works with the copied archetype values.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ticks a unit waits after any attack before it may attack or move again.
pub const UNIT_ATTACK_COOLDOWN: u32 = 30;
/// Hit points restored by a single healer pulse.
pub const HEALER_PULSE_AMOUNT: u32 = 25;
/// Ticks a healer waits between pulses.
pub const HEALER_PULSE_COOLDOWN: u32 = 25;
/// Progress gained per tick by projectiles launched from units.
pub const UNIT_SHOT_PROGRESS: f32 = 0.06;
/// Velocity scale applied to unit shots aimed at units.
pub const UNIT_SHOT_VELOCITY: f32 = 0.1;
/// Velocity scale applied to unit shots aimed at buildings.
pub const UNIT_SIEGE_SHOT_VELOCITY: f32 = 0.08;
/// Progress gained per tick by projectiles launched from buildings.
pub const BUILDING_SHOT_PROGRESS: f32 = 0.05;
/// Fraction of base damage applied to units on the eight cells around a splash impact.
pub const SPLASH_UNIT_FRACTION: f32 = 0.5;
/// Fraction of base damage applied to buildings on the eight cells around a splash impact.
pub const SPLASH_BUILDING_FRACTION: f32 = 0.3;

/// Cosmetic color attached to archetypes, projectiles and explosions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl CardColor {
    /// Creates a new color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Mobile unit archetypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    /// Tanky melee fighter.
    Knight,
    /// Ranged damage dealer.
    Archer,
    /// Short-ranged magic caster.
    Wizard,
    /// Slow, massive melee tank.
    Giant,
    /// Support unit that pulses heals onto damaged allies.
    Healer,
}

/// Immutable stat block describing a unit archetype.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct UnitArchetype {
    /// Display name.
    pub name: &'static str,
    /// Mana required to deploy.
    pub cost: u32,
    /// Starting and maximum hit points.
    pub hp: u32,
    /// Damage dealt per attack.
    pub damage: u32,
    /// Attack reach measured as a square neighborhood radius.
    pub range: u32,
    /// Ticks between consecutive steps.
    pub move_delay: u32,
    /// Cosmetic tint.
    pub color: CardColor,
    /// Short flavor text.
    pub description: &'static str,
}

impl UnitKind {
    /// Every unit archetype in catalog order.
    pub const ALL: [UnitKind; 5] = [
        UnitKind::Knight,
        UnitKind::Archer,
        UnitKind::Wizard,
        UnitKind::Giant,
        UnitKind::Healer,
    ];

    /// Returns the stat block for the unit.
    #[must_use]
    pub const fn archetype(self) -> UnitArchetype {
        match self {
            Self::Knight => UnitArchetype {
                name: "Knight",
                cost: 3,
                hp: 120,
                damage: 35,
                range: 1,
                move_delay: 18,
                color: CardColor::from_rgb(0x8b, 0x5c, 0xf6),
                description: "Tanky melee fighter",
            },
            Self::Archer => UnitArchetype {
                name: "Archer",
                cost: 2,
                hp: 70,
                damage: 25,
                range: 3,
                move_delay: 12,
                color: CardColor::from_rgb(0x10, 0xb9, 0x81),
                description: "Ranged damage dealer",
            },
            Self::Wizard => UnitArchetype {
                name: "Wizard",
                cost: 4,
                hp: 90,
                damage: 50,
                range: 2,
                move_delay: 15,
                color: CardColor::from_rgb(0x3b, 0x82, 0xf6),
                description: "Magic damage caster",
            },
            Self::Giant => UnitArchetype {
                name: "Giant",
                cost: 6,
                hp: 300,
                damage: 60,
                range: 1,
                move_delay: 30,
                color: CardColor::from_rgb(0x6b, 0x72, 0x80),
                description: "Massive tank unit",
            },
            Self::Healer => UnitArchetype {
                name: "Healer",
                cost: 3,
                hp: 80,
                damage: 0,
                range: 2,
                move_delay: 15,
                color: CardColor::from_rgb(0xf5, 0x9e, 0x0b),
                description: "Heals friendly units",
            },
        }
    }

    /// Reports whether the unit pulses heals before considering attacks.
    #[must_use]
    pub const fn is_healer(self) -> bool {
        matches!(self, Self::Healer)
    }

    /// Lowercase catalog key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Knight => "knight",
            Self::Archer => "archer",
            Self::Wizard => "wizard",
            Self::Giant => "giant",
            Self::Healer => "healer",
        }
    }
}

/// Instant area spells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpellKind {
    /// Area fire damage.
    Fireball,
    /// Freezes enemy units in place.
    Freeze,
    /// Small-radius high damage.
    Lightning,
    /// Restores friendly unit hit points.
    Heal,
}

/// Effect applied to every eligible unit or building inside a spell's area.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SpellEffect {
    /// Subtracts hit points from enemy units and buildings.
    Damage(u32),
    /// Sets the frozen countdown of enemy units to the given tick count.
    Freeze(u32),
    /// Restores hit points to friendly units, capped at their maximum.
    Heal(u32),
}

/// Immutable stat block describing a spell archetype.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SpellArchetype {
    /// Display name.
    pub name: &'static str,
    /// Mana required to cast.
    pub cost: u32,
    /// Square neighborhood radius around the cast cell.
    pub radius: u32,
    /// What the spell does to eligible targets.
    pub effect: SpellEffect,
    /// Cosmetic tint.
    pub color: CardColor,
    /// Short flavor text.
    pub description: &'static str,
}

impl SpellKind {
    /// Every spell archetype in catalog order.
    pub const ALL: [SpellKind; 4] = [
        SpellKind::Fireball,
        SpellKind::Freeze,
        SpellKind::Lightning,
        SpellKind::Heal,
    ];

    /// Returns the stat block for the spell.
    #[must_use]
    pub const fn archetype(self) -> SpellArchetype {
        match self {
            Self::Fireball => SpellArchetype {
                name: "Fireball",
                cost: 4,
                radius: 2,
                effect: SpellEffect::Damage(100),
                color: CardColor::from_rgb(0xdc, 0x26, 0x26),
                description: "Area fire damage",
            },
            Self::Freeze => SpellArchetype {
                name: "Freeze",
                cost: 3,
                radius: 2,
                effect: SpellEffect::Freeze(40),
                color: CardColor::from_rgb(0x06, 0xb6, 0xd4),
                description: "Freezes enemies",
            },
            Self::Lightning => SpellArchetype {
                name: "Lightning",
                cost: 5,
                radius: 1,
                effect: SpellEffect::Damage(150),
                color: CardColor::from_rgb(0xa8, 0x55, 0xf7),
                description: "High single damage",
            },
            Self::Heal => SpellArchetype {
                name: "Heal",
                cost: 2,
                radius: 2,
                effect: SpellEffect::Heal(80),
                color: CardColor::from_rgb(0x22, 0xc5, 0x5e),
                description: "Heals friendly units",
            },
        }
    }

    /// Lowercase catalog key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Fireball => "fireball",
            Self::Freeze => "freeze",
            Self::Lightning => "lightning",
            Self::Heal => "heal",
        }
    }
}

/// Static structures that occupy a whole tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    /// Defensive turret. Main towers use this kind.
    Tower,
    /// Inert blocker.
    Wall,
    /// Long-range artillery with a minimum range and a wind-up.
    Cannon,
    /// Fast electric turret.
    Tesla,
}

/// Immutable stat block describing a building archetype.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BuildingArchetype {
    /// Display name.
    pub name: &'static str,
    /// Mana required to construct.
    pub cost: u32,
    /// Starting and maximum hit points.
    pub hp: u32,
    /// Damage carried by each shot. Zero means the building never fires.
    pub damage: u32,
    /// Maximum Euclidean targeting distance in cells.
    pub range: u32,
    /// Minimum Euclidean targeting distance in cells.
    pub min_range: u32,
    /// Ticks between shots.
    pub attack_speed: u32,
    /// Charges that must accumulate before a shot. Zero fires immediately.
    pub wind_up: u32,
    /// Velocity scale applied to the shot displacement.
    pub shot_velocity: f32,
    /// Whether impacts splash onto the eight surrounding cells.
    pub splash: bool,
    /// Cosmetic tint.
    pub color: CardColor,
    /// Short flavor text.
    pub description: &'static str,
}

impl BuildingKind {
    /// Every building archetype in catalog order.
    pub const ALL: [BuildingKind; 4] = [
        BuildingKind::Tower,
        BuildingKind::Wall,
        BuildingKind::Cannon,
        BuildingKind::Tesla,
    ];

    /// Returns the stat block for the building.
    #[must_use]
    pub const fn archetype(self) -> BuildingArchetype {
        match self {
            Self::Tower => BuildingArchetype {
                name: "Tower",
                cost: 4,
                hp: 200,
                damage: 40,
                range: 4,
                min_range: 0,
                attack_speed: 25,
                wind_up: 0,
                shot_velocity: 0.06,
                splash: false,
                color: CardColor::from_rgb(0x1f, 0x29, 0x37),
                description: "Defensive structure",
            },
            Self::Wall => BuildingArchetype {
                name: "Wall",
                cost: 1,
                hp: 100,
                damage: 0,
                range: 0,
                min_range: 0,
                attack_speed: 0,
                wind_up: 0,
                shot_velocity: 0.0,
                splash: false,
                color: CardColor::from_rgb(0x6b, 0x72, 0x80),
                description: "Blocks movement - Can be destroyed!",
            },
            Self::Cannon => BuildingArchetype {
                name: "Cannon",
                cost: 3,
                hp: 100,
                damage: 80,
                range: 7,
                min_range: 3,
                attack_speed: 45,
                wind_up: 10,
                shot_velocity: 0.06,
                splash: true,
                color: CardColor::from_rgb(0x7c, 0x2d, 0x12),
                description: "Long-range artillery",
            },
            Self::Tesla => BuildingArchetype {
                name: "Tesla",
                cost: 4,
                hp: 100,
                damage: 60,
                range: 3,
                min_range: 0,
                attack_speed: 20,
                wind_up: 0,
                shot_velocity: 0.2,
                splash: false,
                color: CardColor::from_rgb(0x7c, 0x3a, 0xed),
                description: "Electric tower",
            },
        }
    }

    /// Lowercase catalog key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Tower => "tower",
            Self::Wall => "wall",
            Self::Cannon => "cannon",
            Self::Tesla => "tesla",
        }
    }
}

/// A deck card resolved once into its archetype family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CardKind {
    /// Deploys a unit onto the target tile.
    Unit(UnitKind),
    /// Casts a spell centred on the target tile.
    Spell(SpellKind),
    /// Constructs a building on the target tile.
    Building(BuildingKind),
}

impl CardKind {
    /// Mana required to play the card.
    #[must_use]
    pub const fn cost(self) -> u32 {
        match self {
            Self::Unit(kind) => kind.archetype().cost,
            Self::Spell(kind) => kind.archetype().cost,
            Self::Building(kind) => kind.archetype().cost,
        }
    }

    /// Lowercase catalog key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Unit(kind) => kind.key(),
            Self::Spell(kind) => kind.key(),
            Self::Building(kind) => kind.key(),
        }
    }

    /// Short flavor text of the underlying archetype.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Unit(kind) => kind.archetype().description,
            Self::Spell(kind) => kind.archetype().description,
            Self::Building(kind) => kind.archetype().description,
        }
    }
}

impl fmt::Display for CardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Raised when a string does not name any catalog entry.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown card `{0}`")]
pub struct UnknownCard(pub String);

impl FromStr for CardKind {
    type Err = UnknownCard;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let key = value.trim().to_ascii_lowercase();
        if let Some(kind) = UnitKind::ALL.into_iter().find(|kind| kind.key() == key) {
            return Ok(Self::Unit(kind));
        }
        if let Some(kind) = SpellKind::ALL.into_iter().find(|kind| kind.key() == key) {
            return Ok(Self::Spell(kind));
        }
        if let Some(kind) = BuildingKind::ALL.into_iter().find(|kind| kind.key() == key) {
            return Ok(Self::Building(kind));
        }
        Err(UnknownCard(value.to_owned()))
    }
}

impl TryFrom<String> for CardKind {
    type Error = UnknownCard;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CardKind> for String {
    fn from(card: CardKind) -> Self {
        card.key().to_owned()
    }
}

/// Deck used when configuration does not name one.
#[must_use]
pub fn default_deck() -> Vec<CardKind> {
    vec![
        CardKind::Unit(UnitKind::Knight),
        CardKind::Unit(UnitKind::Archer),
        CardKind::Unit(UnitKind::Wizard),
        CardKind::Spell(SpellKind::Fireball),
        CardKind::Building(BuildingKind::Tower),
        CardKind::Building(BuildingKind::Wall),
        CardKind::Building(BuildingKind::Cannon),
        CardKind::Spell(SpellKind::Heal),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_keys_parse_back_to_the_same_card() {
        for unit in UnitKind::ALL {
            assert_eq!(unit.key().parse::<CardKind>(), Ok(CardKind::Unit(unit)));
        }
        for spell in SpellKind::ALL {
            assert_eq!(spell.key().parse::<CardKind>(), Ok(CardKind::Spell(spell)));
        }
        for building in BuildingKind::ALL {
            assert_eq!(
                building.key().parse::<CardKind>(),
                Ok(CardKind::Building(building))
            );
        }
    }

    #[test]
    fn unknown_card_is_reported() {
        assert_eq!(
            "dragon".parse::<CardKind>(),
            Err(UnknownCard("dragon".to_owned()))
        );
    }

    #[test]
    fn card_cost_matches_archetype() {
        assert_eq!(CardKind::Unit(UnitKind::Giant).cost(), 6);
        assert_eq!(CardKind::Spell(SpellKind::Freeze).cost(), 3);
        assert_eq!(CardKind::Building(BuildingKind::Wall).cost(), 1);
    }

    #[test]
    fn only_cannon_winds_up_and_splashes() {
        for building in BuildingKind::ALL {
            let archetype = building.archetype();
            let artillery = building == BuildingKind::Cannon;
            assert_eq!(archetype.splash, artillery);
            assert_eq!(archetype.wind_up > 0, artillery);
        }
    }

    #[test]
    fn walls_never_fire() {
        assert_eq!(BuildingKind::Wall.archetype().damage, 0);
    }

    #[test]
    fn card_serializes_as_its_catalog_key() {
        let bytes = bincode::serialize(&CardKind::Building(BuildingKind::Cannon)).expect("serialize");
        let key: String = bincode::deserialize(&bytes).expect("deserialize as string");
        assert_eq!(key, "cannon");
        let card: CardKind = bincode::deserialize(&bytes).expect("deserialize as card");
        assert_eq!(card, CardKind::Building(BuildingKind::Cannon));
    }
}
