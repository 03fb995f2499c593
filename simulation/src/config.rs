//! Match configuration loaded from TOML.

use std::{fs, io, path::Path, path::PathBuf, time::Duration};

use serde::Deserialize;
use thiserror::Error;
use tower_conquest_core::{default_deck, CardKind, GameMode};
use tower_conquest_system_ai_deploy::Config as AiConfig;
use tower_conquest_world::WorldConfig;

const MIN_GRID_SIZE: u32 = 8;

/// Failures raised while loading or validating a [`SimulationConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration from {}", .path.display())]
    Io {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The document is not valid TOML or does not match the schema.
    #[error("failed to parse configuration")]
    Parse(#[from] toml::de::Error),
    /// The grid cannot host the seats and their territories.
    #[error("grid size {0} is smaller than the minimum of {min}", min = MIN_GRID_SIZE)]
    GridTooSmall(u32),
    /// The deck lists no cards.
    #[error("the deck must contain at least one card")]
    EmptyDeck,
    /// A timer interval or the game speed is zero.
    #[error("`{0}` must be greater than zero")]
    Zero(&'static str),
    /// A probability lies outside `[0, 1]`.
    #[error("`{name}` must lie within [0, 1], got {value}")]
    Probability {
        /// Field holding the probability.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },
}

/// Tunables for the computer-controlled seats.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AiSettings {
    /// Per-tick probability that an AI seat tries to deploy.
    pub deploy_chance: f64,
    /// Mana an AI seat must hold before deploying.
    pub min_mana: u32,
    /// Share of AI deployments aimed near the seat's own tower.
    pub near_tower_bias: f64,
}

impl Default for AiSettings {
    fn default() -> Self {
        let defaults = AiConfig::default();
        Self {
            deploy_chance: defaults.deploy_chance,
            min_mana: defaults.min_mana,
            near_tower_bias: defaults.near_tower_bias,
        }
    }
}

impl From<AiSettings> for AiConfig {
    fn from(settings: AiSettings) -> Self {
        Self {
            deploy_chance: settings.deploy_chance,
            min_mana: settings.min_mana,
            near_tower_bias: settings.near_tower_bias,
        }
    }
}

/// Everything needed to run matches.
///
/// Every field has a default, so an empty TOML document is a valid
/// configuration.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Mode used when a match is started without an explicit one.
    pub mode: GameMode,
    /// Number of tiles along each side of the grid.
    pub grid_size: u32,
    /// Manhattan radius of four-player home territories.
    pub territory_radius: u32,
    /// Rows owned by each side in duels.
    pub band_depth: u32,
    /// Upper bound of every mana pool.
    pub mana_max: u32,
    /// Hit points of each main tower.
    pub main_tower_hp: u32,
    /// Seconds on the prep countdown.
    pub prep_seconds: u32,
    /// Seconds on the battle countdown.
    pub battle_seconds: u32,
    /// Milliseconds between battle ticks.
    pub frame_interval_ms: u64,
    /// Milliseconds between mana regeneration pulses.
    pub mana_interval_ms: u64,
    /// Multiplier applied to per-tick decrements and physics.
    pub game_speed: u32,
    /// Opaque stake returned with the match outcome.
    pub wager: u32,
    /// Seed of the AI random source.
    pub seed: u64,
    /// Cards available to every seat.
    pub deck: Vec<CardKind>,
    /// Per-seat AI flags in seat order.
    pub ai_players: [bool; 4],
    /// AI deployment tunables.
    pub ai: AiSettings,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let world = WorldConfig::default();
        Self {
            mode: GameMode::FourPlayer,
            grid_size: world.grid_size,
            territory_radius: world.territory_radius,
            band_depth: world.band_depth,
            mana_max: world.mana_max,
            main_tower_hp: world.main_tower_hp,
            prep_seconds: world.prep_seconds,
            battle_seconds: world.battle_seconds,
            frame_interval_ms: 16,
            mana_interval_ms: 1500,
            game_speed: world.game_speed,
            wager: 25,
            seed: 0x7043_6f6e_7175_6573,
            deck: default_deck(),
            ai_players: [false, true, true, true],
            ai: AiSettings::default(),
        }
    }
}

impl SimulationConfig {
    /// Parses a TOML document and validates the result.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates the TOML file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Rejects settings the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size < MIN_GRID_SIZE {
            return Err(ConfigError::GridTooSmall(self.grid_size));
        }
        if self.deck.is_empty() {
            return Err(ConfigError::EmptyDeck);
        }
        if self.frame_interval_ms == 0 {
            return Err(ConfigError::Zero("frame_interval_ms"));
        }
        if self.mana_interval_ms == 0 {
            return Err(ConfigError::Zero("mana_interval_ms"));
        }
        if self.game_speed == 0 {
            return Err(ConfigError::Zero("game_speed"));
        }
        for (name, value) in [
            ("ai.deploy_chance", self.ai.deploy_chance),
            ("ai.near_tower_bias", self.ai.near_tower_bias),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Probability { name, value });
            }
        }
        Ok(())
    }

    /// Rules handed to the world.
    #[must_use]
    pub fn world(&self) -> WorldConfig {
        WorldConfig {
            grid_size: self.grid_size,
            territory_radius: self.territory_radius,
            band_depth: self.band_depth,
            mana_max: self.mana_max,
            main_tower_hp: self.main_tower_hp,
            prep_seconds: self.prep_seconds,
            battle_seconds: self.battle_seconds,
            game_speed: self.game_speed,
        }
    }

    /// Interval between battle ticks.
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    /// Interval between mana pulses.
    #[must_use]
    pub fn mana_interval(&self) -> Duration {
        Duration::from_millis(self.mana_interval_ms)
    }
}
