#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Randomised card deployment for computer-controlled seats.
//!
//! The policy itself is the pure [`choose_action`] function; [`AiDeployer`]
//! owns the random source and feeds it every living AI seat once per battle
//! tick. Rejected deployments are not retried within the same tick.

use rand::{seq::SliceRandom, Rng, RngCore};
use tower_conquest_core::{CardKind, CellCoord, Command, GridView, Phase, PlayerId, PlayerState};

/// Smallest column/row offset applied around the player's own tower.
const TOWER_OFFSET_MIN: i64 = -3;
/// Largest column/row offset applied around the player's own tower.
const TOWER_OFFSET_MAX: i64 = 2;

/// Tunables for the deployment policy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// Probability that a seat attempts a deployment on a given tick.
    pub deploy_chance: f64,
    /// Mana a seat must hold before it considers deploying.
    pub min_mana: u32,
    /// Share of attempts aimed near the seat's own tower rather than anywhere in its territory.
    pub near_tower_bias: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            deploy_chance: 0.06,
            min_mana: 2,
            near_tower_bias: 0.75,
        }
    }
}

/// AI-controlled seat considered for deployment this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contender {
    /// Seat identity.
    pub player: PlayerId,
    /// Current hit points, mana and flags.
    pub state: PlayerState,
    /// Cell of the seat's main tower.
    pub tower: CellCoord,
}

/// Card play chosen by the policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Deployment {
    /// Card to play.
    pub card: CardKind,
    /// Tile the card is aimed at.
    pub cell: CellCoord,
}

/// Deployment pass that owns the injected random source.
#[derive(Debug)]
pub struct AiDeployer<R> {
    config: Config,
    rng: R,
    territory: Vec<CellCoord>,
}

impl<R: RngCore> AiDeployer<R> {
    /// Creates a deployer that draws from `rng`.
    #[must_use]
    pub fn new(config: Config, rng: R) -> Self {
        Self {
            config,
            rng,
            territory: Vec::new(),
        }
    }

    /// Tunables in effect.
    #[must_use]
    pub fn config(&self) -> Config {
        self.config
    }

    /// Emits at most one `DeployCard` per living AI contender, in seat order.
    ///
    /// Nothing happens outside the battle phase.
    pub fn handle(
        &mut self,
        phase: Phase,
        view: &GridView<'_>,
        contenders: &[Contender],
        deck: &[CardKind],
        out: &mut Vec<Command>,
    ) {
        if phase != Phase::Battle {
            return;
        }

        for contender in contenders {
            if !contender.state.is_ai || !contender.state.is_alive {
                continue;
            }
            self.territory.clear();
            self.territory.extend(view.territory(contender.player));

            if let Some(deployment) = choose_action(
                &mut self.rng,
                &self.config,
                &contender.state,
                contender.tower,
                deck,
                &self.territory,
                view.size(),
            ) {
                out.push(Command::DeployCard {
                    player: contender.player,
                    card: deployment.card,
                    cell: deployment.cell,
                });
            }
        }
    }
}

/// Decides whether a seat plays a card this tick and where.
///
/// Draws the attempt roll first, then a uniformly chosen affordable card, then
/// the location: near `tower` with probability `near_tower_bias`, otherwise a
/// uniformly chosen tile of `territory`.
pub fn choose_action<R: Rng + ?Sized>(
    rng: &mut R,
    config: &Config,
    state: &PlayerState,
    tower: CellCoord,
    deck: &[CardKind],
    territory: &[CellCoord],
    grid_size: u32,
) -> Option<Deployment> {
    if rng.gen::<f64>() >= config.deploy_chance || state.mana < config.min_mana {
        return None;
    }

    let affordable: Vec<CardKind> = deck
        .iter()
        .copied()
        .filter(|card| card.cost() <= state.mana)
        .collect();
    let card = *affordable.choose(rng)?;

    let cell = if rng.gen::<f64>() < config.near_tower_bias {
        near(rng, tower, grid_size)
    } else {
        *territory.choose(rng)?
    };
    Some(Deployment { card, cell })
}

fn near<R: Rng + ?Sized>(rng: &mut R, tower: CellCoord, grid_size: u32) -> CellCoord {
    let limit = i64::from(grid_size.saturating_sub(1));
    let mut axis = |value: u32| {
        let offset = rng.gen_range(TOWER_OFFSET_MIN..=TOWER_OFFSET_MAX);
        let clamped = (i64::from(value) + offset).clamp(0, limit);
        u32::try_from(clamped).unwrap_or(0)
    };
    let column = axis(tower.column());
    let row = axis(tower.row());
    CellCoord::new(column, row)
}
