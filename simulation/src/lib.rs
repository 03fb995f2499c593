#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick orchestration for Tower Conquest matches.
//!
//! [`Simulation`] owns the world and every system. Elapsed time fed through
//! [`Simulation::advance`] drives three independent timers: the one-second
//! phase countdown, the mana pulse and the battle tick. Each battle tick runs
//! a fixed pipeline:
//!
//! 1. advance projectiles and resolve impacts,
//! 2. decay cosmetic effects,
//! 3. update unit status counters and purge dead units,
//! 4. plan and apply each unit's turn in scan order,
//! 5. aim and fire buildings, then cool them down,
//! 6. purge destroyed buildings,
//! 7. let AI seats deploy cards,
//! 8. resolve eliminations and territory conquest,
//! 9. check the win condition.

mod clock;
mod config;

use std::time::Duration;

use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tower_conquest_core::{
    BuildingTarget, Command, Event, GameMode, Phase, PlayerId, Winner, WorldSnapshot,
};
use tower_conquest_system_ai_deploy::{AiDeployer, Contender};
use tower_conquest_system_building_combat::BuildingCombat;
use tower_conquest_system_building_targeting::BuildingTargeting;
use tower_conquest_system_commander::{Commander, Control};
use tower_conquest_system_targeting::UnitPlanner;
use tower_conquest_world::{self as world, query, World};

use clock::Clock;

pub use config::{AiSettings, ConfigError, SimulationConfig};
pub use tower_conquest_system_commander::{PlayerInput, Selection};

/// Result handed back when the player acknowledges a finished match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MatchOutcome {
    /// Winning seat or a tie.
    pub winner: Winner,
    /// Stake configured for the match; payout math happens elsewhere.
    pub wager: u32,
}

/// Everything a presentation layer needs to draw one frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimulationSnapshot {
    /// Battlefield state.
    pub world: WorldSnapshot,
    /// Whether the pause gate is closed.
    pub paused: bool,
    /// Battle ticks processed so far.
    pub tick: u64,
    /// Seat controlled by the local input surface.
    pub local_player: PlayerId,
    /// Local player's current selection.
    pub selection: Selection,
}

/// Owns a world together with the systems and timers that drive it.
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    world: World,
    clock: Clock,
    paused: bool,
    planner: UnitPlanner,
    building_targeting: BuildingTargeting,
    building_combat: BuildingCombat,
    ai: AiDeployer<ChaCha8Rng>,
    commander: Commander,
    commands: Vec<Command>,
    targets: Vec<BuildingTarget>,
    events: Vec<Event>,
}

impl Simulation {
    /// Validates `config` and creates a simulation sitting in the menu.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            world: World::with_config(config.world()),
            clock: Clock::new(config.frame_interval(), config.mana_interval()),
            paused: false,
            planner: UnitPlanner::new(),
            building_targeting: BuildingTargeting::new(),
            building_combat: BuildingCombat::new(),
            ai: AiDeployer::new(config.ai.into(), ChaCha8Rng::seed_from_u64(config.seed)),
            commander: Commander::new(PlayerId::One),
            commands: Vec::new(),
            targets: Vec::new(),
            events: Vec::new(),
            config,
        })
    }

    /// Configuration the simulation was created with.
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Read-only access to the authoritative world, for use with `query`.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Phase of the current match.
    #[must_use]
    pub fn phase(&self) -> Phase {
        query::phase(&self.world)
    }

    /// Starts a new match in `mode`, discarding any match in progress.
    ///
    /// Undrained events from the previous match are dropped.
    pub fn start_match(&mut self, mode: GameMode) {
        self.clock.reset();
        self.paused = false;
        self.events.clear();
        info!("starting {mode:?} match, AI seats {:?}", self.config.ai_players);
        self.dispatch(Command::StartMatch {
            mode,
            ai_players: self.config.ai_players,
        });
    }

    /// Feeds elapsed wall time into the timers, running every tick that falls due.
    ///
    /// Nothing advances while paused.
    pub fn advance(&mut self, dt: Duration) {
        if self.paused {
            return;
        }

        let slice = self.clock.max_slice();
        let mut remaining = dt;
        while !remaining.is_zero() {
            let step = remaining.min(slice);
            remaining -= step;

            let phase = self.phase();
            let due = self.clock.advance(step, phase);
            if due.second {
                self.dispatch(Command::AdvancePhaseClock);
            }
            if due.mana {
                self.dispatch(Command::RegenerateMana);
            }
            if due.frame {
                self.step();
            }
        }
    }

    /// Runs one battle tick immediately, regardless of the timers.
    ///
    /// Outside the battle phase this does nothing.
    pub fn step(&mut self) {
        if self.phase() != Phase::Battle {
            return;
        }

        self.dispatch(Command::AdvanceProjectiles);
        self.dispatch(Command::DecayEffects);
        self.dispatch(Command::UpdateUnitStatus);
        self.plan_units();
        self.fire_buildings();
        self.dispatch(Command::PurgeDestroyedBuildings);
        self.deploy_ai();
        self.dispatch(Command::ResolveEliminations);
        self.dispatch(Command::CheckVictory);
    }

    /// Routes local player input through the commander.
    pub fn handle_input(&mut self, input: PlayerInput) {
        debug!("input {input:?}");
        let mut commands = std::mem::take(&mut self.commands);
        commands.clear();
        let control = self.commander.handle(
            input,
            &query::grid_view(&self.world),
            &self.config.deck,
            &mut commands,
        );
        if control == Control::TogglePause {
            self.set_paused(!self.paused);
        }

        let issued = !commands.is_empty();
        for command in commands.drain(..) {
            self.dispatch(command);
        }
        self.commands = commands;

        if issued {
            self.dispatch(Command::ResolveEliminations);
            self.dispatch(Command::CheckVictory);
        }
    }

    /// Whether the pause gate is closed.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Opens or closes the pause gate.
    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            info!("{}", if paused { "paused" } else { "resumed" });
        }
        self.paused = paused;
    }

    /// Captures the state a renderer needs for the current frame.
    #[must_use]
    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            world: query::snapshot(&self.world),
            paused: self.paused,
            tick: query::tick_index(&self.world),
            local_player: self.commander.player(),
            selection: self.commander.selection(),
        }
    }

    /// Confirms the result screen and returns to the menu.
    ///
    /// Returns `None` unless the match has ended. Undrained events of the
    /// finished match are dropped; only the return to the menu remains.
    pub fn acknowledge_result(&mut self) -> Option<MatchOutcome> {
        if self.phase() != Phase::Result {
            return None;
        }
        let winner = query::winner(&self.world)?;
        let outcome = MatchOutcome {
            winner,
            wager: self.config.wager,
        };
        info!("result acknowledged: {winner}, wager {}", outcome.wager);
        self.events.clear();
        self.dispatch(Command::ReturnToMenu);
        self.clock.reset();
        Some(outcome)
    }

    /// Drains the events produced since the previous call or the last match boundary.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    fn dispatch(&mut self, command: Command) {
        let start = self.events.len();
        world::apply(&mut self.world, command, &mut self.events);
        self.commander.observe(&self.events[start..]);
    }

    fn plan_units(&mut self) {
        // Eliminations resolve in a later stage, so the seat list holds for the whole loop.
        let seats = query::alive_seats(&self.world);
        let mut commands = std::mem::take(&mut self.commands);
        for unit in query::unit_turn_order(&self.world) {
            commands.clear();
            self.planner
                .handle(&query::grid_view(&self.world), unit, &seats, &mut commands);
            for command in commands.drain(..) {
                self.dispatch(command);
            }
        }
        self.commands = commands;
    }

    fn fire_buildings(&mut self) {
        let phase = self.phase();
        let mut commands = std::mem::take(&mut self.commands);
        commands.clear();
        {
            let view = query::grid_view(&self.world);
            self.building_targeting
                .handle(phase, &view, &mut self.targets);
            self.building_combat
                .handle(phase, &view, &self.targets, &mut commands);
        }
        for command in commands.drain(..) {
            self.dispatch(command);
        }
        self.commands = commands;
        self.dispatch(Command::CoolDownBuildings);
    }

    fn deploy_ai(&mut self) {
        let contenders: Vec<Contender> = query::alive_seats(&self.world)
            .into_iter()
            .map(|seat| Contender {
                player: seat.player,
                state: query::player(&self.world, seat.player),
                tower: seat.tower,
            })
            .collect();
        let phase = self.phase();
        let mut commands = std::mem::take(&mut self.commands);
        commands.clear();
        self.ai.handle(
            phase,
            &query::grid_view(&self.world),
            &contenders,
            &self.config.deck,
            &mut commands,
        );
        for command in commands.drain(..) {
            self.dispatch(command);
        }
        self.commands = commands;
    }
}

#[cfg(test)]
mod tests {
    use tower_conquest_core::{BuildingKind, CardKind, CellCoord, UnitKind};

    use super::*;

    fn quiet() -> SimulationConfig {
        SimulationConfig {
            ai_players: [false; 4],
            prep_seconds: 2,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        let config = SimulationConfig {
            deck: Vec::new(),
            ..SimulationConfig::default()
        };
        assert!(matches!(Simulation::new(config), Err(ConfigError::EmptyDeck)));
    }

    #[test]
    fn prep_counts_down_into_battle() {
        let mut simulation = Simulation::new(quiet()).expect("valid config");
        simulation.start_match(GameMode::FourPlayer);
        assert_eq!(simulation.phase(), Phase::Prep);

        simulation.advance(Duration::from_millis(1500));
        assert_eq!(simulation.phase(), Phase::Prep);
        assert_eq!(query::countdown(simulation.world()), 1);

        simulation.advance(Duration::from_millis(500));
        assert_eq!(simulation.phase(), Phase::Battle);
        assert_eq!(query::countdown(simulation.world()), 240);
        assert_eq!(query::tick_index(simulation.world()), 0);

        simulation.advance(Duration::from_millis(160));
        assert_eq!(query::tick_index(simulation.world()), 10);
    }

    #[test]
    fn mana_regenerates_only_in_battle() {
        let mut simulation = Simulation::new(quiet()).expect("valid config");
        simulation.start_match(GameMode::FourPlayer);
        simulation.handle_input(PlayerInput::SelectCard(CardKind::Unit(UnitKind::Knight)));
        simulation.handle_input(PlayerInput::ClickTile(CellCoord::new(12, 19)));
        let mana = |simulation: &Simulation| query::player(simulation.world(), PlayerId::One).mana;
        assert_eq!(mana(&simulation), 22);

        simulation.advance(Duration::from_secs(2));
        assert_eq!(mana(&simulation), 22);
        simulation.advance(Duration::from_millis(1500));
        assert_eq!(mana(&simulation), 23);
    }

    #[test]
    fn pause_gate_freezes_every_timer() {
        let mut simulation = Simulation::new(quiet()).expect("valid config");
        simulation.start_match(GameMode::TwoPlayer);
        simulation.handle_input(PlayerInput::TogglePause);
        assert!(simulation.is_paused());

        simulation.advance(Duration::from_secs(10));
        assert_eq!(simulation.phase(), Phase::Prep);
        assert_eq!(query::countdown(simulation.world()), 2);

        simulation.handle_input(PlayerInput::TogglePause);
        simulation.advance(Duration::from_secs(1));
        assert_eq!(query::countdown(simulation.world()), 1);
    }

    #[test]
    fn acknowledging_a_finished_match_returns_the_wager() {
        let mut simulation = Simulation::new(SimulationConfig {
            battle_seconds: 1,
            ..quiet()
        })
        .expect("valid config");
        assert_eq!(simulation.acknowledge_result(), None);

        simulation.start_match(GameMode::TwoPlayer);
        simulation.advance(Duration::from_secs(3));
        assert_eq!(simulation.phase(), Phase::Result);

        let outcome = simulation.acknowledge_result();
        assert_eq!(
            outcome,
            Some(MatchOutcome {
                winner: Winner::Tie,
                wager: 25,
            })
        );
        assert_eq!(simulation.phase(), Phase::Menu);
        assert!(simulation
            .take_events()
            .iter()
            .any(|event| matches!(event, Event::ReturnedToMenu)));
    }

    #[test]
    fn slow_frames_still_count_down_in_real_time() {
        let mut simulation = Simulation::new(SimulationConfig {
            frame_interval_ms: 2000,
            prep_seconds: 10,
            ..quiet()
        })
        .expect("valid config");
        simulation.start_match(GameMode::TwoPlayer);

        simulation.advance(Duration::from_secs(10));
        assert_eq!(simulation.phase(), Phase::Battle);
    }

    #[test]
    fn fast_mana_pulses_are_not_dropped() {
        let mut simulation = Simulation::new(SimulationConfig {
            mana_interval_ms: 5,
            prep_seconds: 1,
            ..quiet()
        })
        .expect("valid config");
        simulation.start_match(GameMode::TwoPlayer);
        simulation.advance(Duration::from_secs(1));
        assert_eq!(simulation.phase(), Phase::Battle);
        let _ = simulation.take_events();

        simulation.advance(Duration::from_millis(160));
        let pulses = simulation
            .take_events()
            .iter()
            .filter(|event| matches!(event, Event::ManaRegenerated))
            .count();
        assert_eq!(pulses, 32);
    }

    #[test]
    fn match_boundaries_drop_undrained_events() {
        let mut simulation = Simulation::new(SimulationConfig {
            battle_seconds: 1,
            ..quiet()
        })
        .expect("valid config");
        simulation.start_match(GameMode::TwoPlayer);
        simulation.advance(Duration::from_secs(3));
        assert_eq!(simulation.phase(), Phase::Result);

        assert!(simulation.acknowledge_result().is_some());
        let events = simulation.take_events();
        assert!(events
            .iter()
            .all(|event| !matches!(event, Event::MatchEnded { .. })));
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::ReturnedToMenu)));

        simulation.start_match(GameMode::TwoPlayer);
        simulation.advance(Duration::from_millis(500));
        simulation.start_match(GameMode::FourPlayer);
        let events = simulation.take_events();
        assert!(matches!(
            events.first(),
            Some(Event::MatchStarted {
                mode: GameMode::FourPlayer
            })
        ));
        assert_eq!(
            events
                .iter()
                .filter(|event| matches!(event, Event::MatchStarted { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn snapshot_reports_selection_and_pause() {
        let mut simulation = Simulation::new(quiet()).expect("valid config");
        simulation.start_match(GameMode::FourPlayer);
        let card = CardKind::Building(BuildingKind::Wall);
        simulation.handle_input(PlayerInput::SelectCard(card));
        simulation.set_paused(true);

        let snapshot = simulation.snapshot();
        assert!(snapshot.paused);
        assert_eq!(snapshot.selection.card, Some(card));
        assert_eq!(snapshot.local_player, PlayerId::One);
        assert_eq!(snapshot.world.phase, Phase::Prep);
    }
}
