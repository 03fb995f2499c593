//! Match lifecycle: setup, phase countdown, mana, eliminations and victory.

use log::info;
use tower_conquest_core::{
    Building, BuildingId, Event, GameMode, Phase, PlayerId, PlayerState, ProjectileId, UnitId,
    Winner,
};

use crate::{grid::Grid, territory, World};

impl World {
    /// Builds a fresh grid for `mode`, seats the players and enters prep.
    ///
    /// Any match in progress is discarded.
    pub(crate) fn start_match(
        &mut self,
        mode: GameMode,
        ai_players: [bool; 4],
        out_events: &mut Vec<Event>,
    ) {
        self.mode = mode;
        let layout = self.layout();
        self.grid = Grid::with_owners(layout.size, |cell| layout.owner_of(cell));
        self.reset_entities();

        let hp = self.config.main_tower_hp;
        let mana = self.config.mana_max;
        for player in PlayerId::ALL {
            let Some(seat) = layout.seat(player) else {
                *self.player_mut(player) = PlayerState::vacant(hp, mana);
                continue;
            };
            *self.player_mut(player) = PlayerState::seated(hp, mana, ai_players[player.index()]);
            let id = self.allocate_building_id();
            if let Some(tile) = self.grid.tile_mut(seat) {
                tile.building = Some(Building::main_tower(id, player, seat, hp));
            }
            let _ = self.building_cells.insert(id, seat);
        }

        self.winner = None;
        self.phase = Phase::Prep;
        self.countdown = self.config.prep_seconds;
        info!("{mode:?} match started on a {0}x{0} grid", layout.size);
        out_events.push(Event::MatchStarted { mode });
        out_events.push(Event::PhaseChanged {
            phase: Phase::Prep,
            countdown: self.countdown,
        });
    }

    /// Counts the phase clock down by one second, switching phases on expiry.
    pub(crate) fn advance_phase_clock(&mut self, out_events: &mut Vec<Event>) {
        if !matches!(self.phase, Phase::Prep | Phase::Battle) {
            return;
        }
        if self.countdown > 1 {
            self.countdown -= 1;
            out_events.push(Event::CountdownAdvanced {
                remaining: self.countdown,
            });
            return;
        }

        match self.phase {
            Phase::Prep => {
                self.phase = Phase::Battle;
                self.countdown = self.config.battle_seconds;
                info!("battle begins");
                out_events.push(Event::PhaseChanged {
                    phase: Phase::Battle,
                    countdown: self.countdown,
                });
            }
            _ => {
                let winner = self.leader_by_hp();
                self.finish(winner, out_events);
            }
        }
    }

    pub(crate) fn regenerate_mana(&mut self, out_events: &mut Vec<Event>) {
        if !self.in_battle() {
            return;
        }
        let cap = self.config.mana_max;
        for state in self.players.iter_mut() {
            state.mana = state.mana.saturating_add(1).min(cap);
        }
        out_events.push(Event::ManaRegenerated);
    }

    /// Eliminates every player whose main tower fell and hands their territory over.
    pub(crate) fn resolve_eliminations(&mut self, out_events: &mut Vec<Event>) {
        for (defeated, conqueror) in std::mem::take(&mut self.pending_eliminations) {
            let state = self.player_mut(defeated);
            if !state.is_alive {
                continue;
            }
            state.is_alive = false;
            state.hp = 0;

            let tiles = territory::conquer(&mut self.grid, defeated, conqueror);
            info!("{defeated} eliminated by {conqueror}, {tiles} tiles conquered");
            out_events.push(Event::PlayerEliminated {
                player: defeated,
                conqueror,
            });
            out_events.push(Event::TerritoryConquered {
                defeated,
                conqueror,
                tiles,
            });
        }
    }

    /// Ends the battle once at most one player remains.
    pub(crate) fn check_victory(&mut self, out_events: &mut Vec<Event>) {
        if !self.in_battle() {
            return;
        }
        let mut alive = PlayerId::ALL
            .into_iter()
            .filter(|player| self.player(*player).is_alive);
        let first = alive.next();
        if alive.next().is_some() {
            return;
        }
        let winner = first.map_or(Winner::Tie, Winner::Player);
        self.finish(winner, out_events);
    }

    pub(crate) fn return_to_menu(&mut self, out_events: &mut Vec<Event>) {
        if self.phase != Phase::Result {
            return;
        }
        self.phase = Phase::Menu;
        self.countdown = 0;
        self.winner = None;
        self.grid = Grid::default();
        self.reset_entities();
        out_events.push(Event::ReturnedToMenu);
    }

    /// Alive player with strictly the greatest hit points, or a tie.
    fn leader_by_hp(&self) -> Winner {
        let mut leader = Winner::Tie;
        let mut best = None;
        for player in PlayerId::ALL {
            let state = self.player(player);
            if !state.is_alive {
                continue;
            }
            match best {
                Some(hp) if state.hp < hp => {}
                Some(hp) if state.hp == hp => leader = Winner::Tie,
                _ => {
                    best = Some(state.hp);
                    leader = Winner::Player(player);
                }
            }
        }
        leader
    }

    fn finish(&mut self, winner: Winner, out_events: &mut Vec<Event>) {
        self.phase = Phase::Result;
        self.countdown = 0;
        self.winner = Some(winner);
        info!("match ended, winner: {winner}");
        out_events.push(Event::PhaseChanged {
            phase: Phase::Result,
            countdown: 0,
        });
        out_events.push(Event::MatchEnded { winner });
    }

    fn reset_entities(&mut self) {
        self.units.clear();
        self.building_cells.clear();
        self.projectiles.clear();
        self.explosions.clear();
        self.damage_numbers.clear();
        self.pending_eliminations.clear();
        self.next_unit_id = UnitId::new(0);
        self.next_building_id = BuildingId::new(0);
        self.next_projectile_id = ProjectileId::new(0);
    }
}
