#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Tower Conquest.
//!
//! The world owns the grid, the unit arena, every building, projectile and
//! cosmetic effect, and the per-seat player table. It changes only through
//! [`apply`], which executes a single [`Command`] and reports the outcome as
//! [`Event`] values. Rejected commands leave the state untouched and produce a
//! rejection event carrying the reason.

use std::collections::BTreeMap;

use tower_conquest_core::{
    Building, BuildingId, CellCoord, Command, DamageNumber, Event, Explosion, GameMode, Phase,
    PlayerId, PlayerState, Projectile, ProjectileId, Unit, UnitId, Winner, WELCOME_BANNER,
};

mod combat;
mod deploy;
mod grid;
mod phase;
mod physics;
mod territory;
mod units;

use grid::Grid;
use territory::TerritoryLayout;

/// Tunable rules that shape a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldConfig {
    /// Number of tiles along each side of the square grid.
    pub grid_size: u32,
    /// Manhattan radius of four-player home territories.
    pub territory_radius: u32,
    /// Number of rows owned by each side in duels.
    pub band_depth: u32,
    /// Upper bound of every player's mana pool.
    pub mana_max: u32,
    /// Hit points of each main tower.
    pub main_tower_hp: u32,
    /// Seconds on the prep countdown.
    pub prep_seconds: u32,
    /// Seconds on the battle countdown.
    pub battle_seconds: u32,
    /// Multiplier applied to every per-tick decrement and physics step.
    pub game_speed: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            grid_size: 24,
            territory_radius: 6,
            band_depth: 6,
            mana_max: 25,
            main_tower_hp: 300,
            prep_seconds: 60,
            battle_seconds: 240,
            game_speed: 1,
        }
    }
}

/// Represents the authoritative Tower Conquest world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: WorldConfig,
    mode: GameMode,
    phase: Phase,
    countdown: u32,
    winner: Option<Winner>,
    grid: Grid,
    units: BTreeMap<UnitId, Unit>,
    building_cells: BTreeMap<BuildingId, CellCoord>,
    players: [PlayerState; 4],
    projectiles: Vec<Projectile>,
    explosions: Vec<Explosion>,
    damage_numbers: Vec<DamageNumber>,
    pending_eliminations: Vec<(PlayerId, PlayerId)>,
    next_unit_id: UnitId,
    next_building_id: BuildingId,
    next_projectile_id: ProjectileId,
    tick_index: u64,
}

impl World {
    /// Creates a world in the menu phase using the default rules.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Creates a world in the menu phase using the provided rules.
    #[must_use]
    pub fn with_config(config: WorldConfig) -> Self {
        let idle = PlayerState::vacant(config.main_tower_hp, config.mana_max);
        Self {
            banner: WELCOME_BANNER,
            config,
            mode: GameMode::FourPlayer,
            phase: Phase::Menu,
            countdown: 0,
            winner: None,
            grid: Grid::default(),
            units: BTreeMap::new(),
            building_cells: BTreeMap::new(),
            players: [idle; 4],
            projectiles: Vec::new(),
            explosions: Vec::new(),
            damage_numbers: Vec::new(),
            pending_eliminations: Vec::new(),
            next_unit_id: UnitId::new(0),
            next_building_id: BuildingId::new(0),
            next_projectile_id: ProjectileId::new(0),
            tick_index: 0,
        }
    }

    fn layout(&self) -> TerritoryLayout {
        TerritoryLayout {
            mode: self.mode,
            size: self.config.grid_size,
            radius: self.config.territory_radius,
            band_depth: self.config.band_depth,
        }
    }

    fn in_battle(&self) -> bool {
        self.phase == Phase::Battle
    }

    fn player(&self, player: PlayerId) -> &PlayerState {
        &self.players[player.index()]
    }

    fn player_mut(&mut self, player: PlayerId) -> &mut PlayerState {
        &mut self.players[player.index()]
    }

    fn allocate_unit_id(&mut self) -> UnitId {
        let id = self.next_unit_id;
        self.next_unit_id = UnitId::new(id.get().wrapping_add(1));
        id
    }

    fn allocate_building_id(&mut self) -> BuildingId {
        let id = self.next_building_id;
        self.next_building_id = BuildingId::new(id.get().wrapping_add(1));
        id
    }

    fn allocate_projectile_id(&mut self) -> ProjectileId {
        let id = self.next_projectile_id;
        self.next_projectile_id = ProjectileId::new(id.get().wrapping_add(1));
        id
    }

    fn building(&self, id: BuildingId) -> Option<&Building> {
        let cell = self.building_cells.get(&id)?;
        self.grid
            .tile(*cell)
            .and_then(|tile| tile.building.as_ref())
            .filter(|building| building.id == id)
    }

    fn building_mut(&mut self, id: BuildingId) -> Option<&mut Building> {
        let cell = *self.building_cells.get(&id)?;
        self.grid
            .tile_mut(cell)
            .and_then(|tile| tile.building.as_mut())
            .filter(|building| building.id == id)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartMatch { mode, ai_players } => {
            world.start_match(mode, ai_players, out_events);
        }
        Command::AdvancePhaseClock => world.advance_phase_clock(out_events),
        Command::RegenerateMana => world.regenerate_mana(out_events),
        Command::AdvanceProjectiles => {
            if world.in_battle() {
                world.tick_index = world.tick_index.saturating_add(1);
                world.advance_projectiles(out_events);
            }
        }
        Command::DecayEffects => {
            if world.in_battle() {
                world.decay_effects();
            }
        }
        Command::UpdateUnitStatus => {
            if world.in_battle() {
                world.update_unit_status(out_events);
            }
        }
        Command::HealUnit { healer, target } => {
            if world.in_battle() {
                world.heal_unit(healer, target, out_events);
            }
        }
        Command::Attack { attacker, target } => {
            if world.in_battle() {
                world.attack(attacker, target, out_events);
            }
        }
        Command::StepUnit { unit, direction } => {
            if world.in_battle() {
                world.step_unit(unit, direction, out_events);
            }
        }
        Command::ChargeBuilding { building, target } => {
            if world.in_battle() {
                world.charge_building(building, target, out_events);
            }
        }
        Command::FireBuilding { building, target } => {
            if world.in_battle() {
                world.fire_building(building, target, out_events);
            }
        }
        Command::ClearBuildingTarget { building } => world.clear_building_target(building),
        Command::CoolDownBuildings => {
            if world.in_battle() {
                world.cool_down_buildings();
            }
        }
        Command::PurgeDestroyedBuildings => world.purge_destroyed_buildings(out_events),
        Command::DeployCard { player, card, cell } => {
            world.deploy_card(player, card, cell, out_events);
        }
        Command::SetUnitDestination { player, unit, cell } => {
            world.set_unit_destination(player, unit, cell, out_events);
        }
        Command::ResolveEliminations => world.resolve_eliminations(out_events),
        Command::CheckVictory => world.check_victory(out_events),
        Command::ReturnToMenu => world.return_to_menu(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use tower_conquest_core::{
        Building, CellCoord, GameMode, GridView, Phase, PlayerId, PlayerSnapshot, PlayerState,
        Projectile, Seat, TileSnapshot, Unit, UnitId, Winner, WorldSnapshot,
    };

    use super::{World, WorldConfig};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Rules the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &WorldConfig {
        &world.config
    }

    /// Phase the match is currently in.
    #[must_use]
    pub fn phase(world: &World) -> Phase {
        world.phase
    }

    /// Mode of the current or most recent match.
    #[must_use]
    pub fn mode(world: &World) -> GameMode {
        world.mode
    }

    /// Seconds left on the phase countdown.
    #[must_use]
    pub fn countdown(world: &World) -> u32 {
        world.countdown
    }

    /// Outcome of the match once it reached the result phase.
    #[must_use]
    pub fn winner(world: &World) -> Option<Winner> {
        world.winner
    }

    /// Number of battle ticks processed since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// State of a single seat.
    #[must_use]
    pub fn player(world: &World, player: PlayerId) -> PlayerState {
        *world.player(player)
    }

    /// Players that are still in the match, in seat order.
    #[must_use]
    pub fn alive_players(world: &World) -> Vec<PlayerId> {
        PlayerId::ALL
            .into_iter()
            .filter(|player| world.player(*player).is_alive)
            .collect()
    }

    /// Main tower seats of the players still in the match, in seat order.
    #[must_use]
    pub fn alive_seats(world: &World) -> Vec<Seat> {
        let layout = world.layout();
        alive_players(world)
            .into_iter()
            .filter_map(|player| layout.seat(player).map(|tower| Seat { player, tower }))
            .collect()
    }

    /// Main tower seat of `player` in the current mode.
    #[must_use]
    pub fn tower_seat(world: &World, player: PlayerId) -> Option<CellCoord> {
        world.layout().seat(player)
    }

    /// Captures a read-only view of the grid and the unit arena.
    #[must_use]
    pub fn grid_view(world: &World) -> GridView<'_> {
        GridView::new(world.grid.tiles(), world.grid.size(), &world.units)
    }

    /// Looks up a unit by identifier.
    #[must_use]
    pub fn unit(world: &World, unit: UnitId) -> Option<&Unit> {
        world.units.get(&unit)
    }

    /// Living units in turn order: scan order of tiles, then tile insertion order.
    #[must_use]
    pub fn unit_turn_order(world: &World) -> Vec<UnitId> {
        world
            .grid
            .tiles()
            .iter()
            .flat_map(|tile| tile.units.iter().copied())
            .filter(|id| world.units.get(id).is_some_and(Unit::is_alive))
            .collect()
    }

    /// Buildings in scan order.
    #[must_use]
    pub fn buildings(world: &World) -> Vec<Building> {
        world
            .grid
            .tiles()
            .iter()
            .filter_map(|tile| tile.building)
            .collect()
    }

    /// Cells currently owned by `player`, in scan order.
    #[must_use]
    pub fn territory(world: &World, player: PlayerId) -> Vec<CellCoord> {
        world
            .grid
            .tiles()
            .iter()
            .filter(|tile| tile.owner.is(player))
            .map(|tile| tile.cell)
            .collect()
    }

    /// Projectiles in flight, in launch order.
    #[must_use]
    pub fn projectiles(world: &World) -> &[Projectile] {
        &world.projectiles
    }

    /// Captures the complete presentation snapshot of the world.
    #[must_use]
    pub fn snapshot(world: &World) -> WorldSnapshot {
        let tiles = world
            .grid
            .tiles()
            .iter()
            .map(|tile| TileSnapshot {
                cell: tile.cell,
                owner: tile.owner,
                building: tile.building,
                units: tile
                    .units
                    .iter()
                    .filter_map(|id| world.units.get(id).copied())
                    .collect(),
            })
            .collect();
        let players = PlayerId::ALL
            .into_iter()
            .map(|player| PlayerSnapshot {
                player,
                state: *world.player(player),
            })
            .collect();

        WorldSnapshot {
            mode: world.mode,
            phase: world.phase,
            countdown: world.countdown,
            winner: world.winner,
            grid_size: world.grid.size(),
            tiles,
            players,
            projectiles: world.projectiles.clone(),
            explosions: world.explosions.clone(),
            damage_numbers: world.damage_numbers.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_conquest_core::{
        AttackTarget, BuildingKind, CardKind, DeployError, Direction, Owner, SpellKind, StepError,
        UnitKind,
    };

    fn started(mode: GameMode) -> (World, Vec<Event>) {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::StartMatch {
                mode,
                ai_players: [false, true, true, true],
            },
            &mut events,
        );
        (world, events)
    }

    fn battle(mode: GameMode) -> World {
        let (mut world, _) = started(mode);
        world.phase = Phase::Battle;
        world.countdown = world.config.battle_seconds;
        world
    }

    fn place_unit(world: &mut World, kind: UnitKind, owner: PlayerId, cell: CellCoord) -> UnitId {
        let id = world.allocate_unit_id();
        let _ = world.units.insert(id, Unit::spawn(id, kind, owner, cell));
        if let Some(tile) = world.grid.tile_mut(cell) {
            tile.units.push(id);
        }
        id
    }

    fn run_tick_stages(world: &mut World, events: &mut Vec<Event>) {
        apply(world, Command::AdvanceProjectiles, events);
        apply(world, Command::DecayEffects, events);
        apply(world, Command::UpdateUnitStatus, events);
    }

    #[test]
    fn new_world_starts_in_menu() {
        let world = World::new();
        assert_eq!(query::phase(&world), Phase::Menu);
        assert_eq!(query::welcome_banner(&world), WELCOME_BANNER);
        assert!(query::alive_players(&world).is_empty());
    }

    #[test]
    fn starting_a_four_player_match_seeds_territories_and_towers() {
        let (world, events) = started(GameMode::FourPlayer);
        assert_eq!(query::phase(&world), Phase::Prep);
        assert_eq!(query::countdown(&world), 60);
        assert_eq!(
            events.first(),
            Some(&Event::MatchStarted {
                mode: GameMode::FourPlayer
            })
        );

        let view = query::grid_view(&world);
        assert_eq!(
            view.owner(CellCoord::new(12, 21)),
            Some(Owner::Player(PlayerId::One))
        );
        assert_eq!(view.owner(CellCoord::new(0, 0)), Some(Owner::Neutral));

        let towers: Vec<_> = query::buildings(&world)
            .into_iter()
            .filter(|building| building.is_main_tower)
            .collect();
        assert_eq!(towers.len(), 4);
        for tower in towers {
            assert_eq!(tower.hp, 300);
            assert_eq!(query::tower_seat(&world, tower.owner), Some(tower.cell));
        }
        for player in PlayerId::ALL {
            let state = query::player(&world, player);
            assert!(state.is_alive);
            assert_eq!(state.mana, 25);
        }
        assert!(!query::player(&world, PlayerId::One).is_ai);
    }

    #[test]
    fn duel_seats_only_two_players() {
        let (world, _) = started(GameMode::TwoPlayer);
        assert_eq!(
            query::alive_players(&world),
            vec![PlayerId::One, PlayerId::Two]
        );
        assert_eq!(query::buildings(&world).len(), 2);
        assert_eq!(
            query::tower_seat(&world, PlayerId::One),
            Some(CellCoord::new(12, 23))
        );
    }

    #[test]
    fn knight_kills_weak_enemy_and_corpse_is_purged_next_tick() {
        let mut world = battle(GameMode::FourPlayer);
        let knight = place_unit(&mut world, UnitKind::Knight, PlayerId::One, CellCoord::new(10, 10));
        let victim = place_unit(&mut world, UnitKind::Archer, PlayerId::Two, CellCoord::new(11, 10));
        if let Some(unit) = world.units.get_mut(&victim) {
            unit.hp = 20;
        }

        let mut events = Vec::new();
        run_tick_stages(&mut world, &mut events);
        apply(
            &mut world,
            Command::Attack {
                attacker: knight,
                target: AttackTarget::Unit(victim),
            },
            &mut events,
        );
        assert_eq!(world.units.get(&victim).map(|unit| unit.hp), Some(0));
        assert!(events.contains(&Event::UnitDied {
            unit: victim,
            cell: CellCoord::new(11, 10)
        }));
        assert_eq!(
            world.units.get(&knight).map(|unit| unit.cooldown),
            Some(tower_conquest_core::UNIT_ATTACK_COOLDOWN)
        );

        events.clear();
        run_tick_stages(&mut world, &mut events);
        assert!(!world.units.contains_key(&victim));
        assert!(query::grid_view(&world)
            .units_at(CellCoord::new(11, 10))
            .next()
            .is_none());
        assert!(events.contains(&Event::UnitRemoved { unit: victim }));
    }

    #[test]
    fn archer_launches_a_projectile_without_direct_damage() {
        let mut world = battle(GameMode::FourPlayer);
        let archer = place_unit(&mut world, UnitKind::Archer, PlayerId::One, CellCoord::new(8, 10));
        let target = place_unit(&mut world, UnitKind::Giant, PlayerId::Three, CellCoord::new(11, 10));

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Attack {
                attacker: archer,
                target: AttackTarget::Unit(target),
            },
            &mut events,
        );
        assert_eq!(query::projectiles(&world).len(), 1);
        assert_eq!(world.units.get(&target).map(|unit| unit.hp), Some(300));

        let mut ticks = 0;
        while !query::projectiles(&world).is_empty() {
            run_tick_stages(&mut world, &mut events);
            ticks += 1;
            assert!(ticks < 50, "projectile never arrived");
        }
        assert_eq!(world.units.get(&target).map(|unit| unit.hp), Some(275));
        assert!(ticks > 1);
    }

    #[test]
    fn freeze_debits_mana_and_freezes_enemies_in_radius() {
        let mut world = battle(GameMode::FourPlayer);
        world.players[PlayerId::One.index()].mana = 5;
        let center = CellCoord::new(12, 18);
        let near = place_unit(&mut world, UnitKind::Knight, PlayerId::Two, CellCoord::new(14, 16));
        let far = place_unit(&mut world, UnitKind::Knight, PlayerId::Two, CellCoord::new(15, 18));
        let friend = place_unit(&mut world, UnitKind::Knight, PlayerId::One, CellCoord::new(12, 17));

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::DeployCard {
                player: PlayerId::One,
                card: CardKind::Spell(SpellKind::Freeze),
                cell: center,
            },
            &mut events,
        );

        assert_eq!(query::player(&world, PlayerId::One).mana, 2);
        assert_eq!(world.units.get(&near).map(|unit| unit.frozen), Some(40));
        assert_eq!(world.units.get(&far).map(|unit| unit.frozen), Some(0));
        assert_eq!(world.units.get(&friend).map(|unit| unit.frozen), Some(0));
    }

    #[test]
    fn unaffordable_spell_has_no_effect() {
        let mut world = battle(GameMode::FourPlayer);
        world.players[PlayerId::One.index()].mana = 3;
        let enemy = place_unit(&mut world, UnitKind::Knight, PlayerId::Two, CellCoord::new(12, 18));

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::DeployCard {
                player: PlayerId::One,
                card: CardKind::Spell(SpellKind::Fireball),
                cell: CellCoord::new(12, 18),
            },
            &mut events,
        );

        assert_eq!(query::player(&world, PlayerId::One).mana, 3);
        assert_eq!(world.units.get(&enemy).map(|unit| unit.hp), Some(120));
        assert!(matches!(
            events.as_slice(),
            [Event::DeployRejected {
                reason: DeployError::InsufficientMana,
                ..
            }]
        ));
    }

    #[test]
    fn deploys_are_rejected_outside_owned_territory_and_on_buildings() {
        let (mut world, _) = started(GameMode::FourPlayer);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::DeployCard {
                player: PlayerId::One,
                card: CardKind::Unit(UnitKind::Knight),
                cell: CellCoord::new(0, 0),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::DeployCard {
                player: PlayerId::One,
                card: CardKind::Building(BuildingKind::Wall),
                cell: CellCoord::new(12, 21),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::DeployCard {
                player: PlayerId::One,
                card: CardKind::Unit(UnitKind::Knight),
                cell: CellCoord::new(40, 0),
            },
            &mut events,
        );

        let reasons: Vec<_> = events
            .iter()
            .filter_map(|event| match event {
                Event::DeployRejected { reason, .. } => Some(*reason),
                _ => None,
            })
            .collect();
        assert_eq!(
            reasons,
            vec![
                DeployError::NotOwnedTerritory,
                DeployError::TileHasBuilding,
                DeployError::OutOfBounds
            ]
        );
        assert_eq!(query::player(&world, PlayerId::One).mana, 25);
    }

    #[test]
    fn deploying_in_menu_is_rejected() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::DeployCard {
                player: PlayerId::One,
                card: CardKind::Unit(UnitKind::Knight),
                cell: CellCoord::new(12, 21),
            },
            &mut events,
        );
        assert!(matches!(
            events.as_slice(),
            [Event::DeployRejected {
                reason: DeployError::InvalidPhase,
                ..
            }]
        ));
    }

    #[test]
    fn main_tower_destruction_conquers_territory_in_the_same_tick() {
        let mut world = battle(GameMode::FourPlayer);
        let seat = CellCoord::new(2, 12);
        let giant = place_unit(&mut world, UnitKind::Giant, PlayerId::One, CellCoord::new(3, 12));
        let tower = world
            .grid
            .tile(seat)
            .and_then(|tile| tile.building)
            .map(|building| building.id)
            .expect("player two main tower");
        if let Some(building) = world.building_mut(tower) {
            building.hp = 50;
        }
        let defeated_tiles = query::territory(&world, PlayerId::Two);
        let third_party = query::territory(&world, PlayerId::Three);

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Attack {
                attacker: giant,
                target: AttackTarget::Building(tower),
            },
            &mut events,
        );
        assert_eq!(query::player(&world, PlayerId::Two).hp, 0);
        apply(&mut world, Command::ResolveEliminations, &mut events);

        assert!(!query::player(&world, PlayerId::Two).is_alive);
        assert!(query::territory(&world, PlayerId::Two).is_empty());
        let conqueror = query::territory(&world, PlayerId::One);
        assert!(defeated_tiles.iter().all(|cell| conqueror.contains(cell)));
        assert_eq!(query::territory(&world, PlayerId::Three), third_party);
        assert!(events.contains(&Event::PlayerEliminated {
            player: PlayerId::Two,
            conqueror: PlayerId::One
        }));

        events.clear();
        apply(&mut world, Command::ResolveEliminations, &mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn steps_respect_buildings_and_occupancy() {
        let mut world = battle(GameMode::FourPlayer);
        let mover = place_unit(&mut world, UnitKind::Archer, PlayerId::One, CellCoord::new(12, 20));
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::StepUnit {
                unit: mover,
                direction: Direction::South,
            },
            &mut events,
        );
        assert_eq!(
            events.last(),
            Some(&Event::UnitStepRejected {
                unit: mover,
                reason: StepError::Blocked
            })
        );

        for _ in 0..3 {
            let _ = place_unit(&mut world, UnitKind::Knight, PlayerId::One, CellCoord::new(12, 19));
        }
        apply(
            &mut world,
            Command::StepUnit {
                unit: mover,
                direction: Direction::North,
            },
            &mut events,
        );
        assert_eq!(
            events.last(),
            Some(&Event::UnitStepRejected {
                unit: mover,
                reason: StepError::TileFull
            })
        );

        apply(
            &mut world,
            Command::StepUnit {
                unit: mover,
                direction: Direction::East,
            },
            &mut events,
        );
        assert_eq!(
            events.last(),
            Some(&Event::UnitAdvanced {
                unit: mover,
                from: CellCoord::new(12, 20),
                to: CellCoord::new(13, 20)
            })
        );
        assert_eq!(
            world.units.get(&mover).map(|unit| unit.move_cooldown),
            Some(UnitKind::Archer.archetype().move_delay)
        );
    }

    #[test]
    fn frozen_units_neither_attack_nor_move() {
        let mut world = battle(GameMode::FourPlayer);
        let knight = place_unit(&mut world, UnitKind::Knight, PlayerId::One, CellCoord::new(10, 10));
        let enemy = place_unit(&mut world, UnitKind::Knight, PlayerId::Two, CellCoord::new(11, 10));
        if let Some(unit) = world.units.get_mut(&knight) {
            unit.frozen = 2;
        }

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Attack {
                attacker: knight,
                target: AttackTarget::Unit(enemy),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::StepUnit {
                unit: knight,
                direction: Direction::North,
            },
            &mut events,
        );
        assert_eq!(world.units.get(&enemy).map(|unit| unit.hp), Some(120));
        assert_eq!(
            world.units.get(&knight).map(|unit| unit.cell),
            Some(CellCoord::new(10, 10))
        );

        run_tick_stages(&mut world, &mut events);
        assert_eq!(world.units.get(&knight).map(|unit| unit.frozen), Some(1));
    }

    #[test]
    fn mana_regeneration_is_capped() {
        let mut world = battle(GameMode::TwoPlayer);
        world.players[PlayerId::Two.index()].mana = 24;
        let mut events = Vec::new();
        for _ in 0..5 {
            apply(&mut world, Command::RegenerateMana, &mut events);
        }
        for player in PlayerId::ALL {
            assert_eq!(query::player(&world, player).mana, 25);
        }
    }

    #[test]
    fn phase_clock_moves_from_prep_to_battle_to_result() {
        let (mut world, _) = started(GameMode::TwoPlayer);
        let mut events = Vec::new();
        for _ in 0..60 {
            apply(&mut world, Command::AdvancePhaseClock, &mut events);
        }
        assert_eq!(query::phase(&world), Phase::Battle);
        assert_eq!(query::countdown(&world), 240);

        world.players[PlayerId::Two.index()].hp = 120;
        for _ in 0..240 {
            apply(&mut world, Command::AdvancePhaseClock, &mut events);
        }
        assert_eq!(query::phase(&world), Phase::Result);
        assert_eq!(query::winner(&world), Some(Winner::Player(PlayerId::One)));

        events.clear();
        apply(&mut world, Command::ReturnToMenu, &mut events);
        assert_eq!(query::phase(&world), Phase::Menu);
        assert_eq!(events, vec![Event::ReturnedToMenu]);
        assert!(query::grid_view(&world).tile(CellCoord::new(0, 0)).is_none());
    }

    #[test]
    fn equal_hit_points_at_timeout_is_a_tie() {
        let mut world = battle(GameMode::FourPlayer);
        world.countdown = 1;
        world.players[PlayerId::Three.index()].hp = 120;
        let mut events = Vec::new();
        apply(&mut world, Command::AdvancePhaseClock, &mut events);
        assert_eq!(query::winner(&world), Some(Winner::Tie));
    }

    #[test]
    fn last_player_standing_wins() {
        let mut world = battle(GameMode::TwoPlayer);
        world.players[PlayerId::Two.index()].is_alive = false;
        let mut events = Vec::new();
        apply(&mut world, Command::CheckVictory, &mut events);
        assert_eq!(query::phase(&world), Phase::Result);
        assert!(events.contains(&Event::MatchEnded {
            winner: Winner::Player(PlayerId::One)
        }));
    }

    #[test]
    fn snapshot_mirrors_grid_and_players() {
        let (world, _) = started(GameMode::FourPlayer);
        let snapshot = query::snapshot(&world);
        assert_eq!(snapshot.grid_size, 24);
        assert_eq!(snapshot.tiles.len(), 24 * 24);
        assert_eq!(snapshot.players.len(), 4);
        assert_eq!(snapshot.buildings().count(), 4);
        assert_eq!(
            snapshot
                .tile(CellCoord::new(21, 12))
                .and_then(|tile| tile.building)
                .map(|building| building.owner),
            Some(PlayerId::Four)
        );
    }
}
