//! Card plays: unit deployment, construction and spell casting.

use glam::Vec2;
use log::{debug, info};
use tower_conquest_core::{
    Building, BuildingKind, CardKind, CellCoord, DeployError, Event, Explosion, PlayerId,
    SpellEffect, SpellKind, Unit, UnitKind,
};

use crate::World;

const SPELL_BLAST_SCALE: f32 = 1.5;
const SPELL_HEAL_DRIFT: Vec2 = Vec2::new(0.0, -0.03);

impl World {
    /// Plays `card` for `player` at `cell`, debiting mana only when every check passes.
    pub(crate) fn deploy_card(
        &mut self,
        player: PlayerId,
        card: CardKind,
        cell: CellCoord,
        out_events: &mut Vec<Event>,
    ) {
        if let Err(reason) = self.validate_deploy(player, card, cell) {
            debug!("{player} could not play {card} at {cell:?}: {reason}");
            out_events.push(Event::DeployRejected {
                player,
                card,
                cell,
                reason,
            });
            return;
        }

        let state = self.player_mut(player);
        state.mana -= card.cost();

        match card {
            CardKind::Unit(kind) => self.spawn_unit(player, kind, cell, out_events),
            CardKind::Building(kind) => self.construct(player, kind, cell, out_events),
            CardKind::Spell(spell) => self.cast(player, spell, cell, out_events),
        }
    }

    fn validate_deploy(
        &self,
        player: PlayerId,
        card: CardKind,
        cell: CellCoord,
    ) -> Result<(), DeployError> {
        if !self.phase.allows_deployment() {
            return Err(DeployError::InvalidPhase);
        }
        let state = self.player(player);
        if !state.is_alive {
            return Err(DeployError::PlayerEliminated);
        }
        let tile = self.grid.tile(cell).ok_or(DeployError::OutOfBounds)?;
        if !tile.owner.is(player) {
            return Err(DeployError::NotOwnedTerritory);
        }
        if state.mana < card.cost() {
            return Err(DeployError::InsufficientMana);
        }
        if matches!(card, CardKind::Building(_)) && tile.building.is_some() {
            return Err(DeployError::TileHasBuilding);
        }
        Ok(())
    }

    fn spawn_unit(
        &mut self,
        owner: PlayerId,
        kind: UnitKind,
        cell: CellCoord,
        out_events: &mut Vec<Event>,
    ) {
        let id = self.allocate_unit_id();
        let _ = self.units.insert(id, Unit::spawn(id, kind, owner, cell));
        if let Some(tile) = self.grid.tile_mut(cell) {
            tile.units.push(id);
        }
        out_events.push(Event::UnitDeployed {
            unit: id,
            kind,
            owner,
            cell,
        });
    }

    fn construct(
        &mut self,
        owner: PlayerId,
        kind: BuildingKind,
        cell: CellCoord,
        out_events: &mut Vec<Event>,
    ) {
        let id = self.allocate_building_id();
        if let Some(tile) = self.grid.tile_mut(cell) {
            tile.building = Some(Building::construct(id, kind, owner, cell));
        }
        let _ = self.building_cells.insert(id, cell);
        out_events.push(Event::BuildingPlaced {
            building: id,
            kind,
            owner,
            cell,
        });
    }

    /// Applies a spell to the square neighbourhood around `cell` in one pass.
    fn cast(
        &mut self,
        caster: PlayerId,
        spell: SpellKind,
        cell: CellCoord,
        out_events: &mut Vec<Event>,
    ) {
        let archetype = spell.archetype();
        info!("{caster} cast {} at {cell:?}", archetype.name);
        out_events.push(Event::SpellCast {
            caster,
            spell,
            cell,
        });
        self.explosions.push(Explosion {
            position: cell.to_vec2(),
            radius: 0.0,
            max_radius: archetype.radius as f32 * SPELL_BLAST_SCALE,
            opacity: 1.0,
            color: archetype.color,
        });

        for target in cell.neighborhood(archetype.radius, self.grid.size()) {
            match archetype.effect {
                SpellEffect::Damage(amount) => {
                    for id in self.units_on(target, |unit| unit.owner != caster) {
                        self.damage_unit(id, amount, out_events);
                    }
                    self.damage_building(target, amount, caster, out_events);
                }
                SpellEffect::Freeze(ticks) => {
                    for id in self.units_on(target, |unit| unit.owner != caster) {
                        if let Some(unit) = self.units.get_mut(&id) {
                            unit.frozen = ticks;
                            out_events.push(Event::UnitFrozen { unit: id, ticks });
                        }
                    }
                }
                SpellEffect::Heal(amount) => {
                    for id in self.units_on(target, |unit| unit.owner == caster) {
                        self.restore_unit(id, amount, SPELL_HEAL_DRIFT, out_events);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tower_conquest_core::{Command, GameMode, Phase};

    use super::*;
    use crate::{apply, query};

    fn battle() -> World {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::StartMatch {
                mode: GameMode::FourPlayer,
                ai_players: [false, true, true, true],
            },
            &mut events,
        );
        world.phase = Phase::Battle;
        world
    }

    #[test]
    fn unit_deploy_debits_mana_and_spawns_at_full_health() {
        let mut world = battle();
        let mut events = Vec::new();
        let cell = CellCoord::new(12, 19);
        world.deploy_card(
            PlayerId::One,
            CardKind::Unit(UnitKind::Wizard),
            cell,
            &mut events,
        );

        assert_eq!(query::player(&world, PlayerId::One).mana, 21);
        let units: Vec<_> = query::grid_view(&world).units_at(cell).copied().collect();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].hp, 90);
        assert_eq!(units[0].owner, PlayerId::One);
    }

    #[test]
    fn building_deploy_occupies_the_tile() {
        let mut world = battle();
        let mut events = Vec::new();
        let cell = CellCoord::new(11, 20);
        world.deploy_card(
            PlayerId::One,
            CardKind::Building(BuildingKind::Tesla),
            cell,
            &mut events,
        );
        world.deploy_card(
            PlayerId::One,
            CardKind::Building(BuildingKind::Wall),
            cell,
            &mut events,
        );

        let building = query::grid_view(&world).building_at(cell).copied();
        assert_eq!(building.map(|building| building.kind), Some(BuildingKind::Tesla));
        assert_eq!(query::player(&world, PlayerId::One).mana, 21);
        assert!(matches!(
            events.last(),
            Some(Event::DeployRejected {
                reason: DeployError::TileHasBuilding,
                ..
            })
        ));
    }

    #[test]
    fn heal_spell_restores_friends_only() {
        let mut world = battle();
        let mut events = Vec::new();
        let cell = CellCoord::new(12, 19);
        world.deploy_card(PlayerId::One, CardKind::Unit(UnitKind::Giant), cell, &mut events);
        let giant = query::grid_view(&world)
            .units_at(cell)
            .map(|unit| unit.id)
            .next()
            .expect("giant deployed");
        if let Some(unit) = world.units.get_mut(&giant) {
            unit.hp = 100;
        }

        world.deploy_card(
            PlayerId::One,
            CardKind::Spell(SpellKind::Heal),
            CellCoord::new(13, 20),
            &mut events,
        );
        assert_eq!(world.units.get(&giant).map(|unit| unit.hp), Some(180));
        assert_eq!(query::player(&world, PlayerId::One).mana, 25 - 6 - 2);
    }

    #[test]
    fn fireball_hits_enemies_and_spares_friendly_structures() {
        let mut world = battle();
        let intruder_cell = CellCoord::new(3, 13);
        let intruder = world.allocate_unit_id();
        let _ = world.units.insert(
            intruder,
            Unit::spawn(intruder, UnitKind::Giant, PlayerId::One, intruder_cell),
        );
        if let Some(tile) = world.grid.tile_mut(intruder_cell) {
            tile.units.push(intruder);
        }

        let mut events = Vec::new();
        world.deploy_card(
            PlayerId::Two,
            CardKind::Spell(SpellKind::Fireball),
            CellCoord::new(2, 14),
            &mut events,
        );

        assert_eq!(world.units.get(&intruder).map(|unit| unit.hp), Some(200));
        let tower = query::grid_view(&world)
            .building_at(CellCoord::new(2, 12))
            .copied()
            .expect("player two tower");
        assert_eq!(tower.hp, 300);
        assert_eq!(query::player(&world, PlayerId::Two).mana, 21);
    }

    #[test]
    fn eliminated_players_cannot_deploy() {
        let mut world = battle();
        world.players[PlayerId::Three.index()].is_alive = false;
        let mut events = Vec::new();
        world.deploy_card(
            PlayerId::Three,
            CardKind::Unit(UnitKind::Knight),
            CellCoord::new(12, 2),
            &mut events,
        );
        assert!(matches!(
            events.as_slice(),
            [Event::DeployRejected {
                reason: DeployError::PlayerEliminated,
                ..
            }]
        ));
    }
}
