//! Damage, healing and launch rules shared by units, buildings and spells.

use glam::Vec2;
use log::info;
use tower_conquest_core::{
    AttackTarget, BuildingId, CellCoord, DamageNumber, Event, PlayerId, Projectile,
    ProjectileSource, Unit, UnitId, BUILDING_SHOT_PROGRESS, HEALER_PULSE_AMOUNT,
    HEALER_PULSE_COOLDOWN, UNIT_ATTACK_COOLDOWN, UNIT_SHOT_PROGRESS, UNIT_SHOT_VELOCITY,
    UNIT_SIEGE_SHOT_VELOCITY,
};

use crate::World;

const UNIT_DAMAGE_DRIFT: Vec2 = Vec2::new(0.0, -0.03);
const BUILDING_DAMAGE_DRIFT: Vec2 = Vec2::new(0.0, -0.04);
const HEAL_DRIFT: Vec2 = Vec2::new(0.0, -0.02);

/// Launch parameters of a single projectile.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Shot {
    pub(crate) from: CellCoord,
    pub(crate) to: CellCoord,
    pub(crate) velocity_scale: f32,
    pub(crate) speed: f32,
    pub(crate) damage: u32,
    pub(crate) owner: PlayerId,
    pub(crate) source: ProjectileSource,
}

impl World {
    /// Identifiers of living units on `cell` that satisfy `predicate`, in insertion order.
    pub(crate) fn units_on<F>(&self, cell: CellCoord, predicate: F) -> Vec<UnitId>
    where
        F: Fn(&Unit) -> bool,
    {
        let Some(tile) = self.grid.tile(cell) else {
            return Vec::new();
        };
        tile.units
            .iter()
            .copied()
            .filter(|id| {
                self.units
                    .get(id)
                    .is_some_and(|unit| unit.is_alive() && predicate(unit))
            })
            .collect()
    }

    /// Subtracts hit points from a living unit, saturating at zero.
    pub(crate) fn damage_unit(&mut self, id: UnitId, amount: u32, out_events: &mut Vec<Event>) {
        let Some(unit) = self.units.get_mut(&id) else {
            return;
        };
        if !unit.is_alive() {
            return;
        }
        unit.hp = unit.hp.saturating_sub(amount);
        unit.last_damage = Some(amount);
        let (hp, cell) = (unit.hp, unit.cell);

        out_events.push(Event::UnitDamaged {
            unit: id,
            amount,
            hp,
        });
        self.spawn_number(cell, amount, UNIT_DAMAGE_DRIFT, false);
        if hp == 0 {
            out_events.push(Event::UnitDied { unit: id, cell });
        }
    }

    /// Subtracts hit points from an enemy building on `cell`.
    ///
    /// Damage to a main tower is mirrored into its owner's hit points, and the
    /// blow that takes it to zero queues the owner's elimination in favour of
    /// `attacker`.
    pub(crate) fn damage_building(
        &mut self,
        cell: CellCoord,
        amount: u32,
        attacker: PlayerId,
        out_events: &mut Vec<Event>,
    ) {
        let Some(building) = self
            .grid
            .tile_mut(cell)
            .and_then(|tile| tile.building.as_mut())
        else {
            return;
        };
        if building.owner == attacker || building.is_destroyed() {
            return;
        }

        let before = building.hp;
        building.hp = building.hp.saturating_sub(amount);
        let damaged = *building;

        out_events.push(Event::BuildingDamaged {
            building: damaged.id,
            amount,
            hp: damaged.hp,
        });
        self.spawn_number(cell, amount, BUILDING_DAMAGE_DRIFT, false);

        if damaged.is_main_tower {
            self.player_mut(damaged.owner).hp = damaged.hp;
            if before > 0 && damaged.hp == 0 {
                info!(
                    "main tower of {} destroyed by {}",
                    damaged.owner, attacker
                );
                self.pending_eliminations.push((damaged.owner, attacker));
            }
        }
    }

    /// Restores hit points to a living unit, capped at its maximum.
    pub(crate) fn restore_unit(
        &mut self,
        id: UnitId,
        amount: u32,
        drift: Vec2,
        out_events: &mut Vec<Event>,
    ) {
        let Some(unit) = self.units.get_mut(&id) else {
            return;
        };
        if !unit.is_alive() {
            return;
        }
        let before = unit.hp;
        unit.hp = unit.hp.saturating_add(amount).min(unit.max_hp);
        let (hp, cell) = (unit.hp, unit.cell);

        out_events.push(Event::UnitHealed {
            unit: id,
            amount: hp - before,
            hp,
        });
        self.spawn_number(cell, amount, drift, true);
    }

    pub(crate) fn heal_unit(&mut self, healer: UnitId, target: UnitId, out_events: &mut Vec<Event>) {
        let Some(source) = self.units.get(&healer).copied() else {
            return;
        };
        if !source.kind.is_healer()
            || !source.is_alive()
            || source.frozen > 0
            || source.cooldown > 0
            || source.heal_cooldown > 0
        {
            return;
        }
        let Some(patient) = self.units.get(&target) else {
            return;
        };
        let in_reach =
            patient.cell.chebyshev_distance(source.cell) <= source.kind.archetype().range;
        if target == healer || patient.owner != source.owner || !patient.is_damaged() || !in_reach {
            return;
        }

        self.restore_unit(target, HEALER_PULSE_AMOUNT, HEAL_DRIFT, out_events);
        if let Some(unit) = self.units.get_mut(&healer) {
            unit.heal_cooldown = HEALER_PULSE_COOLDOWN;
        }
    }

    /// Resolves a unit attack: melee hits land at once, ranged attacks launch a projectile.
    pub(crate) fn attack(
        &mut self,
        attacker: UnitId,
        target: AttackTarget,
        out_events: &mut Vec<Event>,
    ) {
        let Some(unit) = self.units.get(&attacker).copied() else {
            return;
        };
        let archetype = unit.kind.archetype();
        if !unit.is_alive() || unit.frozen > 0 || unit.cooldown > 0 || archetype.damage == 0 {
            return;
        }

        let target_cell = match target {
            AttackTarget::Unit(id) => match self.units.get(&id) {
                Some(enemy) if enemy.is_alive() && enemy.owner != unit.owner => enemy.cell,
                _ => return,
            },
            AttackTarget::Building(id) => match self.building(id) {
                Some(building) if !building.is_destroyed() && building.owner != unit.owner => {
                    building.cell
                }
                _ => return,
            },
        };
        if unit.cell.chebyshev_distance(target_cell) > archetype.range {
            return;
        }

        if archetype.range > 1 {
            let velocity_scale = match target {
                AttackTarget::Unit(_) => UNIT_SHOT_VELOCITY,
                AttackTarget::Building(_) => UNIT_SIEGE_SHOT_VELOCITY,
            };
            self.launch(
                Shot {
                    from: unit.cell,
                    to: target_cell,
                    velocity_scale,
                    speed: UNIT_SHOT_PROGRESS,
                    damage: archetype.damage,
                    owner: unit.owner,
                    source: ProjectileSource::Unit(unit.kind),
                },
                out_events,
            );
        } else {
            match target {
                AttackTarget::Unit(id) => self.damage_unit(id, archetype.damage, out_events),
                AttackTarget::Building(_) => {
                    self.damage_building(target_cell, archetype.damage, unit.owner, out_events);
                }
            }
        }

        if let Some(unit) = self.units.get_mut(&attacker) {
            unit.cooldown = UNIT_ATTACK_COOLDOWN;
        }
    }

    pub(crate) fn charge_building(
        &mut self,
        id: BuildingId,
        target: CellCoord,
        out_events: &mut Vec<Event>,
    ) {
        let Some(building) = self.building_mut(id) else {
            return;
        };
        if building.is_destroyed() || building.cooldown > 0 {
            return;
        }
        building.target = Some(target);
        building.charging = building.charging.saturating_add(1);
        out_events.push(Event::BuildingCharging {
            building: id,
            charge: building.charging,
        });
    }

    pub(crate) fn fire_building(
        &mut self,
        id: BuildingId,
        target: CellCoord,
        out_events: &mut Vec<Event>,
    ) {
        let Some(building) = self.building_mut(id) else {
            return;
        };
        let archetype = building.kind.archetype();
        if building.is_destroyed() || building.cooldown > 0 || archetype.damage == 0 {
            return;
        }
        building.target = Some(target);
        building.charging = 0;
        building.cooldown = archetype.attack_speed;
        let (from, owner, kind) = (building.cell, building.owner, building.kind);

        self.launch(
            Shot {
                from,
                to: target,
                velocity_scale: archetype.shot_velocity,
                speed: BUILDING_SHOT_PROGRESS,
                damage: archetype.damage,
                owner,
                source: ProjectileSource::Building(kind),
            },
            out_events,
        );
    }

    pub(crate) fn clear_building_target(&mut self, id: BuildingId) {
        if let Some(building) = self.building_mut(id) {
            building.target = None;
            building.charging = 0;
        }
    }

    pub(crate) fn cool_down_buildings(&mut self) {
        let speed = self.config.game_speed;
        for tile in self.grid.tiles_mut() {
            if let Some(building) = tile.building.as_mut() {
                building.cooldown = building.cooldown.saturating_sub(speed);
            }
        }
    }

    pub(crate) fn purge_destroyed_buildings(&mut self, out_events: &mut Vec<Event>) {
        let mut destroyed = Vec::new();
        for tile in self.grid.tiles_mut() {
            if tile.building.is_some_and(|building| building.is_destroyed()) {
                if let Some(building) = tile.building.take() {
                    destroyed.push((building.id, tile.cell));
                }
            }
        }
        for (building, cell) in destroyed {
            let _ = self.building_cells.remove(&building);
            out_events.push(Event::BuildingDestroyed { building, cell });
        }
    }

    fn launch(&mut self, shot: Shot, out_events: &mut Vec<Event>) {
        let id = self.allocate_projectile_id();
        let origin = shot.from.to_vec2();
        let destination = shot.to.to_vec2();
        self.projectiles.push(Projectile {
            id,
            from: origin,
            to: destination,
            position: origin,
            velocity: (destination - origin) * shot.velocity_scale,
            progress: 0.0,
            speed: shot.speed,
            damage: shot.damage,
            owner: shot.owner,
            source: shot.source,
            trail: Vec::new(),
        });
        out_events.push(Event::ProjectileLaunched {
            projectile: id,
            owner: shot.owner,
            from: shot.from,
            to: shot.to,
        });
    }

    pub(crate) fn spawn_number(&mut self, cell: CellCoord, amount: u32, drift: Vec2, is_healing: bool) {
        self.damage_numbers.push(DamageNumber {
            position: cell.to_vec2(),
            velocity: drift,
            amount,
            opacity: 1.0,
            is_healing,
        });
    }
}
