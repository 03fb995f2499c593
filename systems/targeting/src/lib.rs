#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that decides what a single unit does on its turn.
//!
//! Each unit considers, in priority order, healing a damaged ally, attacking
//! the first enemy inside its reach and finally stepping one tile towards its
//! manual destination or the closest enemy main tower. At most one command is
//! emitted per unit per turn; the world validates and applies it before the
//! next unit is planned so later units observe earlier moves.

use tower_conquest_core::{
    AttackTarget, Building, CellCoord, Command, Direction, GridView, Seat, Unit, UnitId,
};

/// Per-unit decision maker.
#[derive(Debug, Default)]
pub struct UnitPlanner {
    scan: Vec<CellCoord>,
}

impl UnitPlanner {
    /// Creates a planner with an empty scan buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Plans the turn of `unit` against the current grid.
    ///
    /// `seats` lists the main towers of players still in the match. Nothing is
    /// emitted for dead, frozen or cooling units, nor when no action applies.
    pub fn handle(
        &mut self,
        view: &GridView<'_>,
        unit: UnitId,
        seats: &[Seat],
        out: &mut Vec<Command>,
    ) {
        let Some(unit) = view.unit(unit) else {
            return;
        };
        if !unit.is_alive() || unit.frozen > 0 || unit.cooldown > 0 {
            return;
        }

        let archetype = unit.kind.archetype();
        self.scan.clear();
        self.scan
            .extend(unit.cell.neighborhood(archetype.range, view.size()));

        if unit.kind.is_healer() && unit.heal_cooldown == 0 {
            if let Some(patient) = self.find_patient(view, unit) {
                out.push(Command::HealUnit {
                    healer: unit.id,
                    target: patient,
                });
                return;
            }
        }

        if archetype.damage > 0 {
            if let Some(target) = self.find_target(view, unit) {
                out.push(Command::Attack {
                    attacker: unit.id,
                    target,
                });
                return;
            }
        }

        if unit.move_cooldown > 0 {
            return;
        }
        if let Some(direction) = next_step(unit, seats) {
            out.push(Command::StepUnit {
                unit: unit.id,
                direction,
            });
        }
    }

    fn find_patient(&self, view: &GridView<'_>, healer: &Unit) -> Option<UnitId> {
        self.scan.iter().find_map(|cell| {
            view.units_at(*cell)
                .find(|ally| {
                    ally.id != healer.id && ally.owner == healer.owner && ally.is_damaged()
                })
                .map(|ally| ally.id)
        })
    }

    /// First living enemy unit in scan order, otherwise the first enemy building.
    fn find_target(&self, view: &GridView<'_>, attacker: &Unit) -> Option<AttackTarget> {
        let enemy_unit = self.scan.iter().find_map(|cell| {
            view.units_at(*cell)
                .find(|other| other.owner != attacker.owner && other.is_alive())
        });
        if let Some(enemy) = enemy_unit {
            return Some(AttackTarget::Unit(enemy.id));
        }

        self.scan
            .iter()
            .filter_map(|cell| view.building_at(*cell))
            .find(|building| is_hostile(building, attacker))
            .map(|building| AttackTarget::Building(building.id))
    }
}

fn is_hostile(building: &Building, attacker: &Unit) -> bool {
    building.owner != attacker.owner && !building.is_destroyed()
}

/// Greedy single-axis step towards the destination or the closest enemy tower.
fn next_step(unit: &Unit, seats: &[Seat]) -> Option<Direction> {
    let goal = unit
        .destination
        .filter(|destination| *destination != unit.cell)
        .or_else(|| nearest_enemy_tower(unit, seats))?;

    let dx = i64::from(goal.column()) - i64::from(unit.cell.column());
    let dy = i64::from(goal.row()) - i64::from(unit.cell.row());
    if dx.abs() > dy.abs() {
        Some(if dx > 0 {
            Direction::East
        } else {
            Direction::West
        })
    } else if dy != 0 {
        Some(if dy > 0 {
            Direction::South
        } else {
            Direction::North
        })
    } else {
        None
    }
}

/// Ties keep the earliest seat.
fn nearest_enemy_tower(unit: &Unit, seats: &[Seat]) -> Option<CellCoord> {
    let mut best: Option<(f32, CellCoord)> = None;
    for seat in seats.iter().filter(|seat| seat.player != unit.owner) {
        let distance = unit.cell.euclidean_distance(seat.tower);
        if best.map_or(true, |(closest, _)| distance < closest) {
            best = Some((distance, seat.tower));
        }
    }
    best.map(|(_, tower)| tower)
}
