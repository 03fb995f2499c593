#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that aims armed buildings at the closest hostile cell.

use tower_conquest_core::{Building, BuildingTarget, CellCoord, GridView, Phase};

/// Building targeting system that reuses a scratch buffer of ready buildings.
#[derive(Debug, Default)]
pub struct BuildingTargeting {
    ready: Vec<Building>,
}

impl BuildingTargeting {
    /// Creates a new building targeting system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes an aim for every armed building whose cooldown has elapsed.
    ///
    /// The output buffer is cleared before populating it. Buildings appear in
    /// scan order; a `None` cell means the building found nothing in range.
    pub fn handle(&mut self, phase: Phase, view: &GridView<'_>, out: &mut Vec<BuildingTarget>) {
        out.clear();

        if phase != Phase::Battle {
            return;
        }

        self.ready.clear();
        self.ready.extend(view.buildings().copied().filter(|building| {
            building.kind.archetype().damage > 0
                && building.cooldown == 0
                && !building.is_destroyed()
        }));

        for building in &self.ready {
            out.push(BuildingTarget {
                building: building.id,
                origin: building.cell,
                cell: closest_hostile_cell(view, building),
            });
        }
    }
}

/// Closest cell holding a living enemy unit within the building's range band.
///
/// Equidistant candidates resolve to the first one in scan order.
fn closest_hostile_cell(view: &GridView<'_>, building: &Building) -> Option<CellCoord> {
    let archetype = building.kind.archetype();
    let max_range = archetype.range as f32;
    let min_range = archetype.min_range as f32;

    let mut best: Option<(f32, CellCoord)> = None;
    for cell in building.cell.neighborhood(archetype.range, view.size()) {
        let distance = building.cell.euclidean_distance(cell);
        if distance > max_range || distance < min_range {
            continue;
        }
        if !view.has_enemy_unit(cell, building.owner) {
            continue;
        }
        if best.map_or(true, |(closest, _)| distance < closest) {
            best = Some((distance, cell));
        }
    }
    best.map(|(_, cell)| cell)
}
