#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns building aims into charge, fire and clear commands.

use tower_conquest_core::{BuildingTarget, Command, GridView, Phase};

/// Building combat system that queues commands for ready buildings.
#[derive(Debug, Default)]
pub struct BuildingCombat {
    scratch: Vec<Command>,
}

impl BuildingCombat {
    /// Creates a new building combat system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits commands for every aimed building that is still standing and ready.
    ///
    /// Artillery with a wind-up charges until the final charge, which fires in
    /// the same tick. Buildings without a target drop their aim and charge.
    pub fn handle(
        &mut self,
        phase: Phase,
        view: &GridView<'_>,
        targets: &[BuildingTarget],
        out: &mut Vec<Command>,
    ) {
        if phase != Phase::Battle || targets.is_empty() {
            return;
        }

        self.scratch.clear();

        for aim in targets {
            let Some(building) = view
                .building_at(aim.origin)
                .filter(|building| building.id == aim.building)
            else {
                continue;
            };
            if building.cooldown > 0 || building.is_destroyed() {
                continue;
            }

            let command = match aim.cell {
                None => Command::ClearBuildingTarget {
                    building: building.id,
                },
                Some(target) => {
                    let wind_up = building.kind.archetype().wind_up;
                    if wind_up > 0 && building.charging + 1 < wind_up {
                        Command::ChargeBuilding {
                            building: building.id,
                            target,
                        }
                    } else {
                        Command::FireBuilding {
                            building: building.id,
                            target,
                        }
                    }
                }
            };
            self.scratch.push(command);
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}
