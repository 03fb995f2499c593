//! Projectile flight and cosmetic effect decay.

use glam::Vec2;
use log::trace;
use tower_conquest_core::{
    CellCoord, Event, Explosion, Projectile, PROJECTILE_TRAIL_LEN, SPLASH_BUILDING_FRACTION,
    SPLASH_UNIT_FRACTION,
};

use crate::World;

const ARRIVAL_DISTANCE: f32 = 0.5;
const SPLASH_BLAST_RADIUS: f32 = 1.5;
const IMPACT_BLAST_RADIUS: f32 = 0.8;
const BLAST_GROWTH: f32 = 0.1;
const BLAST_FADE: f32 = 0.05;
const NUMBER_FADE: f32 = 0.015;
const NUMBER_GRAVITY: f32 = 0.001;

impl World {
    /// Moves every projectile and resolves the ones that arrived, in launch order.
    pub(crate) fn advance_projectiles(&mut self, out_events: &mut Vec<Event>) {
        let speed = self.config.game_speed as f32;
        let bound = self.grid.size() as f32;

        let (arrived, flying): (Vec<Projectile>, Vec<Projectile>) =
            std::mem::take(&mut self.projectiles)
                .into_iter()
                .map(|mut projectile| {
                    projectile.position = step_toward(
                        projectile.position,
                        projectile.to,
                        projectile.velocity * speed,
                    );
                    projectile.progress += projectile.speed * speed;
                    projectile.trail.push(projectile.position);
                    if projectile.trail.len() > PROJECTILE_TRAIL_LEN {
                        let _ = projectile.trail.remove(0);
                    }
                    projectile
                })
                .partition(|projectile| has_arrived(projectile, bound));
        self.projectiles = flying;

        for projectile in arrived {
            self.impact(&projectile, out_events);
        }
    }

    fn impact(&mut self, projectile: &Projectile, out_events: &mut Vec<Event>) {
        let Some(cell) = impact_cell(projectile.position, self.grid.size()) else {
            out_events.push(Event::ProjectileImpacted {
                projectile: projectile.id,
                cell: None,
            });
            return;
        };
        trace!("projectile {} impacted at {:?}", projectile.id.get(), cell);

        let splashes = projectile.source.splashes();
        self.explosions.push(Explosion {
            position: cell.to_vec2(),
            radius: 0.0,
            max_radius: if splashes {
                SPLASH_BLAST_RADIUS
            } else {
                IMPACT_BLAST_RADIUS
            },
            opacity: 1.0,
            color: projectile.source.color(),
        });

        self.strike(cell, projectile, projectile.damage, projectile.damage, out_events);
        if splashes {
            let unit_damage = fraction(projectile.damage, SPLASH_UNIT_FRACTION);
            let building_damage = fraction(projectile.damage, SPLASH_BUILDING_FRACTION);
            for neighbour in cell.neighborhood(1, self.grid.size()) {
                if neighbour != cell {
                    self.strike(neighbour, projectile, unit_damage, building_damage, out_events);
                }
            }
        }

        out_events.push(Event::ProjectileImpacted {
            projectile: projectile.id,
            cell: Some(cell),
        });
    }

    fn strike(
        &mut self,
        cell: CellCoord,
        projectile: &Projectile,
        unit_damage: u32,
        building_damage: u32,
        out_events: &mut Vec<Event>,
    ) {
        let owner = projectile.owner;
        for id in self.units_on(cell, |unit| unit.owner != owner) {
            self.damage_unit(id, unit_damage, out_events);
        }
        self.damage_building(cell, building_damage, owner, out_events);
    }

    /// Grows and fades explosions, drifts floating numbers, and drops the spent ones.
    pub(crate) fn decay_effects(&mut self) {
        let speed = self.config.game_speed as f32;
        self.explosions.retain_mut(|explosion| {
            explosion.radius += BLAST_GROWTH * speed;
            explosion.opacity -= BLAST_FADE * speed;
            explosion.opacity > 0.0 && explosion.radius < explosion.max_radius
        });
        self.damage_numbers.retain_mut(|number| {
            number.opacity -= NUMBER_FADE * speed;
            number.position += number.velocity * speed;
            number.velocity.y -= NUMBER_GRAVITY * speed;
            number.opacity > 0.0
        });
    }
}

fn has_arrived(projectile: &Projectile, bound: f32) -> bool {
    let position = projectile.position;
    let outside = position.x < 0.0 || position.y < 0.0 || position.x >= bound || position.y >= bound;
    outside || projectile.progress >= 1.0 || position.distance(projectile.to) < ARRIVAL_DISTANCE
}

/// Applies `step`, stopping on `to` when the step would carry past it.
fn step_toward(position: Vec2, to: Vec2, step: Vec2) -> Vec2 {
    if step.length_squared() >= position.distance_squared(to) {
        to
    } else {
        position + step
    }
}

/// Nearest grid cell to `position`, or `None` when it rounds off the grid.
fn impact_cell(position: Vec2, size: u32) -> Option<CellCoord> {
    let rounded = position.round();
    let bound = size as f32;
    if rounded.x < 0.0 || rounded.y < 0.0 || rounded.x >= bound || rounded.y >= bound {
        return None;
    }
    Some(CellCoord::new(rounded.x as u32, rounded.y as u32))
}

fn fraction(damage: u32, share: f32) -> u32 {
    (damage as f32 * share).floor() as u32
}
