//! Unit status counters, movement and manual destinations.

use log::debug;
use tower_conquest_core::{
    CellCoord, DestinationError, Direction, Event, Owner, PlayerId, StepError, UnitId,
    TILE_UNIT_CAP,
};

use crate::World;

impl World {
    /// Decrements every unit counter by the game speed and purges dead units.
    pub(crate) fn update_unit_status(&mut self, out_events: &mut Vec<Event>) {
        let speed = self.config.game_speed;
        for unit in self.units.values_mut() {
            unit.is_moving = unit.move_cooldown > 0;
            unit.cooldown = unit.cooldown.saturating_sub(speed);
            unit.frozen = unit.frozen.saturating_sub(speed);
            unit.heal_cooldown = unit.heal_cooldown.saturating_sub(speed);
            unit.move_cooldown = unit.move_cooldown.saturating_sub(speed);
            unit.last_damage = unit
                .last_damage
                .and_then(|flash| flash.checked_sub(1))
                .filter(|flash| *flash > 0);
        }

        let dead: Vec<(UnitId, CellCoord)> = self
            .units
            .values()
            .filter(|unit| !unit.is_alive())
            .map(|unit| (unit.id, unit.cell))
            .collect();
        for (id, cell) in dead {
            let _ = self.units.remove(&id);
            if let Some(tile) = self.grid.tile_mut(cell) {
                tile.units.retain(|occupant| *occupant != id);
            }
            out_events.push(Event::UnitRemoved { unit: id });
        }
    }

    /// Moves a unit one tile, honouring the occupancy cap and building blockers.
    pub(crate) fn step_unit(&mut self, id: UnitId, direction: Direction, out_events: &mut Vec<Event>) {
        let to = match self.validate_step(id, direction) {
            Ok(to) => to,
            Err(reason) => {
                debug!("unit {} step {:?} rejected: {}", id.get(), direction, reason);
                out_events.push(Event::UnitStepRejected { unit: id, reason });
                return;
            }
        };
        let Some(unit) = self.units.get_mut(&id) else {
            return;
        };

        let from = unit.cell;
        unit.cell = to;
        unit.move_cooldown = unit.kind.archetype().move_delay;
        unit.is_moving = true;
        if unit.destination == Some(to) {
            unit.destination = None;
        }

        if let Some(tile) = self.grid.tile_mut(from) {
            tile.units.retain(|occupant| *occupant != id);
        }
        if let Some(tile) = self.grid.tile_mut(to) {
            tile.units.push(id);
        }
        out_events.push(Event::UnitAdvanced { unit: id, from, to });
    }

    fn validate_step(&self, id: UnitId, direction: Direction) -> Result<CellCoord, StepError> {
        let unit = self.units.get(&id).ok_or(StepError::NotReady)?;
        if !unit.is_alive() || unit.frozen > 0 || unit.cooldown > 0 || unit.move_cooldown > 0 {
            return Err(StepError::NotReady);
        }
        let to = unit
            .cell
            .step(direction, self.grid.size())
            .ok_or(StepError::OutOfBounds)?;
        let tile = self.grid.tile(to).ok_or(StepError::OutOfBounds)?;
        if tile.building.is_some() {
            return Err(StepError::Blocked);
        }
        if tile.units.len() >= TILE_UNIT_CAP {
            return Err(StepError::TileFull);
        }
        Ok(to)
    }

    /// Issues a manual destination to a unit owned by `player`.
    ///
    /// A destination equal to the unit's current cell clears any standing
    /// order so the unit resumes seeking towers.
    pub(crate) fn set_unit_destination(
        &mut self,
        player: PlayerId,
        id: UnitId,
        cell: CellCoord,
        out_events: &mut Vec<Event>,
    ) {
        if let Err(reason) = self.validate_destination(player, id, cell) {
            debug!("destination for unit {} rejected: {}", id.get(), reason);
            out_events.push(Event::DestinationRejected {
                unit: id,
                cell,
                reason,
            });
            return;
        }
        if let Some(unit) = self.units.get_mut(&id) {
            unit.destination = (unit.cell != cell).then_some(cell);
            out_events.push(Event::DestinationAssigned { unit: id, cell });
        }
    }

    fn validate_destination(
        &self,
        player: PlayerId,
        id: UnitId,
        cell: CellCoord,
    ) -> Result<(), DestinationError> {
        let unit = self
            .units
            .get(&id)
            .filter(|unit| unit.is_alive())
            .ok_or(DestinationError::UnknownUnit)?;
        if unit.owner != player {
            return Err(DestinationError::NotOwner);
        }
        match self.grid.tile(cell).map(|tile| tile.owner) {
            None => Err(DestinationError::OutOfBounds),
            Some(Owner::Player(owner)) if owner != player => Err(DestinationError::HostileTerritory),
            Some(_) => Ok(()),
        }
    }
}
