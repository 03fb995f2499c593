#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns the local player's raw input into world commands.
//!
//! The commander remembers which card, unit and building the player has
//! selected and resolves tile clicks against that selection. It never touches
//! the world directly; every effect is expressed as a [`Command`].

use serde::{Deserialize, Serialize};
use tower_conquest_core::{CardKind, CellCoord, Command, Event, GridView, Owner, PlayerId, UnitId};

/// Raw input delivered by an adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerInput {
    /// Toggles `card` as the selected card.
    SelectCard(CardKind),
    /// Clicks the tile at the provided cell.
    ClickTile(CellCoord),
    /// Clears every selection.
    Deselect,
    /// Toggles the simulation pause gate.
    TogglePause,
}

/// Out-of-band effect of an input that the commander cannot express as a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    /// Nothing beyond the emitted commands.
    Continue,
    /// The caller should flip its pause gate.
    TogglePause,
}

/// Current selection of the local player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Card armed for deployment.
    pub card: Option<CardKind>,
    /// Own unit awaiting a move order.
    pub unit: Option<UnitId>,
    /// Cell of the building being inspected.
    pub building: Option<CellCoord>,
}

/// Selection state machine for one seat.
#[derive(Debug, Clone)]
pub struct Commander {
    player: PlayerId,
    selection: Selection,
}

impl Default for Commander {
    fn default() -> Self {
        Self::new(PlayerId::One)
    }
}

impl Commander {
    /// Creates a commander acting on behalf of `player` with nothing selected.
    #[must_use]
    pub const fn new(player: PlayerId) -> Self {
        Self {
            player,
            selection: Selection {
                card: None,
                unit: None,
                building: None,
            },
        }
    }

    /// Seat the commander issues commands for.
    #[must_use]
    pub const fn player(&self) -> PlayerId {
        self.player
    }

    /// Current selection.
    #[must_use]
    pub const fn selection(&self) -> Selection {
        self.selection
    }

    /// Drops selections invalidated by world events.
    pub fn observe(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::MatchStarted { .. } | Event::ReturnedToMenu => {
                    self.selection = Selection::default();
                }
                Event::UnitRemoved { unit } if self.selection.unit == Some(*unit) => {
                    self.selection.unit = None;
                }
                Event::BuildingDestroyed { cell, .. } if self.selection.building == Some(*cell) => {
                    self.selection.building = None;
                }
                _ => {}
            }
        }
    }

    /// Applies `input` to the selection, pushing any resulting command into `out`.
    pub fn handle(
        &mut self,
        input: PlayerInput,
        view: &GridView<'_>,
        deck: &[CardKind],
        out: &mut Vec<Command>,
    ) -> Control {
        match input {
            PlayerInput::SelectCard(card) => {
                if deck.contains(&card) {
                    self.selection.card = toggle(self.selection.card, card);
                }
            }
            PlayerInput::ClickTile(cell) => self.click(cell, view, out),
            PlayerInput::Deselect => self.selection = Selection::default(),
            PlayerInput::TogglePause => return Control::TogglePause,
        }
        Control::Continue
    }

    fn click(&mut self, cell: CellCoord, view: &GridView<'_>, out: &mut Vec<Command>) {
        let Some(tile) = view.tile(cell) else {
            return;
        };

        if let Some(unit) = self.selection.unit {
            let hostile = matches!(tile.owner, Owner::Player(owner) if owner != self.player);
            if !hostile {
                out.push(Command::SetUnitDestination {
                    player: self.player,
                    unit,
                    cell,
                });
                self.selection.unit = None;
                return;
            }
        }

        if let Some(first) = view.units_at(cell).next() {
            if first.owner == self.player {
                self.selection.unit = toggle(self.selection.unit, first.id);
                return;
            }
        }

        if tile.building.is_some() {
            self.selection.building = toggle(self.selection.building, cell);
            return;
        }

        if let Some(card) = self.selection.card {
            out.push(Command::DeployCard {
                player: self.player,
                card,
                cell,
            });
        }
    }
}

fn toggle<T: PartialEq>(current: Option<T>, value: T) -> Option<T> {
    match current {
        Some(selected) if selected == value => None,
        _ => Some(value),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use tower_conquest_core::{
        default_deck, Building, BuildingId, BuildingKind, SpellKind, Tile, Unit, UnitKind,
    };

    use super::*;

    struct Field {
        tiles: Vec<Tile>,
        units: BTreeMap<UnitId, Unit>,
    }

    /// A 4x4 grid whose bottom two rows belong to player one and top row to player two.
    fn field() -> Field {
        let tiles = (0..4)
            .flat_map(|row| (0..4).map(move |column| CellCoord::new(column, row)))
            .map(|cell| {
                let owner = match cell.row() {
                    0 => Owner::Player(PlayerId::Two),
                    2 | 3 => Owner::Player(PlayerId::One),
                    _ => Owner::Neutral,
                };
                Tile::new(cell, owner)
            })
            .collect();
        Field {
            tiles,
            units: BTreeMap::new(),
        }
    }

    impl Field {
        fn unit(&mut self, id: u32, owner: PlayerId, cell: CellCoord) -> UnitId {
            let id = UnitId::new(id);
            let _ = self
                .units
                .insert(id, Unit::spawn(id, UnitKind::Knight, owner, cell));
            let index = (cell.row() * 4 + cell.column()) as usize;
            self.tiles[index].units.push(id);
            id
        }

        fn input(&self, commander: &mut Commander, input: PlayerInput) -> (Control, Vec<Command>) {
            let view = GridView::new(&self.tiles, 4, &self.units);
            let mut out = Vec::new();
            let control = commander.handle(input, &view, &default_deck(), &mut out);
            (control, out)
        }
    }

    #[test]
    fn card_selection_toggles_and_ignores_foreign_cards() {
        let field = field();
        let mut commander = Commander::default();
        let knight = CardKind::Unit(UnitKind::Knight);

        let _ = field.input(&mut commander, PlayerInput::SelectCard(knight));
        assert_eq!(commander.selection().card, Some(knight));
        let _ = field.input(&mut commander, PlayerInput::SelectCard(knight));
        assert_eq!(commander.selection().card, None);

        let lightning = CardKind::Spell(SpellKind::Lightning);
        let _ = field.input(&mut commander, PlayerInput::SelectCard(lightning));
        assert_eq!(commander.selection().card, None);
    }

    #[test]
    fn clicking_empty_tile_deploys_and_keeps_the_card() {
        let field = field();
        let mut commander = Commander::default();
        let archer = CardKind::Unit(UnitKind::Archer);
        let _ = field.input(&mut commander, PlayerInput::SelectCard(archer));

        let cell = CellCoord::new(1, 3);
        let (control, commands) = field.input(&mut commander, PlayerInput::ClickTile(cell));
        assert_eq!(control, Control::Continue);
        assert_eq!(
            commands,
            vec![Command::DeployCard {
                player: PlayerId::One,
                card: archer,
                cell,
            }]
        );
        assert_eq!(commander.selection().card, Some(archer));
    }

    #[test]
    fn own_unit_click_selects_then_orders_a_move() {
        let mut field = field();
        let unit = field.unit(1, PlayerId::One, CellCoord::new(2, 2));
        let mut commander = Commander::default();

        let (_, commands) =
            field.input(&mut commander, PlayerInput::ClickTile(CellCoord::new(2, 2)));
        assert!(commands.is_empty());
        assert_eq!(commander.selection().unit, Some(unit));

        let target = CellCoord::new(2, 1);
        let (_, commands) = field.input(&mut commander, PlayerInput::ClickTile(target));
        assert_eq!(
            commands,
            vec![Command::SetUnitDestination {
                player: PlayerId::One,
                unit,
                cell: target,
            }]
        );
        assert_eq!(commander.selection().unit, None);
    }

    #[test]
    fn enemy_territory_click_keeps_the_unit_selected() {
        let mut field = field();
        let unit = field.unit(1, PlayerId::One, CellCoord::new(2, 2));
        let mut commander = Commander::default();
        let _ = field.input(&mut commander, PlayerInput::ClickTile(CellCoord::new(2, 2)));

        let (_, commands) =
            field.input(&mut commander, PlayerInput::ClickTile(CellCoord::new(0, 0)));
        assert!(commands.is_empty());
        assert_eq!(commander.selection().unit, Some(unit));
    }

    #[test]
    fn building_click_toggles_inspection_instead_of_deploying() {
        let mut field = field();
        let cell = CellCoord::new(3, 3);
        field.tiles[15].building = Some(Building::construct(
            BuildingId::new(1),
            BuildingKind::Wall,
            PlayerId::One,
            cell,
        ));
        let mut commander = Commander::default();
        let _ = field.input(
            &mut commander,
            PlayerInput::SelectCard(CardKind::Building(BuildingKind::Tower)),
        );

        let (_, commands) = field.input(&mut commander, PlayerInput::ClickTile(cell));
        assert!(commands.is_empty());
        assert_eq!(commander.selection().building, Some(cell));

        let _ = field.input(&mut commander, PlayerInput::ClickTile(cell));
        assert_eq!(commander.selection().building, None);
    }

    #[test]
    fn deselect_and_pause_inputs() {
        let field = field();
        let mut commander = Commander::default();
        let _ = field.input(
            &mut commander,
            PlayerInput::SelectCard(CardKind::Spell(SpellKind::Fireball)),
        );
        let (control, _) = field.input(&mut commander, PlayerInput::TogglePause);
        assert_eq!(control, Control::TogglePause);
        let _ = field.input(&mut commander, PlayerInput::Deselect);
        assert_eq!(commander.selection(), Selection::default());
    }

    #[test]
    fn removed_units_are_dropped_from_the_selection() {
        let mut field = field();
        let unit = field.unit(4, PlayerId::One, CellCoord::new(1, 2));
        let mut commander = Commander::default();
        let _ = field.input(&mut commander, PlayerInput::ClickTile(CellCoord::new(1, 2)));

        commander.observe(&[Event::UnitRemoved { unit }]);
        assert_eq!(commander.selection().unit, None);
    }
}
