use tower_conquest_core::{default_deck, CardKind, CellCoord, Command, Event, GameMode, UnitKind};
use tower_conquest_system_commander::{Commander, PlayerInput};
use tower_conquest_world::{self as world, query, World};

#[test]
fn clicks_deploy_then_redirect_a_knight() {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::StartMatch {
            mode: GameMode::FourPlayer,
            ai_players: [false, true, true, true],
        },
        &mut events,
    );

    let deck = default_deck();
    let mut commander = Commander::default();
    commander.observe(&events);
    let home = CellCoord::new(12, 19);
    let script = [
        PlayerInput::SelectCard(CardKind::Unit(UnitKind::Knight)),
        PlayerInput::ClickTile(home),
        PlayerInput::ClickTile(home),
        PlayerInput::ClickTile(CellCoord::new(12, 12)),
    ];

    for input in script {
        let mut commands = Vec::new();
        let _ = commander.handle(input, &query::grid_view(&world), &deck, &mut commands);
        let mut generated = Vec::new();
        for command in commands {
            world::apply(&mut world, command, &mut generated);
        }
        commander.observe(&generated);
        events.extend(generated);
    }

    let knight = query::grid_view(&world)
        .units_at(home)
        .next()
        .copied()
        .expect("knight deployed during prep");
    assert_eq!(knight.destination, Some(CellCoord::new(12, 12)));
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::DestinationAssigned { .. })));
    assert_eq!(commander.selection().unit, None);
}
