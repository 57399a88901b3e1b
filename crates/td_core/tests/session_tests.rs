//! End-to-end session flows: build window, placement round trips, economy
//! notifications, and phase gating.

use td_core::prelude::*;

fn watchtower() -> BuildingDefinition {
    BuildingDefinition::new(BuildingTypeId::new(1), "watchtower", 100, PrefabId::new(1), 0)
}

fn session_with_coins(coins: u32) -> Game {
    let config = GameConfig {
        starting_coins: coins,
        ..GameConfig::default()
    };
    let mut game = Game::new(&LevelLayout::open(10, 10), config);
    game.register_building(watchtower());
    game
}

fn pointer(x: f64, z: f64) -> Vec3Fixed {
    Vec3Fixed::new(
        Fixed::from_num(x),
        Fixed::from_num(2.0),
        Fixed::from_num(z),
    )
}

fn frame(delta: f64) -> FrameInput {
    FrameInput::idle(Fixed::from_num(delta)).with_timer_surface(true)
}

#[test]
fn placing_a_building_spends_coins_and_occupies_the_cell() {
    let mut game = session_with_coins(800);
    game.switch_phase(Phase::Building);
    game.select_building(BuildingTypeId::new(1)).unwrap();

    // Build trigger: the cursor spawns under the pointer.
    let events = game
        .tick(
            frame(0.016)
                .with_pointer(pointer(3.4, 4.7))
                .with_build_pressed(),
            &mut NoFeedback,
        )
        .unwrap();
    let cursor = events.cursor.unwrap();
    assert_eq!(cursor.grid_position, GridCoord::new(3, 4));
    assert!(cursor.valid);
    assert!(game.is_placing());

    // Confirm: grid, economy, and roster move together.
    let events = game
        .tick(
            frame(0.016)
                .with_pointer(pointer(3.4, 4.7))
                .with_confirm_pressed(),
            &mut NoFeedback,
        )
        .unwrap();
    let committed = events.committed.unwrap();
    assert_eq!(committed.coord, GridCoord::new(3, 4));
    assert_eq!(committed.price, 100);

    assert_eq!(game.grid().is_occupied(GridCoord::new(3, 4)), Ok(true));
    assert_eq!(game.coins(), 700);
    assert_eq!(game.roster().len(), 1);
    assert!(!game.is_placing());
    assert!(game.catalog().selected_building().is_none());
}

#[test]
fn confirming_on_an_occupied_cell_rejects_without_mutation() {
    let layout = LevelLayout {
        width: 10,
        height: 10,
        tiles: vec![TileSeed {
            x: 3,
            z: 4,
            kind: TileKind::Wall,
        }],
    };
    let mut game = Game::new(&layout, GameConfig::default());
    game.register_building(watchtower());
    game.switch_phase(Phase::Building);
    game.select_building(BuildingTypeId::new(1)).unwrap();

    game.tick(
        frame(0.016)
            .with_pointer(pointer(0.5, 0.5))
            .with_build_pressed(),
        &mut NoFeedback,
    )
    .unwrap();

    // Hover the wall: the cursor follows but reports the cell as invalid.
    let events = game
        .tick(frame(0.016).with_pointer(pointer(3.5, 4.5)), &mut NoFeedback)
        .unwrap();
    let cursor = events.cursor.unwrap();
    assert_eq!(cursor.grid_position, GridCoord::new(3, 4));
    assert!(!cursor.valid);

    let events = game
        .tick(
            frame(0.016)
                .with_pointer(pointer(3.5, 4.5))
                .with_confirm_pressed(),
            &mut NoFeedback,
        )
        .unwrap();
    assert_eq!(events.rejected_at, Some(GridCoord::new(3, 4)));
    assert!(events.committed.is_none());

    // The wall stays occupied, nothing was bought, the engine is idle.
    assert_eq!(game.coins(), 800);
    assert_eq!(game.grid().is_occupied(GridCoord::new(3, 4)), Ok(true));
    assert_eq!(game.grid().occupied_count(), 1);
    assert!(game.roster().is_empty());
    assert!(!game.is_placing());
}

#[test]
fn unaffordable_selection_refuses_the_build_trigger() {
    let mut game = session_with_coins(50);
    game.switch_phase(Phase::Building);
    game.select_building(BuildingTypeId::new(1)).unwrap();

    let events = game
        .tick(
            frame(0.016)
                .with_pointer(pointer(3.0, 4.0))
                .with_build_pressed(),
            &mut NoFeedback,
        )
        .unwrap();

    assert!(events.refusal.is_some());
    assert!(events.cursor.is_none());
    assert!(!game.is_placing());
    assert_eq!(game.coins(), 50);
}

#[test]
fn build_trigger_without_a_selection_is_refused() {
    let mut game = session_with_coins(800);
    game.switch_phase(Phase::Building);

    let events = game
        .tick(frame(0.016).with_build_pressed(), &mut NoFeedback)
        .unwrap();

    assert!(events.refusal.is_some());
    assert!(!game.is_placing());
}

#[test]
fn second_build_trigger_keeps_the_existing_cursor() {
    let mut game = session_with_coins(800);
    game.switch_phase(Phase::Building);
    game.select_building(BuildingTypeId::new(1)).unwrap();

    game.tick(
        frame(0.016)
            .with_pointer(pointer(3.0, 4.0))
            .with_build_pressed(),
        &mut NoFeedback,
    )
    .unwrap();
    let before = *game.placement_cursor().unwrap();

    // Pressing build again while placing changes nothing.
    let events = game
        .tick(
            frame(0.016)
                .with_pointer(pointer(3.0, 4.0))
                .with_build_pressed(),
            &mut NoFeedback,
        )
        .unwrap();
    assert!(events.refusal.is_none());
    assert_eq!(game.placement_cursor(), Some(&before));
}

#[test]
fn pointer_excursions_freeze_the_cursor_at_the_edge() {
    let mut game = session_with_coins(800);
    game.switch_phase(Phase::Building);
    game.select_building(BuildingTypeId::new(1)).unwrap();

    game.tick(
        frame(0.016)
            .with_pointer(pointer(7.2, 8.9))
            .with_build_pressed(),
        &mut NoFeedback,
    )
    .unwrap();

    for (x, z) in [(17.2, 8.9), (-4.0, 8.9), (7.2, 52.0), (7.2, -2.5)] {
        let events = game
            .tick(frame(0.016).with_pointer(pointer(x, z)), &mut NoFeedback)
            .unwrap();
        let cursor = events.cursor.unwrap();
        assert_eq!(cursor.grid_position, GridCoord::new(7, 8));
        assert!(cursor.valid);
    }
}

#[test]
fn build_timer_counts_only_with_an_active_surface() {
    let mut game = session_with_coins(800);
    game.switch_phase(Phase::Building);

    // Surface hidden: the countdown holds at the full duration.
    for _ in 0..5 {
        game.tick(FrameInput::idle(Fixed::from_num(1)), &mut NoFeedback)
            .unwrap();
    }
    assert_eq!(game.build_timer().remaining(), Fixed::from_num(60));

    // Surface shown: ten seconds tick away.
    for _ in 0..10 {
        game.tick(frame(1.0), &mut NoFeedback).unwrap();
    }
    assert_eq!(game.build_timer().remaining(), Fixed::from_num(50));
}

#[test]
fn build_timer_never_counts_outside_the_building_phase() {
    let mut game = session_with_coins(800);
    game.switch_phase(Phase::Building);
    game.switch_phase(Phase::Combat);

    // The surface flag alone is not enough; combat frames never count down.
    for _ in 0..7 {
        let events = game.tick(frame(1.0), &mut NoFeedback).unwrap();
        assert_eq!(events.phase, Phase::Combat);
    }
    assert_eq!(game.build_timer().remaining(), Fixed::from_num(60));
}

#[test]
fn coin_subscribers_see_every_balance_change() {
    let mut game = session_with_coins(800);
    let coins = game.subscribe_coins();
    game.announce_coins();

    game.switch_phase(Phase::Building);
    game.select_building(BuildingTypeId::new(1)).unwrap();
    game.tick(
        frame(0.016)
            .with_pointer(pointer(2.0, 2.0))
            .with_build_pressed(),
        &mut NoFeedback,
    )
    .unwrap();
    game.tick(
        frame(0.016)
            .with_pointer(pointer(2.0, 2.0))
            .with_confirm_pressed(),
        &mut NoFeedback,
    )
    .unwrap();
    game.credit_coins(40);

    let balances: Vec<u32> = coins.try_iter().map(|event| event.balance).collect();
    assert_eq!(balances, vec![800, 700, 740]);
}

#[test]
fn placements_accumulate_in_the_roster() {
    let mut game = session_with_coins(800);
    game.switch_phase(Phase::Building);

    for (x, z) in [(1.0, 1.0), (2.0, 5.0), (8.0, 3.0)] {
        game.select_building(BuildingTypeId::new(1)).unwrap();
        game.tick(
            frame(0.016).with_pointer(pointer(x, z)).with_build_pressed(),
            &mut NoFeedback,
        )
        .unwrap();
        game.tick(
            frame(0.016)
                .with_pointer(pointer(x, z))
                .with_confirm_pressed(),
            &mut NoFeedback,
        )
        .unwrap();
    }

    assert_eq!(game.roster().len(), 3);
    assert_eq!(game.coins(), 500);
    assert_eq!(game.grid().occupied_count(), 3);

    // Each commit anchored its behavior to a distinct instance.
    let latest = game.latest_commit().unwrap();
    assert_eq!(latest.coord, GridCoord::new(8, 3));
    assert_eq!(latest.building.attack.anchor, Some(latest.instance));

    let mut instances: Vec<InstanceId> =
        game.roster().placed.iter().map(|p| p.instance).collect();
    instances.dedup();
    assert_eq!(instances.len(), 3);
}

#[test]
fn restart_flow_returns_to_the_start_menu() {
    let mut game = session_with_coins(800);

    // Menu start button.
    let transition = game.switch_phase(Phase::Building);
    assert_eq!(transition.exited, Phase::Start);

    // Build window elapses; the rules layer moves the session onward.
    game.switch_phase(Phase::Combat);
    game.switch_phase(Phase::GameOver);

    // Start-over button.
    let transition = game.switch_phase(Phase::Start);
    assert_eq!(transition.entered, Phase::Start);
    assert_eq!(game.phase(), Phase::Start);
}
