use iceman_core::{
    CellCoord, Command, Direction, Event, Level, LevelStatus, PlayerAction, ProtesterKind, Sound,
};
use iceman_world::{self as world, query, World, PROTESTER_EXIT};

fn configured(level: u32, seed: u64) -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureLevel {
            level: Level::new(level),
            seed,
        },
        &mut events,
    );
    world
}

fn apply(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

fn step(world: &mut World, action: PlayerAction) -> Vec<Event> {
    apply(world, Command::Tick { action })
}

#[test]
fn level_finishes_on_the_tick_the_last_barrel_is_collected() {
    let mut world = configured(0, 3);
    let _ = apply(&mut world, Command::PlaceBarrel { cell: CellCoord::new(26, 60) });
    let _ = apply(&mut world, Command::PlaceBarrel { cell: CellCoord::new(5, 5) });
    assert_eq!(query::barrels_remaining(&world), 2);

    let turned = step(&mut world, PlayerAction::Move(Direction::Left));
    assert!(!turned.iter().any(|event| matches!(event, Event::LevelEnded { .. })));

    let collected = step(&mut world, PlayerAction::Move(Direction::Left));
    assert!(collected.contains(&Event::SoundPlayed {
        sound: Sound::FoundOil
    }));
    assert!(collected.contains(&Event::PointsAwarded { points: 1_000 }));
    assert_eq!(query::barrels_remaining(&world), 1);
    assert_eq!(query::status(&world), LevelStatus::Continue);

    let mut world = configured(0, 3);
    let _ = apply(&mut world, Command::PlaceBarrel { cell: CellCoord::new(26, 60) });
    let _ = step(&mut world, PlayerAction::Move(Direction::Left));
    let finished = step(&mut world, PlayerAction::Move(Direction::Left));

    assert_eq!(query::status(&world), LevelStatus::LevelFinished);
    assert!(finished.contains(&Event::SoundPlayed {
        sound: Sound::FinishedLevel
    }));
    assert!(finished.contains(&Event::LevelEnded {
        status: LevelStatus::LevelFinished
    }));
    assert_eq!(query::tick_index(&world), 2);
}

#[test]
fn giving_up_ends_the_level() {
    let mut world = configured(1, 9);
    let _ = apply(&mut world, Command::PlaceBarrel { cell: CellCoord::new(5, 5) });

    let events = step(&mut world, PlayerAction::GiveUp);

    assert!(events.contains(&Event::SoundPlayed {
        sound: Sound::PlayerGiveUp
    }));
    assert!(events.contains(&Event::LevelEnded {
        status: LevelStatus::PlayerDied
    }));
    let player = query::player(&world);
    assert!(!player.alive);
    assert_eq!(player.health, 0);
    assert_eq!(query::status_line(&world, 2, 40).health_percent(), 0);
}

#[test]
fn status_line_tracks_inventory() {
    let mut world = configured(2, 1);
    for cell in [CellCoord::new(5, 5), CellCoord::new(15, 5), CellCoord::new(45, 5)] {
        let _ = apply(&mut world, Command::PlaceBarrel { cell });
    }
    let _ = step(&mut world, PlayerAction::Spray);

    assert_eq!(
        query::status_line(&world, 3, 1_250).to_string(),
        "Lvl:  2 Lives: 3 Hlth: 100% Wtr:  4 Gld:  0 Oil Left:  3 Sonar:  1 Scr: 001250"
    );
}

#[test]
fn protesters_spawn_at_the_exit_facing_left() {
    let mut world = configured(0, 5);
    let events = apply(
        &mut world,
        Command::SpawnProtester {
            kind: ProtesterKind::Hardcore,
        },
    );

    assert!(matches!(
        events.as_slice(),
        [Event::ActorSpawned { cell, .. }] if *cell == PROTESTER_EXIT
    ));
    let snapshot = query::actor_view(&world)
        .into_vec()
        .pop()
        .expect("protester spawned");
    assert_eq!(snapshot.facing, Direction::Left);
    assert_eq!(snapshot.health, Some(20));
    assert_eq!(query::protester_count(&world), 1);
}

#[test]
fn radius_checks_are_strict() {
    let origin = CellCoord::new(10, 10);
    let edge = CellCoord::new(14, 10);

    assert!(!World::within_radius(origin, edge, 4));
    assert!(World::within_radius(origin, CellCoord::new(13, 10), 4));
    assert!(!World::outside_radius(origin, CellCoord::new(16, 10), 6));
    assert!(World::outside_radius(origin, CellCoord::new(16, 11), 6));
}

#[test]
fn teardown_releases_everything() {
    let mut world = configured(0, 2);
    let _ = apply(&mut world, Command::PlaceBoulder { cell: CellCoord::new(5, 30) });
    let _ = apply(
        &mut world,
        Command::SpawnProtester {
            kind: ProtesterKind::Regular,
        },
    );

    let _ = apply(&mut world, Command::Teardown);

    assert!(query::actor_view(&world).into_vec().is_empty());
    assert_eq!(query::ice_count(&world), 0);
}

#[test]
fn cell_queries_answer_false_out_of_range() {
    let world = configured(0, 1);

    assert!(query::is_open(&world, CellCoord::new(31, 30)));
    assert!(!query::is_open(&world, CellCoord::new(0, 0)));
    assert!(!query::is_open(&world, CellCoord::new(64, 62)));
    assert!(!query::is_open(&world, CellCoord::new(u32::MAX, u32::MAX)));

    assert!(query::overlaps_shaft(CellCoord::new(30, 20)));
    assert!(!query::overlaps_shaft(CellCoord::new(u32::MAX, 10)));
    assert!(!query::overlaps_shaft(CellCoord::new(30, u32::MAX)));
    assert!(!query::footprint_is_open(&world, CellCoord::new(u32::MAX, u32::MAX)));
}
