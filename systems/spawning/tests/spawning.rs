use iceman_core::{Command, Event, GoodieKind, Level};
use iceman_system_spawning::{Config, LevelPlan, Spawning, PLACEMENT_SPACING, SONAR_KIT_CELL};
use iceman_world::{self as world, query, World};
use proptest::prelude::*;

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

fn apply_all(world: &mut World, commands: &[Command]) -> Vec<Event> {
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command.clone(), &mut events);
    }
    events
}

#[test]
fn populate_places_spaced_objects_and_one_protester() {
    let mut world = configured(4, 21);
    let mut spawning = Spawning::new(Config::new(Level::new(4), 0x5eed));
    let mut commands = Vec::new();
    spawning.populate(&world, &mut commands);

    let count = |matcher: fn(&Command) -> bool| commands.iter().filter(|command| matcher(command)).count();
    assert_eq!(count(|command| matches!(command, Command::PlaceBoulder { .. })), 4);
    assert_eq!(count(|command| matches!(command, Command::PlaceGoldNugget { .. })), 3);
    assert_eq!(count(|command| matches!(command, Command::PlaceBarrel { .. })), 6);
    assert!(matches!(commands.last(), Some(Command::SpawnProtester { .. })));

    let events = apply_all(&mut world, &commands);
    assert!(
        !events
            .iter()
            .any(|event| matches!(event, Event::PlacementRejected { .. })),
        "world rejected a planned placement: {events:?}"
    );

    let cells = query::placed_object_cells(&world);
    assert_eq!(cells.len(), 13);
    for (index, cell) in cells.iter().enumerate() {
        assert!(cell.y() <= 56);
        assert!(!query::overlaps_shaft(*cell));
        for other in &cells[index + 1..] {
            assert!(World::outside_radius(*cell, *other, PLACEMENT_SPACING));
        }
    }
    assert_eq!(query::barrels_remaining(&world), 6);
    assert_eq!(query::protester_count(&world), 1);
    assert_eq!(
        spawning.ticks_until_protester(),
        LevelPlan::for_level(Level::new(4)).spawn_interval
    );
}

#[test]
fn protesters_follow_the_cadence_and_the_cap() {
    let mut world = configured(0, 4);
    let mut spawning = Spawning::new(Config::new(Level::new(0), 77));
    let mut commands = Vec::new();
    spawning.populate(&world, &mut commands);
    let _ = apply_all(&mut world, &commands);

    let mut spawn_ticks = Vec::new();
    for tick in 1..=600 {
        spawning.advance_countdown();
        let mut commands = Vec::new();
        spawning.handle(&world, &mut commands);
        if commands
            .iter()
            .any(|command| matches!(command, Command::SpawnProtester { .. }))
        {
            spawn_ticks.push(tick);
        }
        let _ = apply_all(&mut world, &commands);
    }

    assert_eq!(spawn_ticks, vec![200]);
    assert_eq!(query::protester_count(&world), 2);
}

#[test]
fn goodies_spawn_where_they_are_allowed() {
    let world = configured(0, 8);
    let mut spawning = Spawning::new(Config::new(Level::new(0), 4_242));
    let mut commands = Vec::new();
    for _ in 0..20_000 {
        spawning.handle(&world, &mut commands);
    }

    let goodies: Vec<_> = commands
        .iter()
        .filter_map(|command| match command {
            Command::SpawnGoodie {
                kind,
                cell,
                lifetime,
            } => Some((*kind, *cell, *lifetime)),
            _ => None,
        })
        .collect();
    assert!(!goodies.is_empty(), "expected at least one goodie roll to succeed");
    for (kind, cell, lifetime) in goodies {
        assert_eq!(lifetime, 300);
        match kind {
            GoodieKind::SonarKit => assert_eq!(cell, SONAR_KIT_CELL),
            GoodieKind::WaterPool => assert!(query::footprint_is_open(&world, cell)),
        }
    }
}

#[test]
fn identical_seeds_emit_identical_commands() {
    let world = configured(3, 1);
    let run = |seed| {
        let mut spawning = Spawning::new(Config::new(Level::new(3), seed));
        let mut commands = Vec::new();
        spawning.populate(&world, &mut commands);
        for _ in 0..400 {
            spawning.advance_countdown();
            spawning.handle(&world, &mut commands);
        }
        commands
    };

    assert_eq!(run(0xabc), run(0xabc));
}

proptest! {
    #[test]
    fn level_plan_stays_within_bounds(level in 0u32..=u32::MAX) {
        let plan = LevelPlan::for_level(Level::new(level));

        prop_assert!(plan.boulders <= 9);
        prop_assert!(plan.gold_nuggets >= 2);
        prop_assert!(plan.barrels <= 21);
        prop_assert!(plan.protester_cap <= 15);
        prop_assert!(plan.spawn_interval >= 25);
        prop_assert!(plan.hardcore_percent <= 90);
        prop_assert!(plan.goodie_lifetime >= 100);
        prop_assert!(plan.goodie_odds >= 300);
    }

    #[test]
    fn barrels_and_protesters_never_decrease(level in 0u32..10_000) {
        let current = LevelPlan::for_level(Level::new(level));
        let next = LevelPlan::for_level(Level::new(level + 1));

        prop_assert!(next.barrels >= current.barrels);
        prop_assert!(next.protester_cap >= current.protester_cap);
        prop_assert!(next.spawn_interval <= current.spawn_interval);
    }
}
