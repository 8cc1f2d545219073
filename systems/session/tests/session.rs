use std::{
    collections::hash_map::DefaultHasher,
    collections::VecDeque,
    hash::{Hash, Hasher},
};

use iceman_core::{Direction, Level, LevelStatus, PlayerAction, Sound, StatusLine};
use iceman_system_session::{Host, LevelSession};
use iceman_system_spawning::LevelPlan;
use iceman_world::query;

#[derive(Debug, Default)]
struct RecordingHost {
    script: VecDeque<PlayerAction>,
    lives: u32,
    score: u32,
    statuses: Vec<String>,
    sounds: Vec<Sound>,
}

impl RecordingHost {
    fn with_script(script: Vec<PlayerAction>) -> Self {
        Self {
            script: script.into(),
            lives: 3,
            ..Self::default()
        }
    }
}

impl Host for RecordingHost {
    fn action(&mut self) -> PlayerAction {
        self.script.pop_front().unwrap_or_default()
    }

    fn lives(&self) -> u32 {
        self.lives
    }

    fn score(&self) -> u32 {
        self.score
    }

    fn show_status(&mut self, status: &StatusLine) {
        self.statuses.push(status.to_string());
    }

    fn play_sound(&mut self, sound: Sound) {
        self.sounds.push(sound);
    }

    fn award_points(&mut self, points: u32) {
        self.score += points;
    }
}

fn script() -> Vec<PlayerAction> {
    let mut actions = vec![PlayerAction::Move(Direction::Down); 40];
    actions.extend(vec![PlayerAction::Move(Direction::Left); 20]);
    actions.push(PlayerAction::Spray);
    actions.push(PlayerAction::Sonar);
    actions.extend(vec![PlayerAction::Move(Direction::Up); 15]);
    actions
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct SessionOutcome {
    statuses: Vec<String>,
    sounds: Vec<Sound>,
    score: u32,
    results: Vec<LevelStatus>,
}

impl SessionOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

fn play(level: u32, seed: u64, ticks: usize) -> SessionOutcome {
    let mut host = RecordingHost::with_script(script());
    let mut session = LevelSession::new(Level::new(level), seed);
    let mut results = vec![session.init(&mut host)];
    for _ in 0..ticks {
        results.push(session.tick(&mut host));
    }
    SessionOutcome {
        statuses: host.statuses,
        sounds: host.sounds,
        score: host.score,
        results,
    }
}

#[test]
fn seeded_sessions_replay_identically() {
    let first = play(2, 0x1ce, 400);
    let second = play(2, 0x1ce, 400);

    assert_eq!(first, second, "session diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
}

fn play_reseeded(seed: u64, reseed_at: usize, reseed: u64) -> SessionOutcome {
    let mut host = RecordingHost::with_script(script());
    let mut session = LevelSession::new(Level::new(2), seed);
    let mut results = vec![session.init(&mut host)];
    for tick in 0..300 {
        if tick == reseed_at {
            session.reseed(reseed);
        }
        results.push(session.tick(&mut host));
    }
    SessionOutcome {
        statuses: host.statuses,
        sounds: host.sounds,
        score: host.score,
        results,
    }
}

#[test]
fn reseeded_sessions_replay_identically() {
    let first = play_reseeded(0x1ce, 50, 0xfeed);
    let second = play_reseeded(0x1ce, 50, 0xfeed);

    assert_eq!(first, second, "reseeded session diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
}

#[test]
fn reseed_before_init_seeds_the_level() {
    let mut reseeded_host = RecordingHost::with_script(Vec::new());
    let mut reseeded = LevelSession::new(Level::new(3), 1);
    reseeded.reseed(44);
    let _ = reseeded.init(&mut reseeded_host);

    let mut direct_host = RecordingHost::with_script(Vec::new());
    let mut direct = LevelSession::new(Level::new(3), 44);
    let _ = direct.init(&mut direct_host);

    assert_eq!(
        query::placed_object_cells(reseeded.world()),
        query::placed_object_cells(direct.world())
    );
}

#[test]
fn init_populates_the_level() {
    let mut host = RecordingHost::with_script(Vec::new());
    let mut session = LevelSession::new(Level::new(3), 12);

    assert_eq!(session.init(&mut host), LevelStatus::Continue);

    let plan = LevelPlan::for_level(Level::new(3));
    let world = session.world();
    assert_eq!(query::barrels_remaining(world), plan.barrels);
    assert_eq!(query::protester_count(world), 1);
    assert_eq!(
        query::placed_object_cells(world).len(),
        usize::try_from(plan.boulders + plan.gold_nuggets + plan.barrels).expect("fits")
    );
}

#[test]
fn status_line_is_shown_before_each_tick() {
    let mut host = RecordingHost::with_script(vec![PlayerAction::Spray]);
    host.score = 1_250;
    let mut session = LevelSession::new(Level::new(2), 5);
    let _ = session.init(&mut host);

    let _ = session.tick(&mut host);
    let _ = session.tick(&mut host);

    assert_eq!(host.statuses.len(), 2);
    assert_eq!(
        host.statuses[0],
        "Lvl:  2 Lives: 3 Hlth: 100% Wtr:  5 Gld:  0 Oil Left:  4 Sonar:  1 Scr: 001250"
    );
    assert!(host.statuses[1].contains("Wtr:  4"));
    assert!(host.sounds.contains(&Sound::PlayerSquirt));
}

#[test]
fn giving_up_ends_the_session_on_that_tick() {
    let mut host = RecordingHost::with_script(vec![PlayerAction::None, PlayerAction::GiveUp]);
    let mut session = LevelSession::new(Level::new(0), 1);
    let _ = session.init(&mut host);

    assert_eq!(session.tick(&mut host), LevelStatus::Continue);
    assert_eq!(session.tick(&mut host), LevelStatus::PlayerDied);
    assert_eq!(session.tick(&mut host), LevelStatus::PlayerDied);
    assert_eq!(query::tick_index(session.world()), 2);
    assert!(host.sounds.contains(&Sound::PlayerGiveUp));
}

#[test]
fn teardown_clears_the_field() {
    let mut host = RecordingHost::with_script(Vec::new());
    let mut session = LevelSession::new(Level::new(1), 3);
    let _ = session.init(&mut host);

    session.teardown();

    assert!(query::actor_view(session.world()).into_vec().is_empty());
    assert_eq!(query::ice_count(session.world()), 0);
}
