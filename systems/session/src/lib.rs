#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level session that drives the spawning system and the world for a host.
//!
//! The host owns lives, score, input and presentation. The session owns the
//! world and the spawning system and runs one level from `init` to `teardown`.

use iceman_core::{Command, Event, Level, LevelStatus, PlayerAction, Sound, StatusLine};
use iceman_system_spawning::{Config, Spawning};
use iceman_world::{self as world, query, World};

const SPAWNING_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Services a host provides to a running level.
pub trait Host {
    /// Action the player requested for the coming tick.
    fn action(&mut self) -> PlayerAction;

    /// Lives left, for the status line.
    fn lives(&self) -> u32;

    /// Current score, for the status line.
    fn score(&self) -> u32;

    /// Receives the refreshed status line once per tick.
    fn show_status(&mut self, status: &StatusLine);

    /// Receives every sound cue in emission order.
    fn play_sound(&mut self, sound: Sound);

    /// Receives every score award in emission order.
    fn award_points(&mut self, points: u32);
}

/// One attempt at a level.
#[derive(Debug)]
pub struct LevelSession {
    level: Level,
    seed: u64,
    world: World,
    spawning: Spawning,
    status: LevelStatus,
}

impl LevelSession {
    /// Creates a session for the provided level; nothing is placed until [`init`].
    ///
    /// [`init`]: LevelSession::init
    #[must_use]
    pub fn new(level: Level, seed: u64) -> Self {
        Self {
            level,
            seed,
            world: World::new(),
            spawning: Spawning::new(Config::new(level, seed ^ SPAWNING_SEED_SALT)),
            status: LevelStatus::Continue,
        }
    }

    /// Builds the field, places the level's objects and the first protester.
    pub fn init<H: Host + ?Sized>(&mut self, host: &mut H) -> LevelStatus {
        tracing::info!(level = self.level.get(), seed = self.seed, "starting level");
        self.spawning = Spawning::new(Config::new(self.level, self.seed ^ SPAWNING_SEED_SALT));
        self.status = LevelStatus::Continue;

        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::ConfigureLevel {
                level: self.level,
                seed: self.seed,
            },
            &mut events,
        );

        let mut commands = Vec::new();
        self.spawning.populate(&self.world, &mut commands);
        self.execute(commands, &mut events);
        forward(host, &events);
        self.status
    }

    /// Runs one host-level tick and reports the level status afterwards.
    ///
    /// Once the level has ended further calls return the terminal status
    /// without advancing the simulation.
    pub fn tick<H: Host + ?Sized>(&mut self, host: &mut H) -> LevelStatus {
        if self.status != LevelStatus::Continue {
            return self.status;
        }

        self.spawning.advance_countdown();
        let status_line = query::status_line(&self.world, host.lives(), host.score());
        host.show_status(&status_line);

        let mut commands = Vec::new();
        self.spawning.handle(&self.world, &mut commands);
        commands.push(Command::Tick {
            action: host.action(),
        });

        let mut events = Vec::new();
        self.execute(commands, &mut events);
        forward(host, &events);

        self.status = query::status(&self.world);
        if self.status != LevelStatus::Continue {
            tracing::info!(
                status = ?self.status,
                tick = query::tick_index(&self.world),
                "level over"
            );
        }
        self.status
    }

    /// Releases every actor and the remaining ice.
    pub fn teardown(&mut self) {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::Teardown, &mut events);
    }

    /// Re-seeds the world and spawning random sources of the running level.
    ///
    /// Later calls to [`init`] also start from `seed`.
    ///
    /// [`init`]: LevelSession::init
    pub fn reseed(&mut self, seed: u64) {
        tracing::debug!(seed, "reseeding level");
        self.seed = seed;
        self.world.reseed(seed);
        self.spawning.reseed(seed ^ SPAWNING_SEED_SALT);
    }

    /// Status reported by the most recent `init` or `tick`.
    #[must_use]
    pub fn status(&self) -> LevelStatus {
        self.status
    }

    /// Read-only access to the world for presentation.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    fn execute(&mut self, commands: Vec<Command>, events: &mut Vec<Event>) {
        for command in commands {
            world::apply(&mut self.world, command, events);
        }
    }
}

fn forward<H: Host + ?Sized>(host: &mut H, events: &[Event]) {
    for event in events {
        match event {
            Event::SoundPlayed { sound } => host.play_sound(*sound),
            Event::PointsAwarded { points } => host.award_points(*points),
            Event::PlacementRejected { kind, cell, reason } => tracing::warn!(
                ?kind,
                x = cell.x(),
                y = cell.y(),
                ?reason,
                "world rejected placement"
            ),
            _ => {}
        }
    }
}
