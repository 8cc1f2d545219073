#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Iceman simulation.
//!
//! This crate defines the message surface that connects the host adapter, the
//! authoritative world, and the pure systems. Systems and the session submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! (sounds, score awards, spawns, level status) for the session to forward to
//! the host.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of cells along each edge of the square field.
pub const FIELD_SIZE: u32 = 64;

/// Number of bottom rows that start the level filled with ice.
pub const ICE_ROWS: u32 = 60;

/// Edge length of the square footprint occupied by every actor.
pub const FOOTPRINT: u32 = 4;

/// Largest anchor coordinate that keeps a footprint inside the field.
pub const MAX_ANCHOR: u32 = FIELD_SIZE - FOOTPRINT;

/// Zero-based level index; level `0` is the first level of a game.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Level(u32);

impl Level {
    /// Creates a level wrapper from its numeric index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric level index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Cardinal facing and movement directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward increasing `y`.
    Up,
    /// Movement toward decreasing `y`.
    Down,
    /// Movement toward decreasing `x`.
    Left,
    /// Movement toward increasing `x`.
    Right,
}

impl Direction {
    /// Neighbor expansion order used by the pathfinder.
    ///
    /// Distance ties are broken by this order, so agents that follow a route
    /// always pick the earliest direction in this list.
    pub const SEARCH_ORDER: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// The two directions at right angles to this one.
    #[must_use]
    pub const fn perpendicular(self) -> [Self; 2] {
        match self {
            Self::Up | Self::Down => [Self::Left, Self::Right],
            Self::Left | Self::Right => [Self::Up, Self::Down],
        }
    }
}

/// Location of a single grid cell expressed as `x` and `y` coordinates.
///
/// Row zero is the bottom of the field; [`Direction::Up`] increases `y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    x: u32,
    y: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row of the cell, counted from the bottom.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Neighboring cell one step away, or `None` when the step underflows.
    ///
    /// Upper bounds are not checked here; grid predicates reject cells that
    /// fall outside the field.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<CellCoord> {
        match direction {
            Direction::Up => self.y.checked_add(1).map(|y| Self::new(self.x, y)),
            Direction::Down => self.y.checked_sub(1).map(|y| Self::new(self.x, y)),
            Direction::Left => self.x.checked_sub(1).map(|x| Self::new(x, self.y)),
            Direction::Right => self.x.checked_add(1).map(|x| Self::new(x, self.y)),
        }
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.x.abs_diff(other.x).saturating_add(self.y.abs_diff(other.y))
    }

    /// Squared Euclidean distance between two cell coordinates.
    #[must_use]
    pub fn distance_squared(self, other: CellCoord) -> u64 {
        let dx = u64::from(self.x.abs_diff(other.x));
        let dy = u64::from(self.y.abs_diff(other.y));
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
    }
}

/// Unique identifier assigned to an actor by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(u32);

impl ActorId {
    /// Creates a new actor identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Strength variant of a protester.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProtesterKind {
    /// Base protester that leaves the field as soon as it is bribed.
    Regular,
    /// Tougher protester that tracks the player and resists bribes.
    Hardcore,
}

/// Transient goodie that grants the player a consumable charge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GoodieKind {
    /// Grants two sonar charges.
    SonarKit,
    /// Grants five water charges.
    WaterPool,
}

/// Tag describing the kind of an actor for event reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Falling hazard that blocks movement while supported.
    Boulder,
    /// Short-range water projectile fired by the player.
    Squirt,
    /// Hidden oil barrel the player must collect.
    Barrel,
    /// Gold nugget, either level-placed or dropped by the player.
    GoldNugget,
    /// Transient goodie.
    Goodie(GoodieKind),
    /// Hostile agent.
    Protester(ProtesterKind),
}

/// What hurt a character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DamageCause {
    /// Hit by a squirt.
    Squirt,
    /// Crushed by a falling boulder.
    Boulder,
}

/// Action requested by the host for the player on a given tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerAction {
    /// Stand still.
    #[default]
    None,
    /// Turn toward, or step in, the provided direction.
    Move(Direction),
    /// Fire a squirt in the facing direction.
    Spray,
    /// Spend a sonar charge to reveal nearby hidden objects.
    Sonar,
    /// Drop a gold nugget as a bribe.
    DropGold,
    /// Abandon the current attempt at the level.
    GiveUp,
}

/// Named sound cues the host may play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sound {
    /// Ice was dug out.
    Dig,
    /// The player fired a squirt.
    PlayerSquirt,
    /// Sonar pulse.
    Sonar,
    /// An oil barrel was collected.
    FoundOil,
    /// Gold, a sonar kit or a water pool was collected.
    GotGoodie,
    /// A boulder started to fall.
    FallingRock,
    /// A protester shouted at the player.
    ProtesterYell,
    /// A protester was hurt without giving up.
    ProtesterAnnoyed,
    /// A protester gave up.
    ProtesterGiveUp,
    /// A protester picked up a bribe.
    ProtesterFoundGold,
    /// The player died.
    PlayerGiveUp,
    /// All barrels were collected.
    FinishedLevel,
}

impl Sound {
    /// Stable identifier the host maps to an audio asset.
    #[must_use]
    pub const fn identifier(self) -> &'static str {
        match self {
            Self::Dig => "dig",
            Self::PlayerSquirt => "player_squirt",
            Self::Sonar => "sonar",
            Self::FoundOil => "found_oil",
            Self::GotGoodie => "got_goodie",
            Self::FallingRock => "falling_rock",
            Self::ProtesterYell => "protester_yell",
            Self::ProtesterAnnoyed => "protester_annoyed",
            Self::ProtesterGiveUp => "protester_give_up",
            Self::ProtesterFoundGold => "protester_found_gold",
            Self::PlayerGiveUp => "player_give_up",
            Self::FinishedLevel => "finished_level",
        }
    }
}

/// Reasons a placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlacementError {
    /// The footprint extends beyond the field.
    OutOfBounds,
    /// The footprint overlaps the player's starting shaft.
    InShaft,
    /// A blocking actor already sits at the requested location.
    Occupied,
}

/// Outcome reported to the host after every tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LevelStatus {
    /// The level is still in progress.
    #[default]
    Continue,
    /// The player collected every required barrel.
    LevelFinished,
    /// The player died.
    PlayerDied,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Resets the field and the player for a fresh attempt at a level.
    ConfigureLevel {
        /// Level whose rules apply.
        level: Level,
        /// Seed for the world's random source.
        seed: u64,
    },
    /// Places a stable boulder, clearing the ice under its footprint.
    PlaceBoulder {
        /// Anchor of the boulder footprint.
        cell: CellCoord,
    },
    /// Places a hidden, permanent gold nugget.
    PlaceGoldNugget {
        /// Anchor of the nugget footprint.
        cell: CellCoord,
    },
    /// Places a hidden oil barrel.
    PlaceBarrel {
        /// Anchor of the barrel footprint.
        cell: CellCoord,
    },
    /// Spawns a protester at the field exit.
    SpawnProtester {
        /// Strength variant to spawn.
        kind: ProtesterKind,
    },
    /// Spawns a transient goodie.
    SpawnGoodie {
        /// Goodie to spawn.
        kind: GoodieKind,
        /// Anchor of the goodie footprint.
        cell: CellCoord,
        /// Number of ticks before the goodie disappears.
        lifetime: u32,
    },
    /// Runs the player and actor phases of one tick, then sweeps and evaluates.
    Tick {
        /// Action the host requested for the player.
        action: PlayerAction,
    },
    /// Releases every actor and all remaining ice.
    Teardown,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// The field was reset for the provided level.
    LevelConfigured {
        /// Level whose rules now apply.
        level: Level,
    },
    /// A tick's action phase started.
    TimeAdvanced {
        /// Index of the tick, starting at one.
        tick: u64,
    },
    /// A sound cue should be played.
    SoundPlayed {
        /// Sound to play.
        sound: Sound,
    },
    /// The host should add points to the score.
    PointsAwarded {
        /// Number of points earned.
        points: u32,
    },
    /// An actor joined the registry.
    ActorSpawned {
        /// Identifier allocated to the actor.
        actor: ActorId,
        /// Kind of actor that spawned.
        kind: EntityKind,
        /// Anchor of the actor footprint.
        cell: CellCoord,
    },
    /// A placement command was refused.
    PlacementRejected {
        /// Kind of actor that was requested.
        kind: EntityKind,
        /// Anchor provided in the request.
        cell: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// A boulder lost its support and started its countdown.
    BoulderDestabilized {
        /// Boulder that lost support.
        actor: ActorId,
    },
    /// A protester gave up or died.
    ProtesterDefeated {
        /// Protester that was defeated.
        actor: ActorId,
        /// What defeated it.
        cause: DamageCause,
    },
    /// A dead actor was evicted by the end-of-tick sweep.
    ActorRemoved {
        /// Identifier of the evicted actor.
        actor: ActorId,
    },
    /// The level reached a terminal status.
    LevelEnded {
        /// Terminal status.
        status: LevelStatus,
    },
}

/// Player-facing summary the host renders at the top of the screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusLine {
    /// Current level.
    pub level: Level,
    /// Remaining lives, owned by the host.
    pub lives: u32,
    /// Player hit points out of ten.
    pub health: u32,
    /// Water charges.
    pub water: u32,
    /// Gold nuggets carried.
    pub gold: u32,
    /// Barrels still hidden in the field.
    pub barrels_left: u32,
    /// Sonar charges.
    pub sonar: u32,
    /// Score, owned by the host.
    pub score: u32,
}

impl StatusLine {
    /// Health expressed as a percentage, clamped to `0..=100`.
    #[must_use]
    pub fn health_percent(&self) -> u32 {
        self.health.saturating_mul(10).min(100)
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lvl: {:>2} Lives: {} Hlth: {:>3}% Wtr: {:>2} Gld: {:>2} Oil Left: {:>2} Sonar: {:>2} Scr: {:06}",
            self.level.get(),
            self.lives,
            self.health_percent(),
            self.water,
            self.gold,
            self.barrels_left,
            self.sonar,
            self.score,
        )
    }
}
