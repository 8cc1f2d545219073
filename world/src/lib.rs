#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for the Iceman simulation.

mod actors;
mod grid;
pub mod navigation;
mod player;
mod protester;

use iceman_core::{
    CellCoord, Command, DamageCause, Direction, Event, Level, LevelStatus, PlacementError,
    PlayerAction, Sound, MAX_ANCHOR,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::actors::{ActorKind, ActorRegistry, BoulderState, NuggetLifetime, BOULDER_WAIT_TICKS};
use crate::grid::{anchor_in_bounds, overlaps_shaft, IceField};
use crate::navigation::Route;
use crate::player::Player;
use crate::protester::Protester;

pub use crate::player::PLAYER_START;

/// Anchor where protesters spawn and where leaving protesters exit.
pub const PROTESTER_EXIT: CellCoord = CellCoord::new(MAX_ANCHOR, MAX_ANCHOR);

/// Radius within which two footprints are considered touching.
pub const CONTACT_RADIUS: u32 = 4;
/// Radius within which hidden objects become visible to the player.
pub const REVEAL_RADIUS: u32 = 5;
/// Radius within which a protester shouts at the player.
pub const YELL_RADIUS: u32 = 4;
/// Radius revealed by a sonar pulse.
pub const SONAR_RADIUS: u32 = 12;
/// Tiles a squirt may travel after it spawns.
pub const SQUIRT_RANGE: u32 = 8;

const SQUIRT_SPAWN_DISTANCE: u32 = 4;
const SQUIRT_DAMAGE: u32 = 2;
const BOULDER_DAMAGE: u32 = 100;
const TEMPORARY_GOLD_LIFETIME: u32 = 100;

const BARREL_POINTS: u32 = 1_000;
const GOLD_POINTS: u32 = 10;
const SONAR_KIT_POINTS: u32 = 75;
const WATER_POOL_POINTS: u32 = 100;

/// Represents the authoritative state of one level.
#[derive(Clone, Debug)]
pub struct World {
    level: Level,
    ice: IceField,
    player: Player,
    actors: ActorRegistry,
    rng: ChaCha8Rng,
    barrels_required: u32,
    tick_index: u64,
    status: LevelStatus,
}

impl World {
    /// Creates a world configured for the first level with a fixed seed.
    #[must_use]
    pub fn new() -> Self {
        Self::configured(Level::new(0), 0)
    }

    fn configured(level: Level, seed: u64) -> Self {
        Self {
            level,
            ice: IceField::level_layout(),
            player: Player::new(),
            actors: ActorRegistry::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            barrels_required: 0,
            tick_index: 0,
            status: LevelStatus::Continue,
        }
    }

    /// Replaces the world's random source with one derived from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    /// Reports whether two anchors lie strictly closer than `radius`.
    #[must_use]
    pub fn within_radius(a: CellCoord, b: CellCoord, radius: u32) -> bool {
        a.distance_squared(b) < u64::from(radius) * u64::from(radius)
    }

    /// Reports whether two anchors lie strictly farther apart than `radius`.
    #[must_use]
    pub fn outside_radius(a: CellCoord, b: CellCoord, radius: u32) -> bool {
        a.distance_squared(b) > u64::from(radius) * u64::from(radius)
    }

    /// Reports whether the anchor one step in `direction` touches a blocking boulder.
    #[must_use]
    pub fn blocked_by_boulder(&self, anchor: CellCoord, direction: Direction) -> bool {
        anchor
            .step(direction)
            .is_some_and(|next| self.boulder_near(next))
    }

    /// Next anchor in `direction` when a protester or squirt could occupy it.
    #[must_use]
    pub fn can_move_to(&self, anchor: CellCoord, direction: Direction) -> Option<CellCoord> {
        let next = anchor.step(direction)?;
        self.is_traversable(next).then_some(next)
    }

    /// Reports whether the living player is strictly closer than `radius`.
    #[must_use]
    pub fn player_within(&self, anchor: CellCoord, radius: u32) -> bool {
        self.player.alive && Self::within_radius(self.player.cell, anchor, radius)
    }

    /// Direction toward the player when it shares a row or column with `anchor`
    /// and every anchor between them is traversable.
    #[must_use]
    pub fn line_of_sight_to_player(&self, anchor: CellCoord) -> Option<Direction> {
        let target = self.player.cell;
        let direction = if anchor == target {
            return None;
        } else if anchor.x() == target.x() {
            if target.y() > anchor.y() {
                Direction::Up
            } else {
                Direction::Down
            }
        } else if anchor.y() == target.y() {
            if target.x() > anchor.x() {
                Direction::Right
            } else {
                Direction::Left
            }
        } else {
            return None;
        };

        let mut cell = anchor;
        while cell != target {
            cell = cell.step(direction)?;
            if !self.is_traversable(cell) {
                return None;
            }
        }
        Some(direction)
    }

    /// First step of the shortest traversable route from `anchor` to the player.
    #[must_use]
    pub fn direction_toward_player(&self, anchor: CellCoord) -> Option<Direction> {
        self.route_to_player(anchor).and_then(|route| route.first_step)
    }

    /// Length of the shortest traversable route from `anchor` to the player.
    #[must_use]
    pub fn steps_to_player(&self, anchor: CellCoord) -> Option<u32> {
        self.route_to_player(anchor).map(|route| route.steps)
    }

    /// Clears the ice under the footprint at `anchor` and destabilizes every
    /// stable boulder left without support.
    pub fn clear_ice(&mut self, anchor: CellCoord, out_events: &mut Vec<Event>) -> usize {
        let removed = self.ice.clear_footprint(anchor);
        if removed > 0 {
            out_events.push(Event::SoundPlayed { sound: Sound::Dig });
        }

        for actor in self.actors.iter_mut() {
            if !matches!(actor.kind, ActorKind::Boulder(BoulderState::Stable)) {
                continue;
            }
            if actor.cell.y() == 0 || self.ice.has_ice_below(actor.cell) {
                continue;
            }
            tracing::trace!(actor = actor.id.get(), "boulder lost support");
            actor.kind = ActorKind::Boulder(BoulderState::Waiting {
                ticks_left: BOULDER_WAIT_TICKS,
            });
            out_events.push(Event::BoulderDestabilized { actor: actor.id });
        }
        removed
    }

    /// Spends a water charge and fires a squirt four tiles ahead of the player.
    pub fn spray(&mut self, out_events: &mut Vec<Event>) {
        if self.player.water == 0 {
            return;
        }
        self.player.water -= 1;
        out_events.push(Event::SoundPlayed {
            sound: Sound::PlayerSquirt,
        });

        let facing = self.player.facing;
        let landing = (0..SQUIRT_SPAWN_DISTANCE)
            .try_fold(self.player.cell, |cell, _| cell.step(facing))
            .filter(|cell| self.is_traversable(*cell));
        if let Some(cell) = landing {
            self.spawn(
                cell,
                facing,
                ActorKind::Squirt {
                    range_left: SQUIRT_RANGE,
                },
                out_events,
            );
        }
    }

    /// Spends a gold nugget and drops it as a bribe at the player's anchor.
    pub fn drop_gold(&mut self, out_events: &mut Vec<Event>) {
        if self.player.gold == 0 {
            return;
        }
        self.player.gold -= 1;
        self.spawn(
            self.player.cell,
            Direction::Right,
            ActorKind::GoldNugget {
                revealed: true,
                lifetime: NuggetLifetime::Temporary {
                    ticks_left: TEMPORARY_GOLD_LIFETIME,
                },
            },
            out_events,
        );
    }

    /// Spends a sonar charge and reveals hidden objects around the player.
    pub fn activate_sonar(&mut self, out_events: &mut Vec<Event>) {
        if self.player.sonar == 0 {
            return;
        }
        self.player.sonar -= 1;
        out_events.push(Event::SoundPlayed { sound: Sound::Sonar });
        let revealed = actors::reveal_within(&mut self.actors, self.player.cell, SONAR_RADIUS);
        tracing::debug!(revealed, "sonar pulse");
    }

    fn is_traversable(&self, anchor: CellCoord) -> bool {
        anchor_in_bounds(anchor) && self.ice.footprint_is_open(anchor) && !self.boulder_near(anchor)
    }

    fn boulder_near(&self, anchor: CellCoord) -> bool {
        self.actors
            .iter()
            .any(|actor| actor.blocks_movement() && Self::within_radius(actor.cell, anchor, CONTACT_RADIUS))
    }

    fn faces_player(&self, anchor: CellCoord, facing: Direction) -> bool {
        let player = self.player.cell;
        match facing {
            Direction::Up => player.y() >= anchor.y(),
            Direction::Down => player.y() <= anchor.y(),
            Direction::Left => player.x() <= anchor.x(),
            Direction::Right => player.x() >= anchor.x(),
        }
    }

    fn route(&self, source: CellCoord, target: CellCoord) -> Option<Route> {
        navigation::shortest_route(MAX_ANCHOR + 1, MAX_ANCHOR + 1, source, target, |cell| {
            self.is_traversable(cell)
        })
    }

    fn route_to_player(&self, anchor: CellCoord) -> Option<Route> {
        if !self.player.alive {
            return None;
        }
        self.route(anchor, self.player.cell)
    }

    fn direction_toward(&self, source: CellCoord, target: CellCoord) -> Option<Direction> {
        self.route(source, target).and_then(|route| route.first_step)
    }

    /// Registry indices of living protesters strictly closer than `radius`.
    fn protesters_within(&self, cell: CellCoord, radius: u32) -> Vec<usize> {
        (0..self.actors.len())
            .filter(|index| {
                self.actors.get(*index).is_some_and(|actor| {
                    actor.protester().is_some() && Self::within_radius(actor.cell, cell, radius)
                })
            })
            .collect()
    }

    fn annoy_protester(
        &mut self,
        index: usize,
        amount: u32,
        cause: DamageCause,
        out_events: &mut Vec<Event>,
    ) {
        let Some(mut actor) = self.actors.get(index).copied() else {
            return;
        };
        let Some(protester) = actor.protester_mut() else {
            return;
        };
        let outcome = protester.annoy(self.level, amount, cause);
        if outcome.died {
            actor.alive = false;
        }

        if let Some(sound) = outcome.sound {
            out_events.push(Event::SoundPlayed { sound });
        }
        if outcome.defeated {
            tracing::debug!(actor = actor.id.get(), ?cause, points = outcome.points, "protester defeated");
            out_events.push(Event::ProtesterDefeated {
                actor: actor.id,
                cause,
            });
            out_events.push(Event::PointsAwarded {
                points: outcome.points,
            });
        }
        self.actors.replace(index, actor);
    }

    fn bribe_protester(&mut self, index: usize, out_events: &mut Vec<Event>) {
        let Some(mut actor) = self.actors.get(index).copied() else {
            return;
        };
        let Some(protester) = actor.protester_mut() else {
            return;
        };
        let points = protester.got_bribed(self.level);
        out_events.push(Event::SoundPlayed {
            sound: Sound::ProtesterFoundGold,
        });
        out_events.push(Event::PointsAwarded { points });
        self.actors.replace(index, actor);
    }

    fn spawn(
        &mut self,
        cell: CellCoord,
        facing: Direction,
        kind: ActorKind,
        out_events: &mut Vec<Event>,
    ) {
        let entity = kind.entity_kind();
        let id = self.actors.insert(cell, facing, kind);
        out_events.push(Event::ActorSpawned {
            actor: id,
            kind: entity,
            cell,
        });
    }

    fn validate_placement(&self, cell: CellCoord, avoid_shaft: bool) -> Result<(), PlacementError> {
        if !anchor_in_bounds(cell) {
            return Err(PlacementError::OutOfBounds);
        }
        if avoid_shaft && overlaps_shaft(cell) {
            return Err(PlacementError::InShaft);
        }
        if self.boulder_near(cell) {
            return Err(PlacementError::Occupied);
        }
        Ok(())
    }

    fn place(
        &mut self,
        cell: CellCoord,
        facing: Direction,
        kind: ActorKind,
        avoid_shaft: bool,
        out_events: &mut Vec<Event>,
    ) -> bool {
        match self.validate_placement(cell, avoid_shaft) {
            Ok(()) => {
                self.spawn(cell, facing, kind, out_events);
                true
            }
            Err(reason) => {
                let entity = kind.entity_kind();
                tracing::debug!(?entity, x = cell.x(), y = cell.y(), ?reason, "placement rejected");
                out_events.push(Event::PlacementRejected {
                    kind: entity,
                    cell,
                    reason,
                });
                false
            }
        }
    }

    fn tick(&mut self, action: PlayerAction, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced {
            tick: self.tick_index,
        });

        player::act(self, action, out_events);

        let acting = self.actors.len();
        for index in 0..acting {
            let Some(mut actor) = self.actors.get(index).copied() else {
                break;
            };
            if !actor.alive {
                continue;
            }
            actors::act(self, &mut actor, out_events);
            self.actors.replace(index, actor);
        }

        self.actors.decay();
        self.actors.sweep(out_events);
        self.evaluate(out_events);
    }

    fn evaluate(&mut self, out_events: &mut Vec<Event>) {
        if self.status != LevelStatus::Continue {
            return;
        }
        let status = if self.player.barrels >= self.barrels_required {
            LevelStatus::LevelFinished
        } else if !self.player.alive {
            LevelStatus::PlayerDied
        } else {
            LevelStatus::Continue
        };
        if status == LevelStatus::Continue {
            return;
        }

        tracing::info!(?status, tick = self.tick_index, level = self.level.get(), "level ended");
        if status == LevelStatus::LevelFinished {
            out_events.push(Event::SoundPlayed {
                sound: Sound::FinishedLevel,
            });
        }
        self.status = status;
        out_events.push(Event::LevelEnded { status });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureLevel { level, seed } => {
            tracing::debug!(level = level.get(), seed, "configuring level");
            *world = World::configured(level, seed);
            out_events.push(Event::LevelConfigured { level });
        }
        Command::PlaceBoulder { cell } => {
            let kind = ActorKind::Boulder(BoulderState::Stable);
            if world.place(cell, Direction::Down, kind, true, out_events) {
                let _ = world.ice.clear_footprint(cell);
            }
        }
        Command::PlaceGoldNugget { cell } => {
            let kind = ActorKind::GoldNugget {
                revealed: false,
                lifetime: NuggetLifetime::Permanent,
            };
            let _ = world.place(cell, Direction::Right, kind, true, out_events);
        }
        Command::PlaceBarrel { cell } => {
            let kind = ActorKind::Barrel { revealed: false };
            if world.place(cell, Direction::Right, kind, true, out_events) {
                world.barrels_required += 1;
            }
        }
        Command::SpawnProtester { kind } => {
            let steps_left = protester::random_step_budget(world);
            let state = Protester::new(kind, world.level, steps_left);
            let spawned = world.place(
                PROTESTER_EXIT,
                Direction::Left,
                ActorKind::Protester(state),
                false,
                out_events,
            );
            if spawned {
                tracing::debug!(?kind, "protester spawned");
            }
        }
        Command::SpawnGoodie {
            kind,
            cell,
            lifetime,
        } => {
            let goodie = ActorKind::Goodie {
                kind,
                ticks_left: lifetime,
            };
            let _ = world.place(cell, Direction::Right, goodie, false, out_events);
        }
        Command::Tick { action } => world.tick(action, out_events),
        Command::Teardown => {
            tracing::debug!(level = world.level.get(), "tearing down level");
            world.actors.clear();
            world.ice.clear_all();
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use iceman_core::{
        ActorId, CellCoord, Direction, EntityKind, Level, LevelStatus, StatusLine,
    };

    use super::{ActorKind, BoulderState, World};

    /// Level whose rules currently apply.
    #[must_use]
    pub fn level(world: &World) -> Level {
        world.level
    }

    /// Number of ticks executed since the level was configured.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Terminal status of the level, or `Continue` while it is in progress.
    #[must_use]
    pub fn status(world: &World) -> LevelStatus {
        world.status
    }

    /// Reports whether the cell is in bounds and free of ice.
    #[must_use]
    pub fn is_open(world: &World, cell: CellCoord) -> bool {
        world.ice.is_open(cell)
    }

    /// Reports whether the footprint anchored at `anchor` is in bounds and ice-free.
    #[must_use]
    pub fn footprint_is_open(world: &World, anchor: CellCoord) -> bool {
        world.ice.footprint_is_open(anchor)
    }

    /// Reports whether a footprint at `anchor` would overlap the starting shaft.
    #[must_use]
    pub fn overlaps_shaft(anchor: CellCoord) -> bool {
        super::overlaps_shaft(anchor)
    }

    /// Number of cells that still hold ice.
    #[must_use]
    pub fn ice_count(world: &World) -> usize {
        world.ice.ice_count()
    }

    /// Number of living protesters.
    #[must_use]
    pub fn protester_count(world: &World) -> usize {
        world
            .actors
            .iter()
            .filter(|actor| actor.protester().is_some())
            .count()
    }

    /// Anchors of the boulders, gold nuggets and barrels currently in the field.
    #[must_use]
    pub fn placed_object_cells(world: &World) -> Vec<CellCoord> {
        world
            .actors
            .iter()
            .filter(|actor| {
                matches!(
                    actor.kind,
                    ActorKind::Boulder(_) | ActorKind::GoldNugget { .. } | ActorKind::Barrel { .. }
                )
            })
            .map(|actor| actor.cell)
            .collect()
    }

    /// Barrels that still have to be collected to finish the level.
    #[must_use]
    pub fn barrels_remaining(world: &World) -> u32 {
        world.barrels_required.saturating_sub(world.player.barrels)
    }

    /// Builds the status line using the host's lives and score bookkeeping.
    #[must_use]
    pub fn status_line(world: &World, lives: u32, score: u32) -> StatusLine {
        StatusLine {
            level: world.level,
            lives,
            health: world.player.health,
            water: world.player.water,
            gold: world.player.gold,
            barrels_left: barrels_remaining(world),
            sonar: world.player.sonar,
            score,
        }
    }

    /// Captures the player's position and inventory.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        let player = &world.player;
        PlayerSnapshot {
            cell: player.cell,
            facing: player.facing,
            alive: player.alive,
            health: player.health,
            water: player.water,
            sonar: player.sonar,
            gold: player.gold,
            barrels: player.barrels,
        }
    }

    /// Captures a read-only view of the living actors in action order.
    #[must_use]
    pub fn actor_view(world: &World) -> ActorView {
        let snapshots = world
            .actors
            .iter()
            .map(|actor| ActorSnapshot {
                id: actor.id,
                kind: actor.entity_kind(),
                cell: actor.cell,
                facing: actor.facing,
                visible: actor.visible(),
                blocks_movement: actor.blocks_movement(),
                boulder: match actor.kind {
                    ActorKind::Boulder(BoulderState::Stable) => Some(BoulderPhase::Stable),
                    ActorKind::Boulder(BoulderState::Waiting { ticks_left }) => {
                        Some(BoulderPhase::Waiting { ticks_left })
                    }
                    ActorKind::Boulder(BoulderState::Falling) => Some(BoulderPhase::Falling),
                    _ => None,
                },
                health: actor.protester().map(|protester| protester.health()),
                leaving: actor.protester().is_some_and(|protester| protester.is_leaving()),
            })
            .collect();
        ActorView { snapshots }
    }

    /// Player state exposed to hosts and tests.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct PlayerSnapshot {
        /// Anchor of the player footprint.
        pub cell: CellCoord,
        /// Direction the player faces.
        pub facing: Direction,
        /// Whether the player is still alive.
        pub alive: bool,
        /// Hit points left.
        pub health: u32,
        /// Water charges.
        pub water: u32,
        /// Sonar charges.
        pub sonar: u32,
        /// Gold nuggets carried.
        pub gold: u32,
        /// Barrels collected so far.
        pub barrels: u32,
    }

    /// Read-only snapshot of every living actor.
    #[derive(Clone, Debug)]
    pub struct ActorView {
        snapshots: Vec<ActorSnapshot>,
    }

    impl ActorView {
        /// Iterator over the captured snapshots in action order.
        pub fn iter(&self) -> impl Iterator<Item = &ActorSnapshot> {
            self.snapshots.iter()
        }

        /// Consumes the view, yielding the underlying snapshots.
        pub fn into_vec(self) -> Vec<ActorSnapshot> {
            self.snapshots
        }
    }

    /// Phase of a boulder's fall.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub enum BoulderPhase {
        /// Supported by ice.
        Stable,
        /// Lost its support and is about to fall.
        Waiting {
            /// Ticks before the fall starts.
            ticks_left: u32,
        },
        /// Falling one tile per tick.
        Falling,
    }

    /// Immutable representation of a single actor.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ActorSnapshot {
        /// Identifier allocated when the actor spawned.
        pub id: ActorId,
        /// Kind of actor.
        pub kind: EntityKind,
        /// Anchor of the actor footprint.
        pub cell: CellCoord,
        /// Direction the actor faces.
        pub facing: Direction,
        /// Whether the host should draw the actor.
        pub visible: bool,
        /// Whether the actor stops characters and projectiles.
        pub blocks_movement: bool,
        /// Fall phase for boulders.
        pub boulder: Option<BoulderPhase>,
        /// Remaining health for protesters.
        pub health: Option<u32>,
        /// Whether a protester is heading for the exit.
        pub leaving: bool,
    }
}
