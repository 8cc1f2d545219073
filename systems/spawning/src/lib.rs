#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawning system that populates a level and keeps it stocked with
//! protesters and goodies.
//!
//! The system never mutates the world. It reads world queries, draws from its
//! own seeded random source and emits [`Command`] values that the world
//! validates and executes.

use iceman_core::{CellCoord, Command, GoodieKind, Level, ProtesterKind, MAX_ANCHOR};
use iceman_world::{query, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Distance every new object must keep from previously placed objects.
pub const PLACEMENT_SPACING: u32 = 6;

/// Where the sonar kit always appears.
pub const SONAR_KIT_CELL: CellCoord = CellCoord::new(0, 60);

const BOULDER_LOWEST_ROW: u32 = 20;
const OBJECT_HIGHEST_ROW: u32 = 56;
const MAX_PLACEMENT_ATTEMPTS: usize = 1_000;
const SONAR_KIT_SHARE: u32 = 5;

/// Per-level quantities derived from the level number.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelPlan {
    /// Boulders placed at level start.
    pub boulders: u32,
    /// Gold nuggets placed at level start.
    pub gold_nuggets: u32,
    /// Barrels placed at level start; all of them must be collected.
    pub barrels: u32,
    /// Maximum number of protesters alive at once.
    pub protester_cap: u32,
    /// Ticks between protester spawns.
    pub spawn_interval: u32,
    /// Chance, in percent, that a new protester is the hardcore variant.
    pub hardcore_percent: u32,
    /// Ticks a goodie stays in the field.
    pub goodie_lifetime: u32,
    /// A goodie appears on a tick with probability `1 / goodie_odds`.
    pub goodie_odds: u32,
}

impl LevelPlan {
    /// Computes the plan for the provided level.
    #[must_use]
    pub fn for_level(level: Level) -> Self {
        let level = level.get();
        Self {
            boulders: (level / 2).saturating_add(2).min(9),
            gold_nuggets: 5u32.saturating_sub(level / 2).max(2),
            barrels: level.saturating_add(2).min(21),
            protester_cap: (level.saturating_mul(3) / 2).saturating_add(2).min(15),
            spawn_interval: 200u32.saturating_sub(level).max(25),
            hardcore_percent: level.saturating_mul(10).saturating_add(30).min(90),
            goodie_lifetime: 300u32.saturating_sub(level.saturating_mul(10)).max(100),
            goodie_odds: level.saturating_mul(25).saturating_add(300),
        }
    }
}

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    level: Level,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration for the provided level and seed.
    #[must_use]
    pub const fn new(level: Level, rng_seed: u64) -> Self {
        Self { level, rng_seed }
    }
}

/// Pure system that emits placement and spawn commands.
#[derive(Clone, Debug)]
pub struct Spawning {
    plan: LevelPlan,
    rng: ChaCha8Rng,
    ticks_until_protester: u32,
}

#[derive(Clone, Copy, Debug)]
enum Placement {
    Boulder,
    GoldNugget,
    Barrel,
}

impl Placement {
    fn lowest_row(self) -> u32 {
        match self {
            Self::Boulder => BOULDER_LOWEST_ROW,
            Self::GoldNugget | Self::Barrel => 0,
        }
    }

    fn command(self, cell: CellCoord) -> Command {
        match self {
            Self::Boulder => Command::PlaceBoulder { cell },
            Self::GoldNugget => Command::PlaceGoldNugget { cell },
            Self::Barrel => Command::PlaceBarrel { cell },
        }
    }
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let plan = LevelPlan::for_level(config.level);
        Self {
            plan,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            ticks_until_protester: plan.spawn_interval,
        }
    }

    /// Replaces the random source with one derived from `rng_seed`.
    pub fn reseed(&mut self, rng_seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(rng_seed);
    }

    /// Ticks left before the next protester may spawn.
    #[must_use]
    pub fn ticks_until_protester(&self) -> u32 {
        self.ticks_until_protester
    }

    /// Emits the level's boulders, gold nuggets and barrels, then the first
    /// protester.
    ///
    /// Objects that cannot be placed within the attempt budget are skipped.
    pub fn populate(&mut self, world: &World, out: &mut Vec<Command>) {
        let mut placed = query::placed_object_cells(world);
        let batches = [
            (Placement::Boulder, self.plan.boulders),
            (Placement::GoldNugget, self.plan.gold_nuggets),
            (Placement::Barrel, self.plan.barrels),
        ];
        for (placement, count) in batches {
            for _ in 0..count {
                match self.pick_location(placement, &placed) {
                    Some(cell) => {
                        placed.push(cell);
                        out.push(placement.command(cell));
                    }
                    None => tracing::warn!(
                        ?placement,
                        attempts = MAX_PLACEMENT_ATTEMPTS,
                        "no spaced location left; skipping placement"
                    ),
                }
            }
        }
        tracing::debug!(
            level_objects = placed.len(),
            barrels = self.plan.barrels,
            "level populated"
        );

        out.push(self.protester_command());
        self.ticks_until_protester = self.plan.spawn_interval;
    }

    /// Counts down toward the next protester spawn.
    pub fn advance_countdown(&mut self) {
        self.ticks_until_protester = self.ticks_until_protester.saturating_sub(1);
    }

    /// Rolls for a goodie and spawns a protester once the countdown elapsed.
    pub fn handle(&mut self, world: &World, out: &mut Vec<Command>) {
        if self.rng.gen_range(0..self.plan.goodie_odds.max(1)) == 0 {
            if let Some(command) = self.goodie_command(world) {
                out.push(command);
            }
        }

        let protesters = u32::try_from(query::protester_count(world)).unwrap_or(u32::MAX);
        if self.ticks_until_protester == 0 && protesters < self.plan.protester_cap {
            out.push(self.protester_command());
            self.ticks_until_protester = self.plan.spawn_interval;
        }
    }

    fn pick_location(&mut self, placement: Placement, placed: &[CellCoord]) -> Option<CellCoord> {
        (0..MAX_PLACEMENT_ATTEMPTS).find_map(|_| {
            let cell = CellCoord::new(
                self.rng.gen_range(0..=MAX_ANCHOR),
                self.rng.gen_range(placement.lowest_row()..=OBJECT_HIGHEST_ROW),
            );
            let spaced = placed
                .iter()
                .all(|other| World::outside_radius(cell, *other, PLACEMENT_SPACING));
            (spaced && !query::overlaps_shaft(cell)).then_some(cell)
        })
    }

    fn protester_command(&mut self) -> Command {
        let kind = if self.rng.gen_range(0..100) < self.plan.hardcore_percent {
            ProtesterKind::Hardcore
        } else {
            ProtesterKind::Regular
        };
        tracing::debug!(?kind, "spawning protester");
        Command::SpawnProtester { kind }
    }

    fn goodie_command(&mut self, world: &World) -> Option<Command> {
        let lifetime = self.plan.goodie_lifetime;
        if self.rng.gen_range(0..SONAR_KIT_SHARE) == 0 {
            tracing::debug!("spawning sonar kit");
            return Some(Command::SpawnGoodie {
                kind: GoodieKind::SonarKit,
                cell: SONAR_KIT_CELL,
                lifetime,
            });
        }

        let open: Vec<CellCoord> = (0..=MAX_ANCHOR)
            .flat_map(|y| (0..=MAX_ANCHOR).map(move |x| CellCoord::new(x, y)))
            .filter(|cell| query::footprint_is_open(world, *cell))
            .collect();
        if open.is_empty() {
            return None;
        }
        let cell = open[self.rng.gen_range(0..open.len())];
        tracing::debug!(x = cell.x(), y = cell.y(), "spawning water pool");
        Some(Command::SpawnGoodie {
            kind: GoodieKind::WaterPool,
            cell,
            lifetime,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_level_plan_matches_formulas() {
        let plan = LevelPlan::for_level(Level::new(0));
        assert_eq!(
            plan,
            LevelPlan {
                boulders: 2,
                gold_nuggets: 5,
                barrels: 2,
                protester_cap: 2,
                spawn_interval: 200,
                hardcore_percent: 30,
                goodie_lifetime: 300,
                goodie_odds: 300,
            }
        );
    }

    #[test]
    fn late_levels_clamp() {
        let plan = LevelPlan::for_level(Level::new(100));
        assert_eq!(plan.boulders, 9);
        assert_eq!(plan.gold_nuggets, 2);
        assert_eq!(plan.barrels, 21);
        assert_eq!(plan.protester_cap, 15);
        assert_eq!(plan.spawn_interval, 100);
        assert_eq!(plan.hardcore_percent, 90);
        assert_eq!(plan.goodie_lifetime, 100);
        assert_eq!(plan.goodie_odds, 2_800);
    }

    #[test]
    fn reseeding_restarts_the_random_sequence() {
        let mut fresh = Spawning::new(Config::new(Level::new(0), 5));
        let mut reseeded = Spawning::new(Config::new(Level::new(0), 1));
        let _ = reseeded.rng.gen_range(0..100u32);
        reseeded.reseed(5);

        let draws = |spawning: &mut Spawning| -> Vec<u32> {
            (0..16).map(|_| spawning.rng.gen_range(0..1_000)).collect()
        };
        assert_eq!(draws(&mut fresh), draws(&mut reseeded));
    }

    #[test]
    fn countdown_saturates() {
        let mut spawning = Spawning::new(Config::new(Level::new(0), 1));
        spawning.ticks_until_protester = 1;
        spawning.advance_countdown();
        spawning.advance_countdown();
        assert_eq!(spawning.ticks_until_protester(), 0);
    }

    #[test]
    fn pick_location_respects_spacing_and_rows() {
        let mut spawning = Spawning::new(Config::new(Level::new(0), 99));
        let mut placed = Vec::new();
        for _ in 0..6 {
            let cell = spawning
                .pick_location(Placement::Boulder, &placed)
                .expect("sparse field has room");
            assert!((BOULDER_LOWEST_ROW..=OBJECT_HIGHEST_ROW).contains(&cell.y()));
            assert!(!query::overlaps_shaft(cell));
            assert!(placed
                .iter()
                .all(|other| World::outside_radius(cell, *other, PLACEMENT_SPACING)));
            placed.push(cell);
        }
    }
}
