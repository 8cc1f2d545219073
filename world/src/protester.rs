//! Hostile agent state machine.

use iceman_core::{DamageCause, Direction, Event, Level, ProtesterKind, Sound};
use rand::Rng;

use crate::actors::{Actor, ActorKind};
use crate::{World, PROTESTER_EXIT, YELL_RADIUS};

const REGULAR_HEALTH: u32 = 5;
const HARDCORE_HEALTH: u32 = 20;
const YELL_COOLDOWN: u32 = 15;
const TURN_COOLDOWN: u32 = 200;
const MIN_STEP_BUDGET: u32 = 8;
const MAX_STEP_BUDGET: u32 = 60;

/// Mutable state carried by a protester between ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Protester {
    kind: ProtesterKind,
    health: u32,
    leaving: bool,
    defeated: bool,
    ticks_to_wait: u32,
    yell_cooldown: u32,
    turn_cooldown: u32,
    steps_left: u32,
}

/// What a single damage application did to a protester.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Annoyance {
    pub(crate) died: bool,
    pub(crate) defeated: bool,
    pub(crate) points: u32,
    pub(crate) sound: Option<Sound>,
}

impl Protester {
    pub(crate) fn new(kind: ProtesterKind, level: Level, steps_left: u32) -> Self {
        Self {
            kind,
            health: starting_health(kind),
            leaving: false,
            defeated: false,
            ticks_to_wait: rest_ticks(level),
            yell_cooldown: 0,
            turn_cooldown: TURN_COOLDOWN,
            steps_left,
        }
    }

    pub(crate) fn kind(&self) -> ProtesterKind {
        self.kind
    }

    pub(crate) fn health(&self) -> u32 {
        self.health
    }

    pub(crate) fn is_leaving(&self) -> bool {
        self.leaving
    }

    /// Applies damage, starting the retreat or killing the protester as needed.
    ///
    /// Health saturates at zero and damage is applied even while leaving. Points
    /// are only granted the first time the protester is defeated.
    pub(crate) fn annoy(&mut self, level: Level, amount: u32, cause: DamageCause) -> Annoyance {
        let was_leaving = self.leaving;
        self.health = self.health.saturating_sub(amount);

        let died = self.health == 0;
        let mut sound = None;
        if died {
            sound = Some(Sound::ProtesterGiveUp);
        } else if !self.leaving {
            if self.damage_taken() * 2 >= starting_health(self.kind) {
                self.leaving = true;
                self.ticks_to_wait = 0;
                sound = Some(Sound::ProtesterGiveUp);
            } else {
                self.ticks_to_wait = stun_ticks(level);
                sound = Some(Sound::ProtesterAnnoyed);
            }
        }

        let defeated = !self.defeated && (died || (!was_leaving && self.leaving));
        if defeated {
            self.defeated = true;
        }
        Annoyance {
            died,
            defeated,
            points: if defeated { defeat_points(self.kind, cause) } else { 0 },
            sound,
        }
    }

    /// Reacts to a dropped gold nugget, returning the bribe's point value.
    pub(crate) fn got_bribed(&mut self, level: Level) -> u32 {
        match self.kind {
            ProtesterKind::Regular => {
                self.leaving = true;
                self.ticks_to_wait = 0;
                25
            }
            ProtesterKind::Hardcore => {
                self.ticks_to_wait = stun_ticks(level);
                self.steps_left = 0;
                50
            }
        }
    }

    fn damage_taken(&self) -> u32 {
        starting_health(self.kind).saturating_sub(self.health)
    }
}

/// Hit points a freshly spawned protester of the provided kind starts with.
pub(crate) fn starting_health(kind: ProtesterKind) -> u32 {
    match kind {
        ProtesterKind::Regular => REGULAR_HEALTH,
        ProtesterKind::Hardcore => HARDCORE_HEALTH,
    }
}

/// Ticks a protester rests between actions.
pub(crate) fn rest_ticks(level: Level) -> u32 {
    3u32.saturating_sub(level.get() / 4)
}

/// Ticks a protester stays stunned after being hurt or bribed.
pub(crate) fn stun_ticks(level: Level) -> u32 {
    100u32.saturating_sub(level.get().saturating_mul(10)).max(50)
}

/// Pathfinder steps within which a hardcore protester senses the player.
pub(crate) fn tracking_range(level: Level) -> u32 {
    level.get().saturating_mul(2).saturating_add(16)
}

fn defeat_points(kind: ProtesterKind, cause: DamageCause) -> u32 {
    match (cause, kind) {
        (DamageCause::Boulder, _) => 500,
        (DamageCause::Squirt, ProtesterKind::Regular) => 100,
        (DamageCause::Squirt, ProtesterKind::Hardcore) => 250,
    }
}

pub(crate) fn random_step_budget(world: &mut World) -> u32 {
    world.rng.gen_range(MIN_STEP_BUDGET..=MAX_STEP_BUDGET)
}

/// Runs one tick of protester behavior.
pub(crate) fn act(world: &mut World, actor: &mut Actor, out_events: &mut Vec<Event>) {
    let ActorKind::Protester(mut state) = actor.kind else {
        return;
    };
    decide(world, actor, &mut state, out_events);
    actor.kind = ActorKind::Protester(state);
}

fn decide(world: &mut World, actor: &mut Actor, state: &mut Protester, out_events: &mut Vec<Event>) {
    if state.ticks_to_wait > 0 {
        state.ticks_to_wait -= 1;
        return;
    }
    state.ticks_to_wait = rest_ticks(world.level);
    state.yell_cooldown = state.yell_cooldown.saturating_sub(1);
    state.turn_cooldown = state.turn_cooldown.saturating_sub(1);

    if state.leaving {
        if actor.cell == PROTESTER_EXIT {
            actor.alive = false;
            return;
        }
        if let Some(direction) = world.direction_toward(actor.cell, PROTESTER_EXIT) {
            step(world, actor, direction);
        }
        return;
    }

    let player_near = world.player.alive && world.player_within(actor.cell, YELL_RADIUS);
    if player_near && world.faces_player(actor.cell, actor.facing) {
        if state.yell_cooldown == 0 {
            state.yell_cooldown = YELL_COOLDOWN;
            out_events.push(Event::SoundPlayed {
                sound: Sound::ProtesterYell,
            });
        }
        return;
    }

    if !player_near {
        if let Some(direction) = world.line_of_sight_to_player(actor.cell) {
            step(world, actor, direction);
            state.steps_left = 0;
            return;
        }
    }

    if state.kind == ProtesterKind::Hardcore {
        let tracked = world
            .route_to_player(actor.cell)
            .filter(|route| route.steps <= tracking_range(world.level))
            .and_then(|route| route.first_step);
        if let Some(direction) = tracked {
            step(world, actor, direction);
            return;
        }
    }

    wander(world, actor, state);
}

fn wander(world: &mut World, actor: &mut Actor, state: &mut Protester) {
    state.steps_left = state.steps_left.saturating_sub(1);
    if state.steps_left == 0 {
        let open: Vec<Direction> = Direction::SEARCH_ORDER
            .into_iter()
            .filter(|direction| world.can_move_to(actor.cell, *direction).is_some())
            .collect();
        if !open.is_empty() {
            let pick = world.rng.gen_range(0..open.len());
            actor.facing = open[pick];
        }
        state.steps_left = random_step_budget(world);
    } else if state.turn_cooldown == 0 {
        let sides: Vec<Direction> = actor
            .facing
            .perpendicular()
            .into_iter()
            .filter(|direction| world.can_move_to(actor.cell, *direction).is_some())
            .collect();
        if !sides.is_empty() {
            let pick = if sides.len() > 1 {
                world.rng.gen_range(0..sides.len())
            } else {
                0
            };
            actor.facing = sides[pick];
            state.steps_left = random_step_budget(world);
            state.turn_cooldown = TURN_COOLDOWN;
        }
    }

    match world.can_move_to(actor.cell, actor.facing) {
        Some(next) => actor.cell = next,
        None => state.steps_left = 0,
    }
}

/// Faces `direction` and advances one tile when the way is open.
fn step(world: &World, actor: &mut Actor, direction: Direction) {
    actor.facing = direction;
    if let Some(next) = world.can_move_to(actor.cell, direction) {
        actor.cell = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh(kind: ProtesterKind) -> Protester {
        Protester::new(kind, Level::new(0), 10)
    }

    #[test]
    fn level_formulas_clamp() {
        assert_eq!(rest_ticks(Level::new(0)), 3);
        assert_eq!(rest_ticks(Level::new(8)), 1);
        assert_eq!(rest_ticks(Level::new(40)), 0);
        assert_eq!(stun_ticks(Level::new(0)), 100);
        assert_eq!(stun_ticks(Level::new(3)), 70);
        assert_eq!(stun_ticks(Level::new(9)), 50);
        assert_eq!(stun_ticks(Level::new(u32::MAX)), 50);
        assert_eq!(tracking_range(Level::new(2)), 20);
    }

    #[test]
    fn light_damage_stuns_without_retreat() {
        let mut protester = fresh(ProtesterKind::Regular);
        let outcome = protester.annoy(Level::new(0), 2, DamageCause::Squirt);

        assert_eq!(protester.health(), 3);
        assert!(!protester.is_leaving());
        assert_eq!(protester.ticks_to_wait, 100);
        assert_eq!(outcome.sound, Some(Sound::ProtesterAnnoyed));
        assert!(!outcome.defeated);
        assert_eq!(outcome.points, 0);
    }

    #[test]
    fn half_damage_starts_retreat_and_scores_once() {
        let mut protester = fresh(ProtesterKind::Regular);
        let _ = protester.annoy(Level::new(0), 2, DamageCause::Squirt);
        let retreat = protester.annoy(Level::new(0), 2, DamageCause::Squirt);

        assert!(protester.is_leaving());
        assert_eq!(protester.ticks_to_wait, 0);
        assert!(retreat.defeated);
        assert_eq!(retreat.points, 100);
        assert_eq!(retreat.sound, Some(Sound::ProtesterGiveUp));

        let finishing = protester.annoy(Level::new(0), 2, DamageCause::Squirt);
        assert!(finishing.died);
        assert!(!finishing.defeated);
        assert_eq!(finishing.points, 0);
        assert_eq!(protester.health(), 0);
    }

    #[test]
    fn repeated_damage_strictly_decreases_until_death() {
        let mut protester = fresh(ProtesterKind::Hardcore);
        let mut previous = protester.health();
        let mut deaths = 0;
        while previous > 0 {
            let outcome = protester.annoy(Level::new(1), 2, DamageCause::Squirt);
            assert!(protester.health() < previous);
            assert_eq!(outcome.died, protester.health() == 0);
            if outcome.died {
                deaths += 1;
            }
            previous = protester.health();
        }
        assert_eq!(deaths, 1);
    }

    #[test]
    fn crushing_kills_and_awards_boulder_points() {
        let mut protester = fresh(ProtesterKind::Hardcore);
        let outcome = protester.annoy(Level::new(0), 100, DamageCause::Boulder);

        assert!(outcome.died);
        assert!(outcome.defeated);
        assert_eq!(outcome.points, 500);
        assert_eq!(protester.health(), 0);
    }

    #[test]
    fn bribes_differ_by_variant() {
        let mut regular = fresh(ProtesterKind::Regular);
        assert_eq!(regular.got_bribed(Level::new(0)), 25);
        assert!(regular.is_leaving());

        let mut hardcore = fresh(ProtesterKind::Hardcore);
        assert_eq!(hardcore.got_bribed(Level::new(2)), 50);
        assert!(!hardcore.is_leaving());
        assert_eq!(hardcore.ticks_to_wait, 80);
        assert_eq!(hardcore.steps_left, 0);
    }

    #[test]
    fn killing_a_bribed_protester_still_scores() {
        let mut regular = fresh(ProtesterKind::Regular);
        let _ = regular.got_bribed(Level::new(0));
        let outcome = regular.annoy(Level::new(0), 5, DamageCause::Squirt);

        assert!(outcome.died);
        assert!(outcome.defeated);
        assert_eq!(outcome.points, 100);
    }
}
