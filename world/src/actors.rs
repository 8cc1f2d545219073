//! Actor variants, the ordered actor registry, and the simple actor behaviors.

use iceman_core::{
    ActorId, CellCoord, DamageCause, Direction, EntityKind, Event, FOOTPRINT, GoodieKind, Sound,
};

use crate::protester::{self, Protester};
use crate::{
    World, BARREL_POINTS, BOULDER_DAMAGE, CONTACT_RADIUS, GOLD_POINTS, REVEAL_RADIUS,
    SONAR_KIT_POINTS, SQUIRT_DAMAGE, WATER_POOL_POINTS,
};

/// Ticks a destabilized boulder waits before it starts falling.
pub(crate) const BOULDER_WAIT_TICKS: u32 = 30;
/// Sonar charges granted by a sonar kit.
const SONAR_KIT_CHARGES: u32 = 2;
/// Water charges granted by a water pool.
const WATER_POOL_CHARGES: u32 = 5;

/// Falling hazard states.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BoulderState {
    Stable,
    Waiting { ticks_left: u32 },
    Falling,
}

/// Lifetime policy of a gold nugget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum NuggetLifetime {
    /// Placed by the level; never decays and only the player can collect it.
    Permanent,
    /// Dropped by the player as a bribe; decays after its tick budget.
    Temporary { ticks_left: u32 },
}

/// Closed set of actor behaviors.
#[derive(Clone, Copy, Debug)]
pub(crate) enum ActorKind {
    Boulder(BoulderState),
    Squirt { range_left: u32 },
    Barrel { revealed: bool },
    GoldNugget { revealed: bool, lifetime: NuggetLifetime },
    Goodie { kind: GoodieKind, ticks_left: u32 },
    Protester(Protester),
}

impl ActorKind {
    pub(crate) fn entity_kind(&self) -> EntityKind {
        match self {
            Self::Boulder(_) => EntityKind::Boulder,
            Self::Squirt { .. } => EntityKind::Squirt,
            Self::Barrel { .. } => EntityKind::Barrel,
            Self::GoldNugget { .. } => EntityKind::GoldNugget,
            Self::Goodie { kind, .. } => EntityKind::Goodie(*kind),
            Self::Protester(protester) => EntityKind::Protester(protester.kind()),
        }
    }
}

/// Entity living in the registry.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Actor {
    pub(crate) id: ActorId,
    pub(crate) cell: CellCoord,
    pub(crate) facing: Direction,
    pub(crate) alive: bool,
    pub(crate) kind: ActorKind,
}

impl Actor {
    /// Only supported boulders stop characters and projectiles.
    pub(crate) fn blocks_movement(&self) -> bool {
        self.alive && matches!(self.kind, ActorKind::Boulder(state) if state != BoulderState::Falling)
    }

    pub(crate) fn protester(&self) -> Option<&Protester> {
        match &self.kind {
            ActorKind::Protester(protester) if self.alive => Some(protester),
            _ => None,
        }
    }

    pub(crate) fn protester_mut(&mut self) -> Option<&mut Protester> {
        match &mut self.kind {
            ActorKind::Protester(protester) if self.alive => Some(protester),
            _ => None,
        }
    }

    pub(crate) fn entity_kind(&self) -> EntityKind {
        self.kind.entity_kind()
    }

    /// Whether the host should draw the actor.
    pub(crate) fn visible(&self) -> bool {
        match &self.kind {
            ActorKind::Barrel { revealed } | ActorKind::GoldNugget { revealed, .. } => *revealed,
            _ => true,
        }
    }

    /// Hides-until-found objects that sonar and proximity can reveal.
    fn reveal(&mut self) {
        match &mut self.kind {
            ActorKind::Barrel { revealed }
            | ActorKind::GoldNugget {
                revealed,
                lifetime: NuggetLifetime::Permanent,
            } => *revealed = true,
            _ => {}
        }
    }

    /// Spends one tick of a decaying lifetime, marking the actor dead at zero.
    fn decay(&mut self) {
        let ticks_left = match &mut self.kind {
            ActorKind::GoldNugget {
                lifetime: NuggetLifetime::Temporary { ticks_left },
                ..
            } => ticks_left,
            ActorKind::Goodie { ticks_left, .. } => ticks_left,
            _ => return,
        };
        *ticks_left = ticks_left.saturating_sub(1);
        if *ticks_left == 0 {
            self.alive = false;
        }
    }
}

/// Ordered registry that owns every non-player actor.
///
/// Insertion order is action order. Entries are only removed by [`sweep`],
/// which the world runs once at the end of each tick.
///
/// [`sweep`]: ActorRegistry::sweep
#[derive(Clone, Debug)]
pub(crate) struct ActorRegistry {
    entries: Vec<Actor>,
    next_actor_id: ActorId,
}

impl ActorRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_actor_id: ActorId::new(0),
        }
    }

    pub(crate) fn insert(&mut self, cell: CellCoord, facing: Direction, kind: ActorKind) -> ActorId {
        let id = self.next_actor_id;
        self.next_actor_id = ActorId::new(id.get().saturating_add(1));
        self.entries.push(Actor {
            id,
            cell,
            facing,
            alive: true,
            kind,
        });
        id
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn get(&self, index: usize) -> Option<&Actor> {
        self.entries.get(index)
    }

    pub(crate) fn replace(&mut self, index: usize, actor: Actor) {
        if let Some(slot) = self.entries.get_mut(index) {
            *slot = actor;
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.entries.iter().filter(|actor| actor.alive)
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Actor> {
        self.entries.iter_mut().filter(|actor| actor.alive)
    }

    /// Ages every decaying actor by one tick.
    pub(crate) fn decay(&mut self) {
        for actor in self.iter_mut() {
            actor.decay();
        }
    }

    /// Evicts every dead actor, reporting the evicted identifiers in order.
    pub(crate) fn sweep(&mut self, out_events: &mut Vec<Event>) {
        for actor in self.entries.iter().filter(|actor| !actor.alive) {
            out_events.push(Event::ActorRemoved { actor: actor.id });
        }
        self.entries.retain(|actor| actor.alive);
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Runs one tick of behavior for the provided actor.
pub(crate) fn act(world: &mut World, actor: &mut Actor, out_events: &mut Vec<Event>) {
    match actor.kind {
        ActorKind::Boulder(state) => act_boulder(world, actor, state, out_events),
        ActorKind::Squirt { range_left } => act_squirt(world, actor, range_left, out_events),
        ActorKind::Barrel { .. } => act_barrel(world, actor, out_events),
        ActorKind::GoldNugget { lifetime, .. } => act_gold(world, actor, lifetime, out_events),
        ActorKind::Goodie { kind, .. } => act_goodie(world, actor, kind, out_events),
        ActorKind::Protester(_) => protester::act(world, actor, out_events),
    }
}

fn act_boulder(world: &mut World, actor: &mut Actor, state: BoulderState, out_events: &mut Vec<Event>) {
    match state {
        BoulderState::Stable => {}
        BoulderState::Waiting { ticks_left } => {
            let remaining = ticks_left.saturating_sub(1);
            if remaining == 0 {
                tracing::trace!(actor = actor.id.get(), "boulder falling");
                actor.kind = ActorKind::Boulder(BoulderState::Falling);
                out_events.push(Event::SoundPlayed {
                    sound: Sound::FallingRock,
                });
            } else {
                actor.kind = ActorKind::Boulder(BoulderState::Waiting {
                    ticks_left: remaining,
                });
            }
        }
        BoulderState::Falling => {
            let Some(next) = actor.cell.step(Direction::Down) else {
                actor.alive = false;
                return;
            };
            if world.ice.has_ice_below(actor.cell) || boulder_below(world, actor) {
                actor.alive = false;
                return;
            }
            actor.cell = next;
            crush(world, next, out_events);
        }
    }
}

/// Whether another boulder's footprint sits directly beneath this one.
fn boulder_below(world: &World, falling: &Actor) -> bool {
    world
        .actors
        .iter()
        .filter(|other| other.id != falling.id)
        .filter(|other| matches!(other.kind, ActorKind::Boulder(_)))
        .any(|other| {
            other.cell.y().saturating_add(FOOTPRINT) == falling.cell.y()
                && other.cell.x().abs_diff(falling.cell.x()) < FOOTPRINT
        })
}

fn crush(world: &mut World, cell: CellCoord, out_events: &mut Vec<Event>) {
    for index in world.protesters_within(cell, CONTACT_RADIUS) {
        world.annoy_protester(index, BOULDER_DAMAGE, DamageCause::Boulder, out_events);
    }
    if world.player.alive && World::within_radius(world.player.cell, cell, CONTACT_RADIUS) {
        world.player.annoy(BOULDER_DAMAGE, out_events);
    }
}

fn act_squirt(world: &mut World, actor: &mut Actor, range_left: u32, out_events: &mut Vec<Event>) {
    if splash(world, actor.cell, out_events) {
        actor.alive = false;
        return;
    }
    if range_left == 0 {
        actor.alive = false;
        return;
    }
    let Some(next) = world.can_move_to(actor.cell, actor.facing) else {
        actor.alive = false;
        return;
    };

    actor.cell = next;
    actor.kind = ActorKind::Squirt {
        range_left: range_left - 1,
    };
    if splash(world, next, out_events) {
        actor.alive = false;
    }
}

/// Damages every protester in contact with the squirt, reporting whether any was hit.
fn splash(world: &mut World, cell: CellCoord, out_events: &mut Vec<Event>) -> bool {
    let targets = world.protesters_within(cell, CONTACT_RADIUS);
    for index in &targets {
        world.annoy_protester(*index, SQUIRT_DAMAGE, DamageCause::Squirt, out_events);
    }
    !targets.is_empty()
}

fn act_barrel(world: &mut World, actor: &mut Actor, out_events: &mut Vec<Event>) {
    if !world.player.alive {
        return;
    }
    if world.player_within(actor.cell, REVEAL_RADIUS) {
        actor.reveal();
    }
    if world.player_within(actor.cell, CONTACT_RADIUS) {
        actor.alive = false;
        world.player.barrels += 1;
        out_events.push(Event::SoundPlayed {
            sound: Sound::FoundOil,
        });
        out_events.push(Event::PointsAwarded {
            points: BARREL_POINTS,
        });
    }
}

fn act_gold(world: &mut World, actor: &mut Actor, lifetime: NuggetLifetime, out_events: &mut Vec<Event>) {
    match lifetime {
        NuggetLifetime::Permanent => {
            if !world.player.alive {
                return;
            }
            if world.player_within(actor.cell, REVEAL_RADIUS) {
                actor.reveal();
            }
            if world.player_within(actor.cell, CONTACT_RADIUS) {
                actor.alive = false;
                world.player.gold += 1;
                out_events.push(Event::SoundPlayed {
                    sound: Sound::GotGoodie,
                });
                out_events.push(Event::PointsAwarded {
                    points: GOLD_POINTS,
                });
            }
        }
        NuggetLifetime::Temporary { .. } => {
            let taker = world
                .protesters_within(actor.cell, CONTACT_RADIUS)
                .into_iter()
                .find(|index| {
                    world
                        .actors
                        .get(*index)
                        .and_then(Actor::protester)
                        .is_some_and(|protester| !protester.is_leaving())
                });
            let Some(index) = taker else {
                return;
            };
            actor.alive = false;
            world.bribe_protester(index, out_events);
        }
    }
}

fn act_goodie(world: &mut World, actor: &mut Actor, kind: GoodieKind, out_events: &mut Vec<Event>) {
    if !world.player.alive || !world.player_within(actor.cell, CONTACT_RADIUS) {
        return;
    }
    actor.alive = false;
    let points = match kind {
        GoodieKind::SonarKit => {
            world.player.sonar += SONAR_KIT_CHARGES;
            SONAR_KIT_POINTS
        }
        GoodieKind::WaterPool => {
            world.player.water += WATER_POOL_CHARGES;
            WATER_POOL_POINTS
        }
    };
    out_events.push(Event::SoundPlayed {
        sound: Sound::GotGoodie,
    });
    out_events.push(Event::PointsAwarded { points });
}

/// Reveals every hidden object within `radius` of `center`.
pub(crate) fn reveal_within(registry: &mut ActorRegistry, center: CellCoord, radius: u32) -> usize {
    let mut revealed = 0;
    for actor in registry.iter_mut() {
        if actor.visible() || !World::within_radius(actor.cell, center, radius) {
            continue;
        }
        actor.reveal();
        if actor.visible() {
            revealed += 1;
        }
    }
    revealed
}
