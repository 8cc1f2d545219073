//! Player character state and per-tick action handling.

use iceman_core::{CellCoord, Direction, Event, PlayerAction, Sound};

use crate::grid::anchor_in_bounds;
use crate::World;

/// Anchor the player occupies at level start.
pub const PLAYER_START: CellCoord = CellCoord::new(30, 60);

const STARTING_HEALTH: u32 = 10;
const STARTING_WATER: u32 = 5;
const STARTING_SONAR: u32 = 1;

#[derive(Clone, Copy, Debug)]
pub(crate) struct Player {
    pub(crate) cell: CellCoord,
    pub(crate) facing: Direction,
    pub(crate) alive: bool,
    pub(crate) health: u32,
    pub(crate) water: u32,
    pub(crate) sonar: u32,
    pub(crate) gold: u32,
    pub(crate) barrels: u32,
}

impl Player {
    pub(crate) fn new() -> Self {
        Self {
            cell: PLAYER_START,
            facing: Direction::Right,
            alive: true,
            health: STARTING_HEALTH,
            water: STARTING_WATER,
            sonar: STARTING_SONAR,
            gold: 0,
            barrels: 0,
        }
    }

    /// Damages the player, killing it once health reaches zero.
    pub(crate) fn annoy(&mut self, amount: u32, out_events: &mut Vec<Event>) {
        if !self.alive {
            return;
        }
        self.health = self.health.saturating_sub(amount);
        if self.health == 0 {
            self.die(out_events);
        }
    }

    fn die(&mut self, out_events: &mut Vec<Event>) {
        self.health = 0;
        self.alive = false;
        out_events.push(Event::SoundPlayed {
            sound: Sound::PlayerGiveUp,
        });
    }
}

/// Runs the player phase of a tick.
pub(crate) fn act(world: &mut World, action: PlayerAction, out_events: &mut Vec<Event>) {
    if !world.player.alive {
        return;
    }

    match action {
        PlayerAction::None => {}
        PlayerAction::Move(direction) => walk(world, direction),
        PlayerAction::Spray => world.spray(out_events),
        PlayerAction::Sonar => world.activate_sonar(out_events),
        PlayerAction::DropGold => world.drop_gold(out_events),
        PlayerAction::GiveUp => {
            tracing::debug!("player gave up");
            world.player.die(out_events);
            return;
        }
    }

    let _ = world.clear_ice(world.player.cell, out_events);
}

/// Turns toward `direction`, or steps that way when already facing it.
///
/// Ice never stops the player; only the field edge and boulders do.
fn walk(world: &mut World, direction: Direction) {
    if world.player.facing != direction {
        world.player.facing = direction;
        return;
    }
    let Some(next) = world.player.cell.step(direction) else {
        return;
    };
    if anchor_in_bounds(next) && !world.blocked_by_boulder(world.player.cell, direction) {
        world.player.cell = next;
    }
}
