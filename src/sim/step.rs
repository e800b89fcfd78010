/// The step function: advances the world by one frame of `dt` seconds.
///
/// Processing order:
///   1. Player animation + movement
///   2. Pellet / power pellet collisions (fruit triggers fire here)
///   3. Fruit lifecycle + collision
///   4. Ghosts, one at a time: AI + movement, then contact with the player.
///      A catch resets every actor and ends the ghost phase for this frame.
///   5. Powered flag upkeep
///   6. Terminal check: level cleared → restart keeping progress
///
/// Nothing runs before a level is loaded or after game over.

use crate::domain::ai::{self, GhostSignal};
use crate::domain::entity::GhostMode;
use crate::domain::physics;
use super::collision::{self, GhostContact};
use super::event::GameEvent;
use super::level;
use super::world::WorldState;

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn update(world: &mut WorldState, dt: f32) -> Vec<GameEvent> {
    if !world.loaded || world.game_over {
        return vec![];
    }

    let mut events: Vec<GameEvent> = Vec::new();

    resolve_player(world, dt);
    collision::resolve_consumables(world, &mut events);
    collision::tick_fruit(world, dt, &mut events);
    collision::resolve_fruit(world, &mut events);
    resolve_ghosts(world, dt, &mut events);
    resolve_powered(world);

    if !world.game_over {
        resolve_level_clear(world, &mut events);
    }

    events
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

fn resolve_player(world: &mut WorldState, dt: f32) {
    world.player.tick_animation(dt, world.config.player.anim_secs);
    physics::advance(&mut world.player.body, dt, &world.maze, &world.config.speed);
}

// ══════════════════════════════════════════════════════════════
// Ghosts
// ══════════════════════════════════════════════════════════════

fn resolve_ghosts(world: &mut WorldState, dt: f32, events: &mut Vec<GameEvent>) {
    let player_tile = world.player.body.tile;

    for i in 0..world.ghosts.len() {
        let ghost = &mut world.ghosts[i];
        let signal = ai::update(
            ghost,
            dt,
            &mut world.maze,
            player_tile,
            &world.config.ghosts,
            &world.config.speed,
            &mut world.rng,
        );
        match signal {
            Some(GhostSignal::Released) => events.push(GameEvent::GhostReleased { id: ghost.id }),
            Some(GhostSignal::ModeChanged(mode)) => {
                events.push(GameEvent::GhostModeChanged { id: ghost.id, mode })
            }
            None => {}
        }

        match collision::ghost_contact(&mut world.player, &mut world.ghosts[i]) {
            GhostContact::None => {}
            GhostContact::Ate(id) => {
                world.ghosts_eaten += 1;
                events.push(GameEvent::GhostEaten { id });
            }
            GhostContact::Caught { lives_left } => {
                events.push(GameEvent::PlayerCaught { lives_left });
                world.reset_actors();
                if lives_left == 0 {
                    world.game_over = true;
                    log::info!("game over, final score {}", world.player.score);
                    events.push(GameEvent::GameOver);
                }
                break;
            }
        }
    }
}

/// `powered` lasts while any live ghost is still frightened.
fn resolve_powered(world: &mut WorldState) {
    if !world.player.powered {
        return;
    }
    let any_frightened = world
        .ghosts
        .iter()
        .any(|g| !g.eaten && g.mode == GhostMode::Frightened);
    if !any_frightened {
        world.player.powered = false;
    }
}

// ══════════════════════════════════════════════════════════════
// Level clear
// ══════════════════════════════════════════════════════════════

/// All consumables gone, or every released ghost eaten (at least one released).
pub fn level_cleared(world: &WorldState) -> bool {
    if world.items.is_empty() {
        return true;
    }
    let released = world.ghosts.iter().filter(|g| g.released).count();
    released > 0 && world.ghosts_eaten >= released
}

fn resolve_level_clear(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if !level_cleared(world) {
        return;
    }
    events.push(GameEvent::LevelCleared);
    if let Err(e) = level::restart(world, true) {
        log::error!("level restart failed: {e}");
        world.game_over = true;
        events.push(GameEvent::GameOver);
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
