/// Ghost AI: timed mode machine plus greedy steering.
///
/// Modes:
///   1. **Scatter**: head for the scatter corner.
///   2. **Chase**: head for the player's tile.
///   3. **Frightened**: keep course, occasionally re-roll a random legal direction.
///      A frightened ghost that cannot continue rolls at once.
///
/// `eaten` is a flag on top of the mode: an eaten ghost is frozen until
/// the next actor reset.
///
/// Every mode change goes through `transition`, which reverses the ghost
/// (unless eaten). Release from the cage is not a mode change: the ghost
/// keeps facing up.
///
/// Steering never writes `body.dir` directly. It buffers a choice in
/// `body.next_dir` and lets `physics::advance` commit it at the next tile
/// center, so ghosts obey the same turn rule as the player. A ghost with
/// no usable direction is stopped on its tile center, where that rule can
/// always fire.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::{GhostConfig, SpeedConfig};

use super::entity::{Body, Direction, Ghost, GhostMode, TilePos};
use super::maze::Maze;
use super::physics;
use super::rules;

/// Something the orchestrator may want to report.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GhostSignal {
    Released,
    ModeChanged(GhostMode),
}

// ── Transitions ──

/// Enter `mode`. Reverses direction unless the ghost is eaten.
pub fn transition(ghost: &mut Ghost, mode: GhostMode) {
    ghost.mode = mode;
    if !ghost.eaten {
        ghost.body.reverse();
        ghost.body.next_dir = None;
    }
}

/// Power pellet effect. Applies to caged and already-frightened ghosts alike;
/// the frightened timer restarts either way.
pub fn frighten(ghost: &mut Ghost, secs: f32) {
    transition(ghost, GhostMode::Frightened);
    ghost.frightened_timer = secs;
}

// ── Per-frame update ──

/// Run one ghost for `dt` seconds: timers, steering, movement.
pub fn update<R: Rng>(
    ghost: &mut Ghost,
    dt: f32,
    maze: &mut Maze,
    player_tile: TilePos,
    cfg: &GhostConfig,
    speed: &SpeedConfig,
    rng: &mut R,
) -> Option<GhostSignal> {
    if ghost.eaten {
        return None;
    }

    if !ghost.released {
        ghost.release_timer += dt;
        if ghost.release_timer >= cfg.release_secs {
            release(ghost, maze, cfg);
            return Some(GhostSignal::Released);
        }
        return None;
    }

    let signal = tick_mode(ghost, dt, cfg);

    if ghost.body.dir.is_none() {
        halt(&mut ghost.body);
    }

    if ghost.mode == GhostMode::Frightened {
        wander(&mut ghost.body, dt, maze, cfg, rng);
    } else {
        let target = match ghost.mode {
            GhostMode::Chase => player_tile,
            _ => cfg.scatter_corner,
        };
        steer_toward(ghost, maze, target);
    }

    physics::advance(&mut ghost.body, dt, maze, speed);
    signal
}

fn release(ghost: &mut Ghost, maze: &mut Maze, cfg: &GhostConfig) {
    ghost.released = true;
    ghost.mode = GhostMode::Scatter;
    ghost.mode_timer = cfg.first_scatter_secs;

    if maze.open_gate(cfg.gate) {
        log::debug!("ghost {} released, gate {:?} opened", ghost.id, cfg.gate);
    } else if !maze.in_bounds(cfg.gate) {
        log::warn!("gate {:?} lies outside the maze; nothing opened", cfg.gate);
    } else {
        log::debug!("ghost {} released (gate already open)", ghost.id);
    }
}

/// Count down whichever timer governs the current mode.
fn tick_mode(ghost: &mut Ghost, dt: f32, cfg: &GhostConfig) -> Option<GhostSignal> {
    if ghost.mode == GhostMode::Frightened {
        ghost.frightened_timer -= dt;
        if ghost.frightened_timer > 0.0 {
            return None;
        }
        ghost.frightened_timer = 0.0;
        transition(ghost, GhostMode::Chase);
    } else {
        ghost.mode_timer -= dt;
        if ghost.mode_timer > 0.0 {
            return None;
        }
        let next = if ghost.mode == GhostMode::Chase { GhostMode::Scatter } else { GhostMode::Chase };
        transition(ghost, next);
    }
    ghost.mode_timer = cfg.mode_secs;
    log::debug!("ghost {} -> {:?}", ghost.id, ghost.mode);
    Some(GhostSignal::ModeChanged(ghost.mode))
}

fn steer_toward(ghost: &mut Ghost, maze: &Maze, target: TilePos) {
    let body = &mut ghost.body;
    match choose_direction(body.tile, body.dir, maze, target) {
        Some(d) => body.next_dir = Some(d),
        None => {
            if !can_continue(body, maze) {
                halt(body);
            }
        }
    }
}

/// Keep course unless the roll fires or the way ahead is shut; then pick
/// uniformly among the legal directions, reversal included.
fn wander<R: Rng>(body: &mut Body, dt: f32, maze: &Maze, cfg: &GhostConfig, rng: &mut R) {
    let stuck = !can_continue(body, maze);
    if !stuck && rng.gen::<f64>() >= rules::wander_probability(cfg, dt) {
        return;
    }
    if stuck {
        halt(body);
    }
    let legal = physics::legal_directions(body.tile, maze);
    if let Some(&d) = legal.choose(rng) {
        body.next_dir = Some(d);
    }
}

fn can_continue(body: &Body, maze: &Maze) -> bool {
    body.dir.map_or(false, |d| physics::can_move(body, d, maze))
}

/// Stop on the current tile's center.
fn halt(body: &mut Body) {
    let tile = body.tile;
    body.place(tile);
}

// ── Greedy selector ──

/// Legal direction (never the reversal of `current`) whose destination is
/// closest to `target` by Manhattan distance. Ties go to the earliest in
/// `Direction::ALL`. Distance is measured from the wrapped destination.
pub fn choose_direction(
    tile: TilePos,
    current: Option<Direction>,
    maze: &Maze,
    target: TilePos,
) -> Option<Direction> {
    let reverse = current.map(Direction::opposite);
    let mut best: Option<(Direction, i32)> = None;

    for d in Direction::ALL {
        if Some(d) == reverse || !physics::can_move_from(tile, d, maze) {
            continue;
        }
        let dest = match maze.neighbor(tile, d) {
            Some(t) => t,
            None => continue,
        };
        let dist = dest.manhattan(target);
        if best.map_or(true, |(_, b)| dist < b) {
            best = Some((d, dist));
        }
    }

    best.map(|(d, _)| d)
}
