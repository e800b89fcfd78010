/// Scoring and progression rules: table driven.
///
/// Pure functions, no side effects. The collision engine asks these
/// "how much" and "when" questions and then applies the answers.
///
/// ## Score Table
///
/// ┌────────────────────────────┬────────┬──────────────────────────┐
/// │ Contact                     │ Points │ Side effect              │
/// ├────────────────────────────┼────────┼──────────────────────────┤
/// │ Pellet                      │ +10    │ counter +1               │
/// │ Power pellet                │ +50    │ counter +1, frighten all │
/// │ Frightened ghost            │ +200   │ ghost eaten              │
/// │ Chasing / scattering ghost  │ 0      │ life lost, reset actors  │
/// │ Orange                      │ +100   │ recorded in history      │
/// │ Apple                       │ +500   │ recorded in history      │
/// └────────────────────────────┴────────┴──────────────────────────┘
///
/// ## Fruit Trigger
///
/// A fruit spawns the first time the consumption counter *equals* a
/// threshold. Each threshold fires at most once per level session.
///
/// ## Frightened Wander
///
/// ┌───────────────────┬───────────────────────────────────┐
/// │ wander_per_tick   │ Chance this update                │
/// ├───────────────────┼───────────────────────────────────┤
/// │ true              │ p                                 │
/// │ false (default)   │ 1 − (1 − p)^(dt · reference_hz)   │
/// └───────────────────┴───────────────────────────────────┘
///
/// The default keeps the per-second wander rate the same at any frame
/// rate; at exactly `reference_hz` both rows agree.

use crate::config::GhostConfig;

use super::entity::{ConsumableKind, FruitKind, TilePos};
use super::maze::Maze;

pub const PELLET_POINTS: u32 = 10;
pub const POWER_PELLET_POINTS: u32 = 50;
pub const GHOST_POINTS: u32 = 200;

pub fn consumable_points(kind: ConsumableKind) -> u32 {
    match kind {
        ConsumableKind::Pellet => PELLET_POINTS,
        ConsumableKind::PowerPellet => POWER_PELLET_POINTS,
    }
}

pub fn fruit_points(kind: FruitKind) -> u32 {
    match kind {
        FruitKind::Orange => 100,
        FruitKind::Apple => 500,
    }
}

/// Index of the threshold hit exactly by `counter`, if any.
pub fn fruit_threshold_hit(counter: u32, thresholds: &[u32]) -> Option<usize> {
    thresholds.iter().position(|&t| t == counter)
}

/// Where a bonus fruit appears: middle column, configured row clamped
/// into the maze (at most `height - 2`, never negative).
pub fn fruit_tile(maze: &Maze, spawn_row: i32) -> TilePos {
    let max_row = (maze.height() as i32 - 2).max(0);
    TilePos::new(maze.width() as i32 / 2, spawn_row.clamp(0, max_row))
}

/// Probability that a frightened ghost re-rolls its direction during an
/// update of `dt` seconds.
pub fn wander_probability(cfg: &GhostConfig, dt: f32) -> f64 {
    if cfg.wander_per_tick {
        return cfg.wander_chance;
    }
    let ticks = (dt * cfg.wander_reference_hz).max(0.0) as f64;
    1.0 - (1.0 - cfg.wander_chance).powf(ticks)
}
