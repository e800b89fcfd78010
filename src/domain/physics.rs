/// Movement controller: single source of truth for where actors may go.
///
/// ## Architecture
///
/// Two layers:
///   1. LEGALITY (`can_move`): is the neighbouring tile in `dir` enterable?
///   2. INTEGRATION (`advance`): move the sub-tile position for one frame.
///
/// ## Legality
///
/// Destination = current tile + direction delta, with tunnel wrap on the
/// column. A destination row outside the maze is illegal. Otherwise the
/// move is legal iff the destination cell is not a wall.
///
/// ## Turn commit rule
///
/// A buffered direction (`Body::next_dir`) becomes the current direction
/// only while the body sits within `TURN_TOLERANCE` of its tile center on
/// both axes, and only if that direction is legal right now. Nothing else
/// in the crate commits a buffered turn. This keeps actors from cutting
/// corners through walls.
///
/// ## Per-direction speed
///
/// Up and Left move at half the nominal speed, Down and Right at full speed,
/// unless `SpeedConfig::symmetric` is set.

use crate::config::SpeedConfig;

use super::entity::{Body, Direction, TilePos, HALF_TILE, TILE_SIZE};
use super::maze::Maze;

/// Max distance from tile center (exclusive, per axis) at which a buffered turn commits.
pub const TURN_TOLERANCE: f32 = 2.0;

// ══════════════════════════════════════════════════════════════
// Layer 1: Legality
// ══════════════════════════════════════════════════════════════

/// Can the body step from its current tile in `dir`?
#[inline]
pub fn can_move(body: &Body, dir: Direction, maze: &Maze) -> bool {
    can_move_from(body.tile, dir, maze)
}

/// Can an actor standing on `tile` step in `dir`?
pub fn can_move_from(tile: TilePos, dir: Direction, maze: &Maze) -> bool {
    match maze.neighbor(tile, dir) {
        Some(dest) => maze.tile_at(dest.x, dest.y).is_passable(),
        None => false,
    }
}

/// Legal directions from `tile`, in `Direction::ALL` order.
pub fn legal_directions(tile: TilePos, maze: &Maze) -> Vec<Direction> {
    Direction::ALL
        .into_iter()
        .filter(|&d| can_move_from(tile, d, maze))
        .collect()
}

// ══════════════════════════════════════════════════════════════
// Layer 2: Integration
// ══════════════════════════════════════════════════════════════

/// Distance covered in `dt` seconds heading `dir`.
pub fn step_distance(dir: Direction, dt: f32, speed: &SpeedConfig) -> f32 {
    let full = speed.actor_speed * dt;
    match dir {
        Direction::Up | Direction::Left if !speed.symmetric => full / 2.0,
        _ => full,
    }
}

/// Advance one body by `dt` seconds.
pub fn advance(body: &mut Body, dt: f32, maze: &Maze, speed: &SpeedConfig) {
    commit_buffered_turn(body, maze);

    if let Some(dir) = body.dir {
        let dist = step_distance(dir, dt, speed);
        let open = can_move(body, dir, maze);
        let (cx, cy) = body.tile.center();

        match dir {
            Direction::Up | Direction::Down => {
                body.py += if dir == Direction::Up { -dist } else { dist };
                if open {
                    body.tile.y = (body.py / TILE_SIZE).floor() as i32;
                } else {
                    body.py = cy; // wall ahead: hold at center
                }
            }
            Direction::Left => {
                body.px -= dist;
                if open {
                    if body.px < 0.0 {
                        body.px = (maze.width() as f32 - 1.0) * TILE_SIZE + HALF_TILE;
                    }
                    body.tile.x = (body.px / TILE_SIZE).floor() as i32;
                } else {
                    body.px = cx;
                }
            }
            Direction::Right => {
                body.px += dist;
                if open {
                    if body.px >= maze.span_x() {
                        body.px = HALF_TILE;
                    }
                    body.tile.x = (body.px / TILE_SIZE).floor() as i32;
                } else {
                    body.px = cx;
                }
            }
        }
    }

    // Drifted a whole tile from the tracked center: trust the raw position.
    let (ox, oy) = body.offset_from_center();
    if ox.abs() >= TILE_SIZE || oy.abs() >= TILE_SIZE {
        body.tile = TilePos::containing(body.px, body.py);
    }

    body.recenter_hitbox();
}

fn commit_buffered_turn(body: &mut Body, maze: &Maze) {
    let next = match body.next_dir {
        Some(d) => d,
        None => return,
    };
    if body.within_center(TURN_TOLERANCE) && can_move(body, next, maze) {
        body.dir = Some(next);
        body.next_dir = None;
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn parity() -> SpeedConfig {
        SpeedConfig { symmetric: false, ..SpeedConfig::default() }
    }

    fn body_at(x: i32, y: i32, dir: Option<Direction>) -> Body {
        let mut b = Body::new(TilePos::new(x, y));
        b.dir = dir;
        b
    }

    /// Step until `done` holds or `max` frames pass. Returns frames used.
    fn run_until(b: &mut Body, m: &Maze, max: usize, done: impl Fn(&Body) -> bool) -> Option<usize> {
        for frame in 1..=max {
            advance(b, DT, m, &parity());
            if done(b) { return Some(frame); }
        }
        None
    }

    // ── can_move ──

    #[test]
    fn can_move_matches_wall_and_bounds_definition() {
        let rows = ["# # #", "     ", "## ##"];
        let m = Maze::from_rows(&rows);
        let (w, h) = (5i32, 3i32);

        for y in 0..h {
            for x in 0..w {
                for d in Direction::ALL {
                    let (dx, dy) = d.delta();
                    let nx = (x + dx + w) % w;
                    let ny = y + dy;
                    let expected = ny >= 0 && ny < h
                        && rows[ny as usize].as_bytes()[nx as usize] != b'#';
                    assert_eq!(
                        can_move_from(TilePos::new(x, y), d, &m), expected,
                        "tile ({x},{y}) dir {d:?}",
                    );
                }
            }
        }
    }

    #[test]
    fn legal_directions_keep_fixed_order() {
        let m = Maze::from_rows(&["   ", "   ", "   "]);
        assert_eq!(
            legal_directions(TilePos::new(1, 1), &m),
            vec![Direction::Up, Direction::Down, Direction::Left, Direction::Right],
        );
        let m = Maze::from_rows(&["###", "# #", "# #"]);
        assert_eq!(legal_directions(TilePos::new(1, 1), &m), vec![Direction::Down]);
    }

    // ── Turn commit ──

    #[test]
    fn buffered_turn_waits_outside_tolerance() {
        let m = Maze::from_rows(&["#####", "#   #", "#   #", "#####"]);
        for offset in [2.0_f32, 2.5, 5.0, 7.9, -2.0, -6.0] {
            let mut b = body_at(2, 1, Some(Direction::Right));
            b.px += offset;
            b.next_dir = Some(Direction::Down);
            advance(&mut b, 0.0, &m, &parity());
            assert_eq!(b.dir, Some(Direction::Right), "offset {offset}");
            assert_eq!(b.next_dir, Some(Direction::Down), "offset {offset}");
        }
    }

    #[test]
    fn buffered_turn_commits_near_center() {
        let m = Maze::from_rows(&["#####", "#   #", "#   #", "#####"]);
        let mut b = body_at(2, 1, Some(Direction::Right));
        b.px += 1.0;
        b.next_dir = Some(Direction::Down);
        advance(&mut b, 0.0, &m, &parity());
        assert_eq!(b.dir, Some(Direction::Down));
        assert_eq!(b.next_dir, None);
    }

    #[test]
    fn illegal_buffered_turn_stays_buffered() {
        let m = Maze::from_rows(&["#####", "#   #", "#####"]);
        let mut b = body_at(2, 1, Some(Direction::Right));
        b.next_dir = Some(Direction::Up);
        advance(&mut b, DT, &m, &parity());
        assert_eq!(b.dir, Some(Direction::Right));
        assert_eq!(b.next_dir, Some(Direction::Up));
    }

    // ── Integration ──

    #[test]
    fn up_and_left_run_at_half_speed() {
        let m = Maze::from_rows(&["     "; 5]);
        let cfg = parity();

        let mut up = body_at(2, 2, Some(Direction::Up));
        advance(&mut up, 0.1, &m, &cfg);
        assert!((up.py - (40.0 - 3.5)).abs() < 1e-4);

        let mut down = body_at(2, 2, Some(Direction::Down));
        advance(&mut down, 0.1, &m, &cfg);
        assert!((down.py - (40.0 + 7.0)).abs() < 1e-4);

        let mut left = body_at(2, 2, Some(Direction::Left));
        advance(&mut left, 0.1, &m, &cfg);
        assert!((left.px - (40.0 - 3.5)).abs() < 1e-4);
    }

    #[test]
    fn symmetric_speed_evens_out() {
        let m = Maze::from_rows(&["     "; 5]);
        let cfg = SpeedConfig { symmetric: true, ..SpeedConfig::default() };
        let mut up = body_at(2, 2, Some(Direction::Up));
        advance(&mut up, 0.1, &m, &cfg);
        assert!((up.py - (40.0 - 7.0)).abs() < 1e-4);
    }

    #[test]
    fn wall_ahead_holds_at_center() {
        let m = Maze::from_rows(&["#####", "#   #", "#####"]);
        let mut b = body_at(3, 1, Some(Direction::Right));
        for _ in 0..30 {
            advance(&mut b, DT, &m, &parity());
        }
        assert_eq!(b.tile, TilePos::new(3, 1));
        assert_eq!(b.px, 56.0);
        assert_eq!(b.py, 24.0);
    }

    #[test]
    fn tile_follows_position_across_boundary() {
        let m = Maze::from_rows(&["#####", "#   #", "#####"]);
        let mut b = body_at(1, 1, Some(Direction::Right));
        let frames = run_until(&mut b, &m, 200, |b| b.tile.x == 2).expect("never crossed");
        // 8 units to the edge at 70/s
        assert!(frames >= 6 && frames <= 8, "took {frames} frames");
        assert!(b.px >= 32.0 && b.px < 48.0);
    }

    #[test]
    fn hitbox_tracks_position() {
        let m = Maze::from_rows(&["     "; 3]);
        let mut b = body_at(1, 1, Some(Direction::Down));
        advance(&mut b, 0.05, &m, &parity());
        assert_eq!(b.hitbox.x, b.px - 8.0);
        assert_eq!(b.hitbox.y, b.py - 8.0);
    }

    #[test]
    fn raw_drift_resyncs_tile() {
        let m = Maze::from_rows(&["     "; 5]);
        let mut b = body_at(2, 2, None);
        b.px += 20.0;
        advance(&mut b, DT, &m, &parity());
        assert_eq!(b.tile, TilePos::new(3, 2));
    }

    // ── Tunnel ──

    #[test]
    fn tunnel_wraps_left_to_right_edge() {
        let m = Maze::from_rows(&["#####", "#...#", " ... ", "#...#", "#####"]);
        let mut b = body_at(1, 2, Some(Direction::Left));
        let frames = run_until(&mut b, &m, 400, |b| b.tile.x == 4);
        assert!(frames.is_some(), "never wrapped");
        assert_eq!(b.tile.y, 2);
        assert_eq!(b.py, 40.0);
        assert!(b.px >= 64.0 && b.px <= 72.0);
        assert_eq!(b.dir, Some(Direction::Left));
    }

    #[test]
    fn tunnel_wraps_right_to_left_edge() {
        let m = Maze::from_rows(&["#####", "#...#", " ... ", "#...#", "#####"]);
        let mut b = body_at(3, 2, Some(Direction::Right));
        let frames = run_until(&mut b, &m, 400, |b| b.tile.x == 0);
        assert!(frames.is_some(), "never wrapped");
        assert_eq!(b.tile.y, 2);
        assert!(b.px >= 0.0 && b.px <= 16.0);
    }

    #[test]
    fn no_vertical_wrap() {
        let m = Maze::from_rows(&[" ", " ", " "]);
        let mut b = body_at(0, 0, Some(Direction::Up));
        for _ in 0..60 {
            advance(&mut b, DT, &m, &parity());
        }
        assert_eq!(b.tile, TilePos::new(0, 0));
        assert_eq!(b.py, 8.0);
    }
}
