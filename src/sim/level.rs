/// Level loader.
///
/// ## Sources
///   1. A level file (`[general] level` in config, or the first CLI argument)
///   2. The built-in embedded maze
///
/// Restarts reload from whichever source the level was loaded from.
///
/// ## Format (`.txt`):
///   Each non-empty line is one maze row. Rows shorter than the widest
///   row are padded with open floor.
///
/// ## Tile legend:
///   '#' = Wall                   '.' = Pellet
///   'o' = Power pellet           'P' = Player spawn (first one wins)
///   'G' = Ghost spawn (one ghost per marker)
///   anything else = open floor
///
/// A missing 'P' is not fatal: the player spawns at (1, 1) and a warning
/// is logged.

use std::collections::VecDeque;
use std::path::PathBuf;

use thiserror::Error;

use crate::domain::entity::{ConsumableKind, Consumable, Ghost, Player, TilePos};
use crate::domain::maze::Maze;
use crate::domain::tile::Tile;
use crate::sim::world::WorldState;

/// Where a level comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LevelSource {
    File(PathBuf),
    Embedded,
}

impl LevelSource {
    /// File source when a path is given, else the built-in maze.
    pub fn from_option(path: Option<PathBuf>) -> Self {
        path.map_or(LevelSource::Embedded, LevelSource::File)
    }

    fn describe(&self) -> String {
        match self {
            LevelSource::File(p) => p.display().to_string(),
            LevelSource::Embedded => "built-in maze".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("could not read level file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("level {0} has no rows")]
    Empty(String),
    #[error("no level has been loaded")]
    NotLoaded,
}

const DEFAULT_SPAWN: TilePos = TilePos { x: 1, y: 1 };

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Load a level and start a fresh session: new actors, counter and fruit
/// triggers reset, fruit history cleared. On error the world is untouched.
pub fn load(world: &mut WorldState, source: LevelSource) -> Result<(), LevelError> {
    let text = match &source {
        LevelSource::File(path) => std::fs::read_to_string(path).map_err(|e| LevelError::Io {
            path: path.clone(),
            source: e,
        })?,
        LevelSource::Embedded => EMBEDDED_LEVEL.join("\n"),
    };
    load_str(world, &text, source)
}

/// Load from level text already in memory. `source` is remembered for restarts.
pub fn load_str(world: &mut WorldState, text: &str, source: LevelSource) -> Result<(), LevelError> {
    let rows: Vec<&str> = text
        .lines()
        .map(|l| l.trim_end_matches('\r'))
        .filter(|l| !l.is_empty())
        .collect();
    if rows.is_empty() {
        return Err(LevelError::Empty(source.describe()));
    }

    let maze = Maze::from_rows(&rows);

    let spawn = maze.find(Tile::PlayerSpawn).unwrap_or_else(|| {
        log::warn!("{}: no player spawn 'P'; using {:?}", source.describe(), DEFAULT_SPAWN);
        DEFAULT_SPAWN
    });

    let ghosts: Vec<Ghost> = maze
        .positions(Tile::GhostSpawn)
        .enumerate()
        .map(|(id, at)| Ghost::new(id, at))
        .collect();

    let mut items: Vec<Consumable> = maze
        .positions(Tile::Pellet)
        .map(|at| Consumable::new(at, ConsumableKind::Pellet))
        .collect();
    items.extend(
        maze.positions(Tile::PowerPellet)
            .map(|at| Consumable::new(at, ConsumableKind::PowerPellet)),
    );

    log::info!(
        "loaded {} ({}x{}, {} ghosts, {} pellets)",
        source.describe(),
        maze.width(),
        maze.height(),
        ghosts.len(),
        items.len(),
    );

    world.player = Player::new(spawn, world.config.player.lives);
    world.ghosts = ghosts;
    world.items = items;
    world.maze = maze;
    world.fruit = None;
    world.consumed = 0;
    world.fruit_spawned = vec![false; world.config.fruit.thresholds.len()];
    world.fruit_history = VecDeque::new();
    world.ghosts_eaten = 0;
    world.game_over = false;
    world.loaded = true;
    world.source = Some(source);
    Ok(())
}

/// Reload the current level. With `keep_progress` the player's lives,
/// score, powered flag and the fruit history survive; without it they
/// start over.
pub fn restart(world: &mut WorldState, keep_progress: bool) -> Result<(), LevelError> {
    let source = world.source.clone().ok_or(LevelError::NotLoaded)?;

    let lives = world.player.lives;
    let score = world.player.score;
    let powered = world.player.powered;
    let history = std::mem::take(&mut world.fruit_history);

    let result = load(world, source);
    if result.is_err() {
        world.fruit_history = history;
        return result;
    }

    if keep_progress {
        world.player.lives = lives;
        world.player.score = score;
        world.player.powered = powered;
        world.fruit_history = history;
    }
    log::info!("level restarted (keep progress: {keep_progress})");
    Ok(())
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback level
// ══════════════════════════════════════════════════════════════

/// Same maze as `levels/level1.txt`. Gate at (9, 9) above the ghost pen.
pub const EMBEDDED_LEVEL: &[&str] = &[
    "###################",
    "#........#........#",
    "#o##.###.#.###.##o#",
    "#.................#",
    "#.##.#.#####.#.##.#",
    "#....#...#...#....#",
    "####.###.#.###.####",
    "####.#.......#.####",
    "####.#.##.##.#.####",
    "    ...#####...    ",
    "####.#.#GGG#.#.####",
    "####.#.#####.#.####",
    "####.#.......#.####",
    "####.#.#####.#.####",
    "#........#........#",
    "#.##.###.#.###.##.#",
    "#o.#.....P.....#.o#",
    "##.#.#.#####.#.#.##",
    "#....#...#...#....#",
    "#.######.#.######.#",
    "#.................#",
    "###################",
];

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::entity::FruitKind;
    use crate::sim::step;

    fn new_world() -> WorldState {
        WorldState::new(GameConfig { seed: Some(5), ..GameConfig::default() })
    }

    fn temp_level(name: &str, text: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("mazechase-{}-{name}.txt", std::process::id()));
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn embedded_level_is_well_formed() {
        let mut w = new_world();
        load(&mut w, LevelSource::Embedded).unwrap();
        assert!(w.is_loaded());
        assert_eq!(w.maze.width(), 19);
        assert_eq!(w.maze.height(), 22);
        assert_eq!(w.player.body.tile, TilePos::new(9, 16));
        assert_eq!(w.ghosts.len(), 3);
        assert!(w.maze.is_wall(9, 9)); // gate shut until a release
        assert!(w.pellets_left() >= 170);
        assert!(EMBEDDED_LEVEL.iter().all(|r| r.len() == 19));
    }

    #[test]
    fn legend_builds_actors() {
        let mut w = new_world();
        load_str(&mut w, "#####\n#P.o#\n#G G#\n#####\n", LevelSource::Embedded).unwrap();
        assert_eq!(w.player.body.tile, TilePos::new(1, 1));
        assert_eq!(w.player.lives, 3);
        let spawns: Vec<_> = w.ghosts.iter().map(|g| (g.id, g.spawn)).collect();
        assert_eq!(spawns, vec![(0, TilePos::new(1, 2)), (1, TilePos::new(3, 2))]);
        assert_eq!(w.items.len(), 2);
        assert_eq!(w.items[0].kind, ConsumableKind::Pellet);
        assert_eq!(w.items[1].kind, ConsumableKind::PowerPellet);
    }

    #[test]
    fn first_player_marker_wins() {
        let mut w = new_world();
        load_str(&mut w, "P  P\n    \n", LevelSource::Embedded).unwrap();
        assert_eq!(w.player.spawn, TilePos::new(0, 0));
    }

    #[test]
    fn missing_player_marker_synthesizes_spawn() {
        let mut w = new_world();
        load_str(&mut w, "#####\n#...#\n#####\n", LevelSource::Embedded).unwrap();
        assert_eq!(w.player.spawn, TilePos::new(1, 1));
    }

    #[test]
    fn blank_lines_are_skipped_and_rows_padded() {
        let mut w = new_world();
        load_str(&mut w, "\n###\r\n\n#P\n###\n\n", LevelSource::Embedded).unwrap();
        assert_eq!(w.maze.height(), 3);
        assert_eq!(w.maze.width(), 3);
        assert!(!w.maze.is_wall(2, 1));
    }

    #[test]
    fn empty_text_is_rejected() {
        let mut w = new_world();
        let err = load_str(&mut w, "\n\n", LevelSource::Embedded).unwrap_err();
        assert!(matches!(err, LevelError::Empty(_)));
        assert!(!w.is_loaded());
    }

    #[test]
    fn missing_file_is_io_error() {
        let mut w = new_world();
        let path = PathBuf::from("/definitely/not/here/level.txt");
        let err = load(&mut w, LevelSource::File(path.clone())).unwrap_err();
        match err {
            LevelError::Io { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error {other:?}"),
        }
        assert!(!w.is_loaded());
        assert!(step::update(&mut w, 0.1).is_empty());
    }

    #[test]
    fn restart_before_load_fails() {
        let mut w = new_world();
        assert!(matches!(restart(&mut w, true), Err(LevelError::NotLoaded)));
    }

    #[test]
    fn file_level_restarts_from_same_file() {
        let path = temp_level("restart", "#####\n#P..#\n#####\n");
        let mut w = new_world();
        load(&mut w, LevelSource::File(path.clone())).unwrap();
        w.items.clear();
        restart(&mut w, true).unwrap();
        assert_eq!(w.pellets_left(), 2);
        assert_eq!(w.source, Some(LevelSource::File(path.clone())));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn progress_restart_keeps_player_progress() {
        let mut w = new_world();
        load(&mut w, LevelSource::Embedded).unwrap();
        w.player.lives = 1;
        w.player.score = 4200;
        w.player.powered = true;
        w.fruit_history.push_back(FruitKind::Apple);
        w.consumed = 80;
        w.fruit_spawned[0] = true;
        w.maze.open_gate(TilePos::new(9, 9));

        restart(&mut w, true).unwrap();
        assert_eq!(w.player.lives, 1);
        assert_eq!(w.player.score, 4200);
        assert!(w.is_powered());
        assert_eq!(w.fruit_history, [FruitKind::Apple]);
        assert_eq!(w.consumed, 0);
        assert_eq!(w.fruit_spawned, vec![false, false]);
        assert!(w.maze.is_wall(9, 9));
    }

    #[test]
    fn plain_restart_starts_over() {
        let mut w = new_world();
        load(&mut w, LevelSource::Embedded).unwrap();
        w.player.lives = 0;
        w.player.score = 990;
        w.fruit_history.push_back(FruitKind::Orange);
        w.fruit_spawned[1] = true;
        w.game_over = true;

        restart(&mut w, false).unwrap();
        assert_eq!(w.player.lives, 3);
        assert_eq!(w.player.score, 0);
        assert!(w.fruit_history.is_empty());
        assert_eq!(w.fruit_spawned, vec![false, false]);
        assert!(!w.is_game_over());
    }

    #[test]
    fn io_error_message_names_the_file() {
        let err = LevelError::Io {
            path: PathBuf::from("levels/missing.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.to_string(), "could not read level file levels/missing.txt: gone");
    }
}
