/// WorldState: the complete snapshot of a running level.
///
/// ## Ownership
///
/// `WorldState` is the single writer for everything the simulation
/// touches during a frame: the maze (gate cell), every actor, the
/// consumption counter, fruit triggers and the fruit history.
/// `update` takes `&mut self`; between calls the state is frame-consistent.
///
/// ## Render surface
///
/// The front end never reads actors directly. It asks for:
///   - `maze()`: the effective grid (gate may be open)
///   - `sprites()`: a flat, kind-tagged list in draw order
///   - `hud()`: score, lives, fruit history
///
/// Eaten ghosts and inactive bodies never appear in `sprites()`.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::GameConfig;
use crate::domain::entity::{
    Body, ConsumableKind, Consumable, Direction, Fruit, FruitKind, Ghost, GhostMode, Hitbox,
    Player, TilePos,
};
use crate::domain::maze::Maze;
use crate::sim::event::GameEvent;
use crate::sim::level::LevelSource;
use crate::sim::step;

// ── Render-state types ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SpriteKind {
    Pellet,
    PowerPellet,
    Fruit(FruitKind),
    Ghost { id: usize, mode: GhostMode },
    Player { mouth_open: bool },
}

#[derive(Clone, Debug)]
pub struct Sprite {
    pub kind: SpriteKind,
    pub tile: TilePos,
    pub px: f32,
    pub py: f32,
    pub hitbox: Hitbox,
    pub facing: Option<Direction>,
}

impl Sprite {
    fn of(kind: SpriteKind, body: &Body) -> Self {
        Sprite {
            kind,
            tile: body.tile,
            px: body.px,
            py: body.py,
            hitbox: body.hitbox,
            facing: body.dir,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Hud {
    pub score: u32,
    pub lives: u32,
    pub powered: bool,
    /// Oldest first.
    pub fruit_history: Vec<FruitKind>,
}

// ── World ──

pub struct WorldState {
    // ── Level ──
    /// Effective grid. The only runtime change is the gate cell opening.
    pub maze: Maze,
    /// Where the current level came from; restarts reload it.
    pub source: Option<LevelSource>,
    pub loaded: bool,

    // ── Actors ──
    pub player: Player,
    pub ghosts: Vec<Ghost>,
    pub items: Vec<Consumable>,
    pub fruit: Option<Fruit>,

    // ── Progress ──
    /// Pellets + power pellets eaten this level session.
    pub consumed: u32,
    /// One flag per fruit threshold.
    pub fruit_spawned: Vec<bool>,
    pub fruit_history: VecDeque<FruitKind>,
    /// Ghosts eaten since the last actor reset.
    pub ghosts_eaten: usize,
    pub game_over: bool,

    // ── Config / randomness ──
    pub config: GameConfig,
    pub rng: StdRng,
}

impl WorldState {
    /// Empty, unloaded world. Nothing happens until `level::load` succeeds.
    pub fn new(config: GameConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        WorldState {
            maze: Maze::default(),
            source: None,
            loaded: false,
            player: Player::new(TilePos::default(), config.player.lives),
            ghosts: vec![],
            items: vec![],
            fruit: None,
            consumed: 0,
            fruit_spawned: vec![false; config.fruit.thresholds.len()],
            fruit_history: VecDeque::new(),
            ghosts_eaten: 0,
            game_over: false,
            config,
            rng,
        }
    }

    /// Advance the simulation by `dt` seconds.
    pub fn update(&mut self, dt: f32) -> Vec<GameEvent> {
        step::update(self, dt)
    }

    /// Buffer the player's next direction. Commits at the next tile center.
    pub fn set_direction(&mut self, dir: Direction) {
        self.player.body.next_dir = Some(dir);
    }

    /// Player and ghosts back to their level-start tiles after a catch.
    pub fn reset_actors(&mut self) {
        self.player.reset_to_spawn();
        for g in &mut self.ghosts {
            g.reset_to_spawn();
        }
        self.ghosts_eaten = 0;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn is_powered(&self) -> bool {
        self.player.powered
    }

    pub fn pellets_left(&self) -> usize {
        self.items.len()
    }
}

// ── Render surface ──

impl WorldState {
    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    /// Draw order: consumables, fruit, ghosts, player.
    pub fn sprites(&self) -> Vec<Sprite> {
        let mut out = Vec::with_capacity(self.items.len() + self.ghosts.len() + 2);

        for item in self.items.iter().filter(|i| i.body.active) {
            let kind = match item.kind {
                ConsumableKind::Pellet => SpriteKind::Pellet,
                ConsumableKind::PowerPellet => SpriteKind::PowerPellet,
            };
            out.push(Sprite::of(kind, &item.body));
        }

        if let Some(f) = self.fruit.as_ref().filter(|f| f.body.active) {
            out.push(Sprite::of(SpriteKind::Fruit(f.kind), &f.body));
        }

        for g in self.ghosts.iter().filter(|g| !g.eaten && g.body.active) {
            out.push(Sprite::of(SpriteKind::Ghost { id: g.id, mode: g.mode }, &g.body));
        }

        if self.player.body.active {
            let kind = SpriteKind::Player { mouth_open: self.player.mouth_open };
            out.push(Sprite::of(kind, &self.player.body));
        }

        out
    }

    pub fn hud(&self) -> Hud {
        Hud {
            score: self.player.score,
            lives: self.player.lives,
            powered: self.player.powered,
            fruit_history: self.fruit_history.iter().copied().collect(),
        }
    }
}
