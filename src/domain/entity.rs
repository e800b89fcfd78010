/// Entities: Player, Ghost, Consumable (pellet / power pellet), Fruit.
/// Every entity owns a `Body`: the shared actor capability set
/// (tile, sub-tile position, hitbox, active flag, current + buffered direction).

/// Side length of one maze tile in sub-tile units.
pub const TILE_SIZE: f32 = 16.0;
/// Offset from a tile's top-left corner to its center.
pub const HALF_TILE: f32 = 8.0;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Fixed enumeration order. Ghost tie-breaks depend on it.
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// The single turnaround function. Every forced reversal goes through here.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Tile delta (dx, dy). Rows grow downward.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Integer (column, row) into the maze grid.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub fn new(x: i32, y: i32) -> Self {
        TilePos { x, y }
    }

    /// Sub-tile coordinates of this tile's center.
    pub fn center(self) -> (f32, f32) {
        (
            self.x as f32 * TILE_SIZE + HALF_TILE,
            self.y as f32 * TILE_SIZE + HALF_TILE,
        )
    }

    /// Tile containing the sub-tile point (px, py).
    pub fn containing(px: f32, py: f32) -> Self {
        TilePos {
            x: (px / TILE_SIZE).floor() as i32,
            y: (py / TILE_SIZE).floor() as i32,
        }
    }

    pub fn manhattan(self, other: TilePos) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

/// Axis-aligned box in sub-tile space (top-left corner + size).
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Hitbox {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Hitbox {
    /// Tile-sized box centered on (px, py).
    pub fn centered_on(px: f32, py: f32) -> Self {
        Hitbox { x: px - HALF_TILE, y: py - HALF_TILE, w: TILE_SIZE, h: TILE_SIZE }
    }

    /// Strict intersection: boxes that only share an edge do not overlap.
    pub fn intersects(&self, other: &Hitbox) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }
}

/// Shared actor state. Movement lives in `physics`; this is data plus
/// the few invariant-keeping mutators.
#[derive(Clone, Debug)]
pub struct Body {
    pub tile: TilePos,
    pub px: f32,
    pub py: f32,
    pub hitbox: Hitbox,
    pub active: bool,
    /// Current direction; `None` = motionless.
    pub dir: Option<Direction>,
    /// Buffered turn, committed only near the tile center.
    pub next_dir: Option<Direction>,
}

impl Body {
    pub fn new(tile: TilePos) -> Self {
        let (px, py) = tile.center();
        Body {
            tile,
            px,
            py,
            hitbox: Hitbox::centered_on(px, py),
            active: true,
            dir: None,
            next_dir: None,
        }
    }

    /// Teleport to the center of `tile`, dropping current and buffered direction.
    pub fn place(&mut self, tile: TilePos) {
        let (px, py) = tile.center();
        self.tile = tile;
        self.px = px;
        self.py = py;
        self.dir = None;
        self.next_dir = None;
        self.recenter_hitbox();
    }

    /// Signed displacement from the tracked tile's center.
    pub fn offset_from_center(&self) -> (f32, f32) {
        let (cx, cy) = self.tile.center();
        (self.px - cx, self.py - cy)
    }

    pub fn within_center(&self, tolerance: f32) -> bool {
        let (ox, oy) = self.offset_from_center();
        ox.abs() < tolerance && oy.abs() < tolerance
    }

    pub fn recenter_hitbox(&mut self) {
        self.hitbox = Hitbox::centered_on(self.px, self.py);
    }

    pub fn overlaps(&self, other: &Body) -> bool {
        self.hitbox.intersects(&other.hitbox)
    }

    /// Forced 180° turn. A motionless body stays motionless.
    pub fn reverse(&mut self) {
        self.dir = self.dir.map(Direction::opposite);
    }
}

// ── Player ──

#[derive(Clone, Debug)]
pub struct Player {
    pub body: Body,
    pub spawn: TilePos,
    pub lives: u32,
    pub score: u32,
    pub powered: bool,
    pub mouth_open: bool,
    anim_timer: f32,
}

impl Player {
    pub fn new(spawn: TilePos, lives: u32) -> Self {
        Player {
            body: Body::new(spawn),
            spawn,
            lives,
            score: 0,
            powered: false,
            mouth_open: false,
            anim_timer: 0.0,
        }
    }

    /// Advance the mouth animation; the phase flips once per `period` seconds.
    pub fn tick_animation(&mut self, dt: f32, period: f32) {
        self.anim_timer += dt;
        if self.anim_timer > period {
            self.anim_timer = 0.0;
            self.mouth_open = !self.mouth_open;
        }
    }

    /// Remove one life. Returns the lives left.
    pub fn lose_life(&mut self) -> u32 {
        self.lives = self.lives.saturating_sub(1);
        self.lives
    }

    pub fn reset_to_spawn(&mut self) {
        self.body.place(self.spawn);
        self.body.active = true;
    }
}

// ── Ghost ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GhostMode {
    Scatter,
    Chase,
    Frightened,
}

#[derive(Clone, Debug)]
pub struct Ghost {
    pub id: usize,
    pub body: Body,
    pub spawn: TilePos,
    pub mode: GhostMode,
    pub mode_timer: f32,       // seconds until the next scatter/chase flip
    pub frightened_timer: f32, // seconds of frightened mode left
    pub released: bool,
    pub release_timer: f32,    // seconds spent caged
    /// Inert until reset; never rendered, never collides.
    pub eaten: bool,
}

impl Ghost {
    pub fn new(id: usize, spawn: TilePos) -> Self {
        let mut body = Body::new(spawn);
        body.dir = Some(Direction::Up);
        Ghost {
            id,
            body,
            spawn,
            mode: GhostMode::Scatter,
            mode_timer: 0.0,
            frightened_timer: 0.0,
            released: false,
            release_timer: 0.0,
            eaten: false,
        }
    }

    /// Back to the spawn tile after the player is caught.
    /// Clears frightened/eaten; release state is kept (the gate stays open).
    pub fn reset_to_spawn(&mut self) {
        self.body.place(self.spawn);
        self.body.active = true;
        self.eaten = false;
        self.frightened_timer = 0.0;
        self.mode = GhostMode::Chase;
    }

    /// Released, not eaten: can touch the player.
    pub fn can_touch_player(&self) -> bool {
        self.released && !self.eaten
    }
}

// ── Consumables ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ConsumableKind {
    Pellet,
    PowerPellet,
}

#[derive(Clone, Debug)]
pub struct Consumable {
    pub body: Body,
    pub kind: ConsumableKind,
}

impl Consumable {
    pub fn new(tile: TilePos, kind: ConsumableKind) -> Self {
        Consumable { body: Body::new(tile), kind }
    }
}

// ── Bonus fruit ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FruitKind {
    Orange,
    Apple,
}

#[derive(Clone, Debug)]
pub struct Fruit {
    pub body: Body,
    pub kind: FruitKind,
    pub remaining: f32, // visible seconds left
}

impl Fruit {
    pub fn new(tile: TilePos, kind: FruitKind, lifetime: f32) -> Self {
        Fruit { body: Body::new(tile), kind, remaining: lifetime }
    }

    /// Advance the visibility countdown. Returns true once it has expired.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.remaining -= dt;
        if self.remaining <= 0.0 {
            self.body.active = false;
        }
        !self.body.active
    }
}
