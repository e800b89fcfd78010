/// Maze grid: the static tile map of one level.
///
/// Rows are padded to the widest row with open floor, so every row has
/// `width` cells. Out-of-range queries read as wall.
///
/// ## Wraparound
///
/// Columns wrap (tunnel): stepping left of column 0 lands on column
/// `width - 1` and vice versa. Rows never wrap; a step above row 0 or
/// below the last row has no destination.
///
/// The only runtime mutation is `open_gate`, used when a caged ghost is
/// released.

use super::entity::{Direction, TilePos, TILE_SIZE};
use super::tile::Tile;

/// `Default` is the zero-sized grid a world holds before any level loads.
#[derive(Clone, Debug, Default)]
pub struct Maze {
    tiles: Vec<Vec<Tile>>,
    width: usize,
    height: usize,
}

impl Maze {
    /// Build from level rows. An empty row list is a programming error:
    /// the loader rejects empty files before getting here.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Self {
        assert!(!rows.is_empty(), "maze needs at least one row");
        let width = rows.iter().map(|r| r.as_ref().chars().count()).max().unwrap_or(0);
        assert!(width > 0, "maze needs at least one column");

        let tiles = rows
            .iter()
            .map(|row| {
                let mut cells: Vec<Tile> = row.as_ref().chars().map(Tile::from_char).collect();
                cells.resize(width, Tile::Open);
                cells
            })
            .collect::<Vec<_>>();

        Maze { height: tiles.len(), tiles, width }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Width of the maze in sub-tile units.
    pub fn span_x(&self) -> f32 {
        self.width as f32 * TILE_SIZE
    }

    pub fn rows(&self) -> &[Vec<Tile>] {
        &self.tiles
    }

    #[inline]
    pub fn tile_at(&self, x: i32, y: i32) -> Tile {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return Tile::Wall; // out of bounds = wall
        }
        self.tiles[y as usize][x as usize]
    }

    #[inline]
    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        self.tile_at(x, y).is_wall()
    }

    pub fn in_bounds(&self, pos: TilePos) -> bool {
        pos.x >= 0 && (pos.x as usize) < self.width && self.in_vertical_bounds(pos.y)
    }

    pub fn in_vertical_bounds(&self, y: i32) -> bool {
        y >= 0 && (y as usize) < self.height
    }

    /// Tunnel wrap for a column one step past either edge.
    pub fn wrap_x(&self, x: i32) -> i32 {
        let w = self.width as i32;
        if x < 0 {
            w - 1
        } else if x >= w {
            0
        } else {
            x
        }
    }

    /// Tile one step from `from` in `dir`, after horizontal wrap.
    /// `None` when the step leaves the maze vertically.
    pub fn neighbor(&self, from: TilePos, dir: Direction) -> Option<TilePos> {
        let (dx, dy) = dir.delta();
        let y = from.y + dy;
        if !self.in_vertical_bounds(y) {
            return None;
        }
        Some(TilePos::new(self.wrap_x(from.x + dx), y))
    }

    /// First tile (row-major) holding `tile`.
    pub fn find(&self, tile: Tile) -> Option<TilePos> {
        self.positions(tile).next()
    }

    /// Every tile (row-major) holding `tile`.
    pub fn positions(&self, tile: Tile) -> impl Iterator<Item = TilePos> + '_ {
        self.tiles.iter().enumerate().flat_map(move |(y, row)| {
            row.iter()
                .enumerate()
                .filter(move |(_, t)| **t == tile)
                .map(move |(x, _)| TilePos::new(x as i32, y as i32))
        })
    }

    /// Turn a wall cell into open floor. Returns false (and changes
    /// nothing) when `pos` is out of range or not a wall.
    pub fn open_gate(&mut self, pos: TilePos) -> bool {
        if !self.in_bounds(pos) || self.tile_at(pos.x, pos.y) != Tile::Wall {
            return false;
        }
        self.tiles[pos.y as usize][pos.x as usize] = Tile::Open;
        true
    }
}
