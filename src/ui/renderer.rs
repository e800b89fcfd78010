/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The renderer only reads the world's render surface
/// (`maze()`, `sprites()`, `hud()`); it never touches actors directly.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use mazechase::domain::entity::{Direction, FruitKind, GhostMode};
use mazechase::domain::tile::Tile;
use mazechase::sim::world::{SpriteKind, WorldState};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for every cell, so terminal gaps between
    /// rows match the cells.
    const BASE_BG: Color = Color::Rgb { r: 10, g: 10, b: 20 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Never equal to a real cell; filling `back` with it forces a full repaint.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y); clipped at the right edge.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width {
                break;
            }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }
}

// ── Renderer ──

/// Each maze tile = 2 terminal columns.
const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const WALL_FG: Color = Color::Rgb { r: 60, g: 60, b: 255 };
const WALL_BG: Color = Color::Rgb { r: 20, g: 20, b: 120 };

/// What to draw on top of the maze.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Overlay {
    None,
    Paused,
    GameOver,
}

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_overlay: Option<Overlay>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_overlay: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    /// Draw one frame. `blink` toggles a few times per second; `message`
    /// is a transient status line.
    pub fn render(
        &mut self,
        world: &WorldState,
        overlay: Overlay,
        message: Option<&str>,
        blink: bool,
    ) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Overlay change → clean repaint
        if self.last_overlay != Some(overlay) {
            self.back.cells.fill(Cell::INVALID);
            self.last_overlay = Some(overlay);
        }

        self.front.clear();
        self.compose_hud(world);
        let origin_x = self.compose_maze(world);
        self.compose_sprites(world, origin_x, blink);
        self.compose_footer(world, message);

        match overlay {
            Overlay::None => {}
            Overlay::Paused => self.compose_box(world, &["PAUSED", "", "P / F1  Resume", "R  Restart", "Esc  Quit"], blink),
            Overlay::GameOver => {
                let score = format!("Final score: {}", world.hud().score);
                let score = score.as_str();
                self.compose_box(world, &["GAME OVER", "", score, "", "Enter  Play again", "Esc  Quit"], blink);
            }
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_hud(&mut self, w: &WorldState) {
        let hud = w.hud();
        let lives: String = std::iter::repeat('♥').take(hud.lives as usize).collect();
        let fruit: String = hud.fruit_history.iter().map(|&k| fruit_glyph(k)).collect();
        let power = if hud.powered { "  POWER" } else { "" };
        let line = format!(" SCORE {:<7}  LIVES {:<5}  {}{} ", hud.score, lives, fruit, power);

        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &line, Color::White, HUD_BG);
    }

    /// Draw walls and floor. Returns the terminal column of maze column 0.
    fn compose_maze(&mut self, w: &WorldState) -> usize {
        let maze = w.maze();
        let origin_x = self.term_w.saturating_sub(maze.width() * CELL_W) / 2;

        for (gy, row) in maze.rows().iter().enumerate() {
            let ty = MAP_ROW + gy;
            for (gx, tile) in row.iter().enumerate() {
                let tx = origin_x + gx * CELL_W;
                let cell = match tile {
                    Tile::Wall => Cell::new('█', WALL_FG, WALL_BG),
                    _ => Cell::BLANK,
                };
                self.front.set(tx, ty, cell);
                self.front.set(tx + 1, ty, cell);
            }
        }
        origin_x
    }

    fn compose_sprites(&mut self, w: &WorldState, origin_x: usize, blink: bool) {
        for s in w.sprites() {
            if s.tile.x < 0 || s.tile.y < 0 {
                continue;
            }
            let tx = origin_x + s.tile.x as usize * CELL_W;
            let ty = MAP_ROW + s.tile.y as usize;
            let (ch, fg) = sprite_glyph(s.kind, s.facing, blink);
            self.front.set(tx, ty, Cell::new(ch, fg, Color::Reset));
            self.front.set(tx + 1, ty, Cell::BLANK);
        }
    }

    fn compose_footer(&mut self, w: &WorldState, message: Option<&str>) {
        let below = MAP_ROW + w.maze().height() + 1;
        if let Some(msg) = message {
            let text = format!(" {msg} ");
            let x = self.term_w.saturating_sub(text.chars().count()) / 2;
            self.front.put_str(x, below, &text, Color::Black, Color::Rgb { r: 230, g: 200, b: 40 });
        }
        let help = " Arrows/WASD: Move   P/F1: Pause   R: Restart   Esc: Quit";
        self.front.put_str(0, below + 2, help, Color::DarkGrey, Color::Reset);
    }

    fn compose_box(&mut self, w: &WorldState, lines: &[&str], blink: bool) {
        let dim = Color::Rgb { r: 40, g: 40, b: 40 };
        let hdr = if blink { Color::Rgb { r: 255, g: 220, b: 50 } } else { Color::Rgb { r: 200, g: 160, b: 30 } };
        let text = Color::Rgb { r: 200, g: 200, b: 200 };

        let box_w = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 6;
        let box_h = lines.len() + 2;
        let map_h = w.maze().height();
        let box_x = self.term_w.saturating_sub(box_w) / 2;
        let box_y = MAP_ROW + map_h.saturating_sub(box_h) / 2;

        for y in box_y..box_y + box_h {
            for x in box_x..box_x + box_w {
                self.front.set(x, y, Cell::new(' ', Color::Reset, dim));
            }
        }
        for (i, line) in lines.iter().enumerate() {
            let fg = if i == 0 { hdr } else { text };
            let x = box_x + (box_w - line.chars().count()) / 2;
            self.front.put_str(x, box_y + 1 + i, line, fg, dim);
        }
    }
}

// ── Glyphs ──

fn fruit_glyph(kind: FruitKind) -> char {
    match kind {
        FruitKind::Orange => '●',
        FruitKind::Apple => '♣',
    }
}

const GHOST_COLORS: [Color; 4] = [
    Color::Rgb { r: 255, g: 40, b: 40 },
    Color::Rgb { r: 255, g: 150, b: 200 },
    Color::Rgb { r: 0, g: 220, b: 255 },
    Color::Rgb { r: 255, g: 160, b: 40 },
];

fn sprite_glyph(kind: SpriteKind, facing: Option<Direction>, blink: bool) -> (char, Color) {
    match kind {
        SpriteKind::Pellet => ('·', Color::Rgb { r: 255, g: 200, b: 170 }),
        SpriteKind::PowerPellet => (if blink { '●' } else { '•' }, Color::Rgb { r: 255, g: 200, b: 170 }),
        SpriteKind::Fruit(k) => {
            let fg = match k {
                FruitKind::Orange => Color::Rgb { r: 255, g: 140, b: 0 },
                FruitKind::Apple => Color::Rgb { r: 230, g: 30, b: 30 },
            };
            (fruit_glyph(k), fg)
        }
        SpriteKind::Ghost { mode: GhostMode::Frightened, .. } => ('ᗣ', Color::Rgb { r: 60, g: 60, b: 255 }),
        SpriteKind::Ghost { id, .. } => ('ᗣ', GHOST_COLORS[id % GHOST_COLORS.len()]),
        SpriteKind::Player { mouth_open } => {
            let ch = match (mouth_open, facing) {
                (false, _) => '●',
                (true, Some(Direction::Left)) => 'ᗤ',
                (true, Some(Direction::Up)) => 'ᗢ',
                (true, Some(Direction::Down)) => 'ᗜ',
                (true, _) => 'ᗧ',
            };
            (ch, Color::Rgb { r: 255, g: 230, b: 0 })
        }
    }
}
