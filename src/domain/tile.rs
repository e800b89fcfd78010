/// Maze cell types and their properties.
/// Properties are queried via methods, not stored as flags,
/// so cell semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tile {
    Open,
    Wall,
    Pellet,      // Spawns a pellet actor on load
    PowerPellet, // Spawns a power pellet actor on load
    PlayerSpawn,
    GhostSpawn,
}

impl Tile {
    /// Classify one character of a level description.
    /// Anything unrecognized (including space) is open floor.
    pub fn from_char(ch: char) -> Tile {
        match ch {
            '#' => Tile::Wall,
            '.' => Tile::Pellet,
            'o' => Tile::PowerPellet,
            'P' => Tile::PlayerSpawn,
            'G' => Tile::GhostSpawn,
            _ => Tile::Open,
        }
    }

    /// Blocks every actor.
    pub fn is_wall(self) -> bool {
        matches!(self, Tile::Wall)
    }

    /// Can an actor occupy this cell?
    pub fn is_passable(self) -> bool {
        !self.is_wall()
    }
}
