/// Events emitted during a simulation step.
/// The presentation layer consumes these for flashes and status text.

use crate::domain::entity::{FruitKind, GhostMode, TilePos};

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    PelletEaten { at: TilePos },
    PowerPelletEaten { at: TilePos },
    GhostReleased { id: usize },
    GhostModeChanged { id: usize, mode: GhostMode },
    GhostEaten { id: usize },
    PlayerCaught { lives_left: u32 },
    FruitSpawned { kind: FruitKind, at: TilePos },
    FruitEaten { kind: FruitKind, points: u32 },
    FruitExpired,
    LevelCleared,
    GameOver,
}
