//! Tile-based maze-chase game core: maze model, actor physics, ghost AI,
//! scoring rules and the frame-stepped simulation. The terminal front end
//! lives in the binary.

pub mod config;
pub mod domain;
pub mod sim;
