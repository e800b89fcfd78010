/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::entity::TilePos;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub speed: SpeedConfig,
    pub ghosts: GhostConfig,
    pub fruit: FruitConfig,
    pub player: PlayerConfig,
    pub gamepad: GamepadConfig,
    /// Level file; `None` plays the built-in maze.
    pub level: Option<PathBuf>,
    /// Fixed RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct SpeedConfig {
    pub tick_rate_ms: u64,
    pub actor_speed: f32, // sub-tile units per second
    pub symmetric: bool,  // false: Up/Left run at half speed
}

#[derive(Clone, Debug)]
pub struct GhostConfig {
    pub release_secs: f32,
    pub first_scatter_secs: f32,
    pub mode_secs: f32,
    pub frightened_secs: f32,
    pub wander_chance: f64,
    pub wander_reference_hz: f32,
    pub wander_per_tick: bool, // true: `wander_chance` per update, whatever the frame rate
    pub scatter_corner: TilePos,
    pub gate: TilePos,
}

#[derive(Clone, Debug)]
pub struct FruitConfig {
    pub thresholds: Vec<u32>,
    pub lifetime_secs: f32,
    pub spawn_row: i32,
    pub history_len: usize,
}

#[derive(Clone, Debug)]
pub struct PlayerConfig {
    pub lives: u32,
    pub anim_secs: f32,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
    pub pause: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    ghosts: TomlGhosts,
    #[serde(default)]
    fruit: TomlFruit,
    #[serde(default)]
    player: TomlPlayer,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_actor_speed")]
    actor_speed: f32,
    #[serde(default)]
    symmetric: bool,
}

#[derive(Deserialize, Debug)]
struct TomlGhosts {
    #[serde(default = "default_release")]
    release_secs: f32,
    #[serde(default = "default_first_scatter")]
    first_scatter_secs: f32,
    #[serde(default = "default_mode")]
    mode_secs: f32,
    #[serde(default = "default_frightened")]
    frightened_secs: f32,
    #[serde(default = "default_wander_chance")]
    wander_chance: f64,
    #[serde(default = "default_wander_hz")]
    wander_reference_hz: f32,
    #[serde(default)]
    wander_per_tick: bool,
    #[serde(default = "default_scatter_corner")]
    scatter_corner: [i32; 2],
    #[serde(default = "default_gate")]
    gate: [i32; 2],
}

#[derive(Deserialize, Debug)]
struct TomlFruit {
    #[serde(default = "default_thresholds")]
    thresholds: Vec<u32>,
    #[serde(default = "default_fruit_lifetime")]
    lifetime_secs: f32,
    #[serde(default = "default_fruit_row")]
    spawn_row: i32,
    #[serde(default = "default_history_len")]
    history_len: usize,
}

#[derive(Deserialize, Debug)]
struct TomlPlayer {
    #[serde(default = "default_lives")]
    lives: u32,
    #[serde(default = "default_anim")]
    anim_secs: f32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
    #[serde(default = "default_pause")]
    pause: Vec<String>,
}

#[derive(Deserialize, Debug, Default)]
struct TomlGeneral {
    #[serde(default)]
    level: Option<String>,
    #[serde(default)]
    seed: Option<u64>,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 16 }
fn default_actor_speed() -> f32 { 70.0 }

fn default_release() -> f32 { 5.0 }
fn default_first_scatter() -> f32 { 7.0 }
fn default_mode() -> f32 { 5.0 }
fn default_frightened() -> f32 { 5.0 }
fn default_wander_chance() -> f64 { 0.05 }
fn default_wander_hz() -> f32 { 60.0 }
fn default_scatter_corner() -> [i32; 2] { [1, 1] }
fn default_gate() -> [i32; 2] { [9, 9] }

fn default_thresholds() -> Vec<u32> { vec![70, 170] }
fn default_fruit_lifetime() -> f32 { 9.0 }
fn default_fruit_row() -> i32 { 20 }
fn default_history_len() -> usize { 7 }

fn default_lives() -> u32 { 3 }
fn default_anim() -> f32 { 0.2 }

fn default_confirm() -> Vec<String> { vec!["Start".into(), "A".into()] }
fn default_cancel() -> Vec<String> { vec!["Select".into()] }
fn default_pause() -> Vec<String> { vec!["Start".into()] }

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            tick_rate_ms: default_tick_rate(),
            actor_speed: default_actor_speed(),
            symmetric: false,
        }
    }
}

impl Default for TomlGhosts {
    fn default() -> Self {
        TomlGhosts {
            release_secs: default_release(),
            first_scatter_secs: default_first_scatter(),
            mode_secs: default_mode(),
            frightened_secs: default_frightened(),
            wander_chance: default_wander_chance(),
            wander_reference_hz: default_wander_hz(),
            wander_per_tick: false,
            scatter_corner: default_scatter_corner(),
            gate: default_gate(),
        }
    }
}

impl Default for TomlFruit {
    fn default() -> Self {
        TomlFruit {
            thresholds: default_thresholds(),
            lifetime_secs: default_fruit_lifetime(),
            spawn_row: default_fruit_row(),
            history_len: default_history_len(),
        }
    }
}

impl Default for TomlPlayer {
    fn default() -> Self {
        TomlPlayer {
            lives: default_lives(),
            anim_secs: default_anim(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            confirm: default_confirm(),
            cancel: default_cancel(),
            pause: default_pause(),
        }
    }
}

impl Default for SpeedConfig {
    fn default() -> Self {
        GameConfig::default().speed
    }
}

impl Default for GhostConfig {
    fn default() -> Self {
        GameConfig::default().ghosts
    }
}

/// Every key at its default; no files consulted.
impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_schema(TomlConfig::default(), &[])
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        GameConfig::from_schema(toml_cfg, &search_dirs)
    }

    /// Parse config text directly. Relative level paths are kept as written.
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        let toml_cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(GameConfig::from_schema(toml_cfg, &[]))
    }

    fn from_schema(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let level = toml_cfg.general.level.as_deref().map(|p| resolve_level(p, search_dirs));
        let g = toml_cfg.ghosts;

        GameConfig {
            speed: SpeedConfig {
                tick_rate_ms: toml_cfg.speed.tick_rate_ms.max(1),
                actor_speed: toml_cfg.speed.actor_speed,
                symmetric: toml_cfg.speed.symmetric,
            },
            ghosts: GhostConfig {
                release_secs: g.release_secs,
                first_scatter_secs: g.first_scatter_secs,
                mode_secs: g.mode_secs,
                frightened_secs: g.frightened_secs,
                wander_chance: g.wander_chance.clamp(0.0, 1.0),
                wander_reference_hz: g.wander_reference_hz,
                wander_per_tick: g.wander_per_tick,
                scatter_corner: TilePos::new(g.scatter_corner[0], g.scatter_corner[1]),
                gate: TilePos::new(g.gate[0], g.gate[1]),
            },
            fruit: FruitConfig {
                thresholds: toml_cfg.fruit.thresholds,
                lifetime_secs: toml_cfg.fruit.lifetime_secs,
                spawn_row: toml_cfg.fruit.spawn_row,
                history_len: toml_cfg.fruit.history_len,
            },
            player: PlayerConfig {
                lives: toml_cfg.player.lives,
                anim_secs: toml_cfg.player.anim_secs,
            },
            gamepad: GamepadConfig {
                confirm: toml_cfg.gamepad.confirm,
                cancel: toml_cfg.gamepad.cancel,
                pause: toml_cfg.gamepad.pause,
            },
            level,
            seed: toml_cfg.general.seed,
        }
    }
}

/// Absolute paths as-is; relative ones are looked up in the search dirs,
/// falling back to the path relative to CWD.
fn resolve_level(path: &str, search_dirs: &[PathBuf]) -> PathBuf {
    let raw = PathBuf::from(path);
    if raw.is_absolute() {
        return raw;
    }
    search_dirs
        .iter()
        .map(|d| d.join(&raw))
        .find(|p| p.is_file())
        .unwrap_or(raw)
}

/// Candidate directories to search: exe dir + CWD + system paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/mazechase)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/mazechase");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory (/usr/share/mazechase)
    let sys = PathBuf::from("/usr/share/mazechase");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => {
                        log::info!("loaded settings from {}", path.display());
                        return cfg;
                    }
                    Err(e) => {
                        log::warn!("{} parse error: {e}; using default settings", path.display());
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    log::warn!("could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_timings() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.speed.tick_rate_ms, 16);
        assert_eq!(cfg.speed.actor_speed, 70.0);
        assert!(!cfg.speed.symmetric);
        assert_eq!(cfg.ghosts.release_secs, 5.0);
        assert_eq!(cfg.ghosts.first_scatter_secs, 7.0);
        assert_eq!(cfg.ghosts.gate, TilePos::new(9, 9));
        assert_eq!(cfg.ghosts.scatter_corner, TilePos::new(1, 1));
        assert_eq!(cfg.fruit.thresholds, vec![70, 170]);
        assert_eq!(cfg.fruit.history_len, 7);
        assert_eq!(cfg.player.lives, 3);
        assert!(cfg.level.is_none());
        assert!(cfg.seed.is_none());
    }

    #[test]
    fn empty_text_is_all_defaults() {
        let cfg = GameConfig::parse("").unwrap();
        assert_eq!(cfg.ghosts.frightened_secs, GameConfig::default().ghosts.frightened_secs);
        assert_eq!(cfg.gamepad.pause, vec!["Start".to_string()]);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::parse(
            "[speed]\nsymmetric = true\n\n[ghosts]\ngate = [4, 2]\n\n[general]\nseed = 42\nlevel = \"levels/level1.txt\"\n",
        )
        .unwrap();
        assert!(cfg.speed.symmetric);
        assert_eq!(cfg.speed.actor_speed, 70.0);
        assert_eq!(cfg.ghosts.gate, TilePos::new(4, 2));
        assert_eq!(cfg.ghosts.mode_secs, 5.0);
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.level, Some(PathBuf::from("levels/level1.txt")));
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let cfg = GameConfig::parse("[speed]\ntick_rate_ms = 0\n[ghosts]\nwander_chance = 3.0\n").unwrap();
        assert_eq!(cfg.speed.tick_rate_ms, 1);
        assert_eq!(cfg.ghosts.wander_chance, 1.0);
    }

    #[test]
    fn malformed_text_is_an_error() {
        assert!(GameConfig::parse("[speed\ntick_rate_ms = 5").is_err());
    }
}
