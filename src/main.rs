/// Entry point and game loop.
///
/// Usage: `mazechase [LEVEL_FILE]`
///
/// The level path on the command line wins over `[general] level` in
/// config.toml; with neither, the built-in maze is played.

mod ui;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use mazechase::config::GameConfig;
use mazechase::sim::event::GameEvent;
use mazechase::sim::level::{self, LevelSource};
use mazechase::sim::world::WorldState;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::{Overlay, Renderer};

const FRAME_SLEEP: Duration = Duration::from_millis(5);

/// How long a status message stays on screen.
const MESSAGE_SECS: f32 = 2.0;

/// Blink period for power pellets and overlay headers.
const BLINK_SECS: f32 = 0.25;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Phase {
    Playing,
    Paused,
    GameOver,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut config = GameConfig::load();
    if let Some(arg) = std::env::args_os().nth(1) {
        config.level = Some(PathBuf::from(arg));
    }

    let gamepad_config = config.gamepad.clone();
    let tick_rate = Duration::from_millis(config.speed.tick_rate_ms);
    let source = LevelSource::from_option(config.level.clone());

    let mut world = WorldState::new(config);
    if let Err(e) = level::load(&mut world, source) {
        log::error!("{e}");
        return Err(e.into());
    }

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return Err(e.into());
    }

    let mut gamepad = GamepadState::new(&gamepad_config);
    let result = game_loop(&mut world, &mut renderer, &mut gamepad, tick_rate);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    println!();
    println!("Final Score: {}", world.hud().score);
    result
}

// ── Key Constants ──

const KEYS_PAUSE: &[KeyCode] = &[KeyCode::F(1), KeyCode::Char('p'), KeyCode::Char('P')];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc];

/// Status line + blink clock, owned by the loop.
struct StatusLine {
    message: Option<String>,
    message_timer: f32,
    blink_timer: f32,
    blink: bool,
}

impl StatusLine {
    fn new() -> Self {
        StatusLine { message: None, message_timer: 0.0, blink_timer: 0.0, blink: true }
    }

    fn show(&mut self, text: impl Into<String>) {
        self.message = Some(text.into());
        self.message_timer = MESSAGE_SECS;
    }

    fn tick(&mut self, dt: f32) {
        self.blink_timer += dt;
        if self.blink_timer >= BLINK_SECS {
            self.blink_timer = 0.0;
            self.blink = !self.blink;
        }
        if self.message_timer > 0.0 {
            self.message_timer -= dt;
            if self.message_timer <= 0.0 {
                self.message = None;
            }
        }
    }
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    gamepad: &mut GamepadState,
    tick_rate: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut hud = StatusLine::new();
    let mut phase = Phase::Playing;
    let mut last_tick = Instant::now();
    let dt = tick_rate.as_secs_f32();

    loop {
        kb.drain_events();
        gamepad.update();

        if kb.ctrl_c_pressed() {
            break;
        }
        if kb.any_pressed(KEYS_QUIT) || gamepad.cancel_pressed() {
            break;
        }

        // ── Meta keys ──
        match phase {
            Phase::Playing | Phase::Paused => {
                if kb.any_pressed(KEYS_PAUSE) || gamepad.pause_pressed() {
                    phase = if phase == Phase::Paused { Phase::Playing } else { Phase::Paused };
                } else if kb.any_pressed(KEYS_RESTART) {
                    restart(world, &mut hud);
                    phase = Phase::Playing;
                }
            }
            Phase::GameOver => {
                if kb.any_pressed(KEYS_CONFIRM) || kb.any_pressed(KEYS_RESTART) || gamepad.confirm_pressed() {
                    restart(world, &mut hud);
                    phase = Phase::Playing;
                }
            }
        }

        if phase == Phase::Playing {
            if let Some(dir) = kb.direction().or_else(|| gamepad.direction()) {
                world.set_direction(dir);
            }
        }

        if last_tick.elapsed() >= tick_rate {
            if phase == Phase::Playing {
                let events = world.update(dt);
                report_events(&events, &mut hud);
                if world.is_game_over() {
                    phase = Phase::GameOver;
                }
            }
            hud.tick(dt);
            last_tick = Instant::now();
        }

        let overlay = match phase {
            Phase::Playing => Overlay::None,
            Phase::Paused => Overlay::Paused,
            Phase::GameOver => Overlay::GameOver,
        };
        renderer.render(world, overlay, hud.message.as_deref(), hud.blink)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// Fresh session on the same level.
fn restart(world: &mut WorldState, hud: &mut StatusLine) {
    match level::restart(world, false) {
        Ok(()) => hud.show("READY!"),
        Err(e) => {
            log::error!("restart failed: {e}");
            hud.show("Restart failed");
        }
    }
}

fn report_events(events: &[GameEvent], hud: &mut StatusLine) {
    for event in events {
        match event {
            GameEvent::FruitSpawned { .. } => hud.show("Fruit!"),
            GameEvent::FruitEaten { points, .. } => hud.show(format!("+{points}")),
            GameEvent::GhostEaten { .. } => hud.show("+200"),
            GameEvent::PlayerCaught { lives_left } if *lives_left > 0 => {
                hud.show(format!("Caught! {lives_left} left"))
            }
            GameEvent::LevelCleared => hud.show("LEVEL CLEARED!"),
            GameEvent::GameOver => hud.show("GAME OVER"),
            _ => {}
        }
    }
}
