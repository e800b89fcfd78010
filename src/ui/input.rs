/// Keyboard state for the game loop.
///
/// Tracks which keys are currently held down, enabling:
///   - Steering requests while an arrow / WASD key is held
///   - Edge-triggered pause, restart and quit (only fire on initial press)
///
/// Terminals rarely report key releases, so a key counts as held until
/// `HOLD_TIMEOUT` passes without a Press/Repeat for it. A Release event,
/// when one does arrive, drops the key immediately.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers, poll};

use mazechase::domain::entity::Direction;

const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

pub struct InputState {
    /// Last Press/Repeat per key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that went from released to held during the last drain.
    fresh_presses: Vec<KeyCode>,

    ctrl_c: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            ctrl_c: false,
        }
    }

    /// Read every pending terminal event without blocking. Call once per
    /// loop iteration.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.ctrl_c = false;

        while poll(Duration::ZERO).unwrap_or(false) {
            let key = match event::read() {
                Ok(Event::Key(key)) => key,
                _ => continue,
            };

            if key.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
            {
                self.ctrl_c = true;
            }

            if key.kind == KeyEventKind::Release {
                self.last_active.remove(&key.code);
                continue;
            }
            if !self.is_held(key.code) {
                self.fresh_presses.push(key.code);
            }
            self.last_active.insert(key.code, Instant::now());
        }

        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active
            .get(&code)
            .is_some_and(|t| t.elapsed() < HOLD_TIMEOUT)
    }

    /// Steering request from the keyboard. A fresh press beats a key that
    /// was already held, so tapping a new direction while holding another
    /// still turns.
    pub fn direction(&self) -> Option<Direction> {
        let fresh = self.fresh_presses.iter().rev().find_map(|&c| key_direction(c));
        fresh.or_else(|| {
            Direction::ALL
                .into_iter()
                .find(|&d| DIRECTION_KEYS.iter().any(|&(k, kd)| kd == d && self.is_held(k)))
        })
    }

    /// Was this key freshly pressed this frame? (edge trigger)
    /// Used for one-shot actions (pause, confirm).
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    /// Convenience: was any of these keys freshly pressed?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.ctrl_c
    }
}

const DIRECTION_KEYS: [(KeyCode, Direction); 12] = [
    (KeyCode::Up, Direction::Up),
    (KeyCode::Char('w'), Direction::Up),
    (KeyCode::Char('W'), Direction::Up),
    (KeyCode::Down, Direction::Down),
    (KeyCode::Char('s'), Direction::Down),
    (KeyCode::Char('S'), Direction::Down),
    (KeyCode::Left, Direction::Left),
    (KeyCode::Char('a'), Direction::Left),
    (KeyCode::Char('A'), Direction::Left),
    (KeyCode::Right, Direction::Right),
    (KeyCode::Char('d'), Direction::Right),
    (KeyCode::Char('D'), Direction::Right),
];

fn key_direction(code: KeyCode) -> Option<Direction> {
    DIRECTION_KEYS.iter().find(|&&(k, _)| k == code).map(|&(_, d)| d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_and_wasd_map_to_directions() {
        assert_eq!(key_direction(KeyCode::Left), Some(Direction::Left));
        assert_eq!(key_direction(KeyCode::Char('W')), Some(Direction::Up));
        assert_eq!(key_direction(KeyCode::Char('d')), Some(Direction::Right));
        assert_eq!(key_direction(KeyCode::Char('p')), None);
    }

    #[test]
    fn fresh_press_wins_over_held_key() {
        let mut input = InputState::new();
        let now = Instant::now();
        input.last_active.insert(KeyCode::Up, now);
        input.last_active.insert(KeyCode::Char('a'), now);
        assert_eq!(input.direction(), Some(Direction::Up));

        input.fresh_presses.push(KeyCode::Char('a'));
        assert_eq!(input.direction(), Some(Direction::Left));
        assert!(input.was_pressed(KeyCode::Char('a')));
        assert!(!input.was_pressed(KeyCode::Up));
    }

    #[test]
    fn nothing_held_means_no_request() {
        let input = InputState::new();
        assert_eq!(input.direction(), None);
        assert!(!input.ctrl_c_pressed());
    }
}
