//! Keyboard input for the terminal backend.
//!
//! Movement is step-per-press: every Press event becomes exactly one
//! `KeyInput`, in arrival order. Repeat and Release events are ignored, so
//! holding a key does not walk the mouse across the map.
//!
//! Bindings:
//!   ←↑→↓       move one cell
//!   S / L      save / load
//!   R          restart (also "new game" on the end screen)
//!   Q / Esc    quit (Ctrl+C too)

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::warn;

use crate::domain::entity::Direction;
use super::KeyInput;

pub struct InputState {
    /// Commands collected by the most recent `drain_events()` call.
    pending: Vec<KeyInput>,
}

impl InputState {
    pub fn new() -> Self {
        InputState { pending: Vec::with_capacity(8) }
    }

    /// Drain all pending terminal events without blocking.
    /// Call once per frame, before the tick.
    pub fn drain_events(&mut self) -> Vec<KeyInput> {
        loop {
            match poll(Duration::ZERO) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    warn!("input poll failed: {e}");
                    break;
                }
            }
            match event::read() {
                Ok(Event::Key(key)) => {
                    if let Some(cmd) = map_key(key) {
                        self.pending.push(cmd);
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("input read failed: {e}");
                    break;
                }
            }
        }
        std::mem::take(&mut self.pending)
    }
}

/// Translate one terminal key event. None for anything unbound.
pub fn map_key(key: KeyEvent) -> Option<KeyInput> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C')).then_some(KeyInput::Quit);
    }
    let cmd = match key.code {
        KeyCode::Up => KeyInput::Move(Direction::Up),
        KeyCode::Down => KeyInput::Move(Direction::Down),
        KeyCode::Left => KeyInput::Move(Direction::Left),
        KeyCode::Right => KeyInput::Move(Direction::Right),
        KeyCode::Char('s') | KeyCode::Char('S') => KeyInput::Save,
        KeyCode::Char('l') | KeyCode::Char('L') => KeyInput::Load,
        KeyCode::Char('r') | KeyCode::Char('R') => KeyInput::Restart,
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => KeyInput::Quit,
        _ => return None,
    };
    Some(cmd)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn arrows_move() {
        assert_eq!(map_key(press(KeyCode::Up)), Some(KeyInput::Move(Direction::Up)));
        assert_eq!(map_key(press(KeyCode::Down)), Some(KeyInput::Move(Direction::Down)));
        assert_eq!(map_key(press(KeyCode::Left)), Some(KeyInput::Move(Direction::Left)));
        assert_eq!(map_key(press(KeyCode::Right)), Some(KeyInput::Move(Direction::Right)));
    }

    #[test]
    fn commands_ignore_case() {
        for (lower, upper, cmd) in [
            ('s', 'S', KeyInput::Save),
            ('l', 'L', KeyInput::Load),
            ('r', 'R', KeyInput::Restart),
            ('q', 'Q', KeyInput::Quit),
        ] {
            assert_eq!(map_key(press(KeyCode::Char(lower))), Some(cmd));
            assert_eq!(map_key(press(KeyCode::Char(upper))), Some(cmd));
        }
        assert_eq!(map_key(press(KeyCode::Esc)), Some(KeyInput::Quit));
    }

    #[test]
    fn ctrl_c_quits() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(key), Some(KeyInput::Quit));
        let key = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert_eq!(map_key(key), None);
    }

    #[test]
    fn repeat_and_release_ignored() {
        for kind in [KeyEventKind::Repeat, KeyEventKind::Release] {
            let key = KeyEvent::new_with_kind_and_state(KeyCode::Right, KeyModifiers::NONE, kind, KeyEventState::NONE);
            assert_eq!(map_key(key), None);
        }
    }

    #[test]
    fn unbound_keys_ignored() {
        assert_eq!(map_key(press(KeyCode::Char('x'))), None);
        assert_eq!(map_key(press(KeyCode::Enter)), None);
    }
}
