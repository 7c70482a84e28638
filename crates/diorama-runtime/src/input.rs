//! Polled keyboard state fed to the edit session.

use std::collections::HashSet;

use diorama_scene::{InputSource, Key};
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Map a physical key to the core's key set.
pub fn map_key(code: KeyCode) -> Option<Key> {
    let key = match code {
        KeyCode::Digit1 => Key::Digit1,
        KeyCode::Digit2 => Key::Digit2,
        KeyCode::Digit3 => Key::Digit3,
        KeyCode::Digit4 => Key::Digit4,
        KeyCode::Delete => Key::Delete,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowRight => Key::ArrowRight,
        KeyCode::KeyX => Key::X,
        KeyCode::KeyY => Key::Y,
        KeyCode::KeyZ => Key::Z,
        KeyCode::Numpad2 => Key::Numpad2,
        KeyCode::Numpad4 => Key::Numpad4,
        KeyCode::Numpad6 => Key::Numpad6,
        KeyCode::Numpad7 => Key::Numpad7,
        KeyCode::Numpad8 => Key::Numpad8,
        KeyCode::Numpad9 => Key::Numpad9,
        KeyCode::NumpadAdd => Key::NumpadAdd,
        KeyCode::NumpadSubtract => Key::NumpadSubtract,
        KeyCode::KeyI => Key::I,
        KeyCode::KeyJ => Key::J,
        KeyCode::KeyK => Key::K,
        KeyCode::KeyL => Key::L,
        KeyCode::KeyU => Key::U,
        KeyCode::KeyO => Key::O,
        KeyCode::KeyV => Key::V,
        KeyCode::KeyN => Key::N,
        KeyCode::KeyG => Key::G,
        KeyCode::KeyB => Key::B,
        KeyCode::KeyF => Key::F,
        KeyCode::KeyH => Key::H,
        KeyCode::KeyP => Key::P,
        KeyCode::ShiftLeft => Key::ShiftLeft,
        KeyCode::ControlLeft => Key::ControlLeft,
        KeyCode::F1 => Key::F1,
        KeyCode::F2 => Key::F2,
        _ => return None,
    };
    Some(key)
}

#[derive(Debug, Default)]
pub struct InputState {
    pressed: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_key(&mut self, code: KeyCode, pressed: bool) {
        let Some(key) = map_key(code) else {
            return;
        };
        if pressed {
            self.pressed.insert(key);
        } else {
            self.pressed.remove(&key);
        }
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => self.on_key(*code, *state == ElementState::Pressed),
            // Releases that happen while unfocused never arrive.
            WindowEvent::Focused(false) => self.pressed.clear(),
            _ => {}
        }
    }
}

impl InputSource for InputState {
    fn is_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_release_track_key_state() {
        let mut input = InputState::new();
        input.on_key(KeyCode::Numpad6, true);
        assert!(input.is_pressed(Key::Numpad6));
        input.on_key(KeyCode::Numpad6, false);
        assert!(!input.is_pressed(Key::Numpad6));
    }

    #[test]
    fn camera_keys_are_not_mapped() {
        for code in [KeyCode::KeyW, KeyCode::KeyA, KeyCode::KeyS, KeyCode::KeyD, KeyCode::Escape] {
            assert_eq!(map_key(code), None);
        }
        let mut input = InputState::new();
        input.on_key(KeyCode::KeyW, true);
        assert_eq!(input.pressed.len(), 0);
    }

    #[test]
    fn losing_focus_releases_everything() {
        let mut input = InputState::new();
        input.on_key(KeyCode::F1, true);
        input.on_key(KeyCode::ShiftLeft, true);
        input.handle_window_event(&WindowEvent::Focused(false));
        assert!(!input.is_pressed(Key::F1));
        assert!(!input.is_pressed(Key::ShiftLeft));
    }
}
