//! Frame-coherent keyboard state.
//!
//! [`KeyboardState`] accumulates winit key events during a frame and reports
//! which physical keys are held and which went down this frame. Physical
//! codes keep the toggle keys in the same place on every layout.

use std::collections::HashSet;
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::PhysicalKey;

/// Minimal description of a key event.
#[derive(Debug, Clone, Copy)]
pub struct RawKeyEvent {
    pub key: PhysicalKey,
    pub state: ElementState,
    pub repeat: bool,
}

/// Tracks held keys and this frame's presses.
///
/// Forward events with [`process_event`](Self::process_event), query, then
/// call [`clear_transients`](Self::clear_transients) once the frame is done.
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    pressed: HashSet<PhysicalKey>,
    just_pressed: Vec<PhysicalKey>,
}

impl KeyboardState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process_event(&mut self, event: &KeyEvent) {
        self.process_raw(RawKeyEvent {
            key: event.physical_key,
            state: event.state,
            repeat: event.repeat,
        });
    }

    /// Repeats are ignored so holding a toggle key flips it once.
    pub fn process_raw(&mut self, event: RawKeyEvent) {
        if event.repeat {
            return;
        }
        match event.state {
            ElementState::Pressed => {
                if self.pressed.insert(event.key) {
                    self.just_pressed.push(event.key);
                }
            }
            ElementState::Released => {
                self.pressed.remove(&event.key);
            }
        }
    }

    #[must_use]
    pub fn is_pressed(&self, key: PhysicalKey) -> bool {
        self.pressed.contains(&key)
    }

    #[must_use]
    pub fn just_pressed(&self, key: PhysicalKey) -> bool {
        self.just_pressed.contains(&key)
    }

    /// Keys that went down this frame, in press order.
    pub fn presses(&self) -> &[PhysicalKey] {
        &self.just_pressed
    }

    pub fn clear_transients(&mut self) {
        self.just_pressed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::KeyCode;

    fn raw(code: KeyCode, state: ElementState, repeat: bool) -> RawKeyEvent {
        RawKeyEvent {
            key: PhysicalKey::Code(code),
            state,
            repeat,
        }
    }

    #[test]
    fn test_press_is_reported_once() {
        let mut kb = KeyboardState::new();
        kb.process_raw(raw(KeyCode::KeyB, ElementState::Pressed, false));
        let b = PhysicalKey::Code(KeyCode::KeyB);
        assert!(kb.is_pressed(b));
        assert!(kb.just_pressed(b));
        kb.clear_transients();
        assert!(!kb.just_pressed(b));
        assert!(kb.is_pressed(b));
    }

    #[test]
    fn test_repeats_are_ignored() {
        let mut kb = KeyboardState::new();
        kb.process_raw(raw(KeyCode::KeyA, ElementState::Pressed, false));
        kb.process_raw(raw(KeyCode::KeyA, ElementState::Pressed, true));
        kb.process_raw(raw(KeyCode::KeyA, ElementState::Pressed, false));
        assert_eq!(kb.presses().len(), 1);
    }

    #[test]
    fn test_release_then_press_in_one_frame() {
        let mut kb = KeyboardState::new();
        kb.process_raw(raw(KeyCode::KeyO, ElementState::Pressed, false));
        kb.process_raw(raw(KeyCode::KeyO, ElementState::Released, false));
        kb.process_raw(raw(KeyCode::KeyS, ElementState::Pressed, false));
        let presses: Vec<_> = kb.presses().to_vec();
        assert_eq!(
            presses,
            vec![PhysicalKey::Code(KeyCode::KeyO), PhysicalKey::Code(KeyCode::KeyS)]
        );
        assert!(!kb.is_pressed(PhysicalKey::Code(KeyCode::KeyO)));
    }
}
