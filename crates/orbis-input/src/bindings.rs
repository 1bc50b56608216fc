//! Fixed key bindings for the viewer.

use orbis_config::Diagnostic;
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::keyboard::KeyboardState;

/// Something the user asked for by key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCommand {
    Toggle(Diagnostic),
    /// Overlay layer slot, zero-based, in on-screen order.
    ToggleLayer(usize),
    Quit,
}

/// Physical key to command table.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    table: Vec<(KeyCode, InputCommand)>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut table = vec![
            (KeyCode::KeyB, InputCommand::Toggle(Diagnostic::Bloom)),
            (KeyCode::KeyA, InputCommand::Toggle(Diagnostic::Aurora)),
            (KeyCode::KeyT, InputCommand::Toggle(Diagnostic::Atmosphere)),
            (KeyCode::KeyO, InputCommand::Toggle(Diagnostic::Orbits)),
            (KeyCode::KeyS, InputCommand::Toggle(Diagnostic::Solar)),
            (KeyCode::KeyL, InputCommand::Toggle(Diagnostic::Labels)),
            (KeyCode::KeyR, InputCommand::Toggle(Diagnostic::Stars)),
            (KeyCode::KeyX, InputCommand::Toggle(Diagnostic::Picking)),
            (KeyCode::Escape, InputCommand::Quit),
        ];
        let digits = [
            KeyCode::Digit1,
            KeyCode::Digit2,
            KeyCode::Digit3,
            KeyCode::Digit4,
            KeyCode::Digit5,
            KeyCode::Digit6,
            KeyCode::Digit7,
            KeyCode::Digit8,
        ];
        table.extend(
            digits
                .into_iter()
                .enumerate()
                .map(|(slot, key)| (key, InputCommand::ToggleLayer(slot))),
        );
        Self { table }
    }
}

impl KeyBindings {
    pub fn command_for(&self, key: PhysicalKey) -> Option<InputCommand> {
        let PhysicalKey::Code(code) = key else {
            return None;
        };
        self.table
            .iter()
            .find(|(bound, _)| *bound == code)
            .map(|(_, command)| *command)
    }

    /// Commands for every key that went down this frame, in press order.
    pub fn resolve(&self, keyboard: &KeyboardState) -> Vec<InputCommand> {
        keyboard
            .presses()
            .iter()
            .filter_map(|&key| self.command_for(key))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::RawKeyEvent;
    use winit::event::ElementState;

    fn press(kb: &mut KeyboardState, code: KeyCode) {
        kb.process_raw(RawKeyEvent {
            key: PhysicalKey::Code(code),
            state: ElementState::Pressed,
            repeat: false,
        });
    }

    #[test]
    fn test_letters_map_to_diagnostics() {
        let bindings = KeyBindings::default();
        for diagnostic in Diagnostic::ALL {
            let hint = diagnostic.key_hint();
            let (code, _) = bindings
                .table
                .iter()
                .find(|(_, c)| *c == InputCommand::Toggle(diagnostic))
                .unwrap();
            assert_eq!(format!("{code:?}"), format!("Key{hint}"));
        }
    }

    #[test]
    fn test_digits_map_to_layer_slots() {
        let bindings = KeyBindings::default();
        assert_eq!(
            bindings.command_for(PhysicalKey::Code(KeyCode::Digit1)),
            Some(InputCommand::ToggleLayer(0))
        );
        assert_eq!(
            bindings.command_for(PhysicalKey::Code(KeyCode::Digit8)),
            Some(InputCommand::ToggleLayer(7))
        );
        assert_eq!(bindings.command_for(PhysicalKey::Code(KeyCode::Digit9)), None);
    }

    #[test]
    fn test_resolve_in_press_order() {
        let bindings = KeyBindings::default();
        let mut kb = KeyboardState::new();
        press(&mut kb, KeyCode::KeyX);
        press(&mut kb, KeyCode::KeyQ);
        press(&mut kb, KeyCode::KeyB);
        assert_eq!(
            bindings.resolve(&kb),
            vec![
                InputCommand::Toggle(Diagnostic::Picking),
                InputCommand::Toggle(Diagnostic::Bloom),
            ]
        );
    }
}
