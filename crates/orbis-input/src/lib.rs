//! Pointer and keyboard state for the globe viewer, and the key bindings
//! that turn presses into named commands.

pub mod bindings;
pub mod keyboard;
pub mod mouse;

pub use bindings::{InputCommand, KeyBindings};
pub use keyboard::{KeyboardState, RawKeyEvent};
pub use mouse::{CLICK_SLOP_PIXELS, MouseState};
