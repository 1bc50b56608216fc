//! Frame-coherent pointer state.
//!
//! [`MouseState`] accumulates winit cursor, button and wheel events during a
//! frame. It tracks drag deltas for the orbit controls, scroll for zoom, and
//! recognizes a click as a left press and release that barely moved.

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

/// A press and release farther apart than this is a drag, not a click.
pub const CLICK_SLOP_PIXELS: f32 = 4.0;

#[derive(Debug, Clone, Copy, Default)]
struct ButtonFrame {
    pressed: bool,
    just_pressed: bool,
    just_released: bool,
}

fn button_index(button: MouseButton) -> usize {
    match button {
        MouseButton::Left => 0,
        MouseButton::Right => 1,
        MouseButton::Middle => 2,
        _ => 3,
    }
}

#[derive(Debug, Clone)]
pub struct MouseState {
    position: Vec2,
    delta: Vec2,
    buttons: [ButtonFrame; 4],
    scroll: f32,
    press_origin: Option<Vec2>,
    clicked: bool,
    cursor_in_window: bool,
}

impl Default for MouseState {
    fn default() -> Self {
        Self::new()
    }
}

impl MouseState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec2::ZERO,
            delta: Vec2::ZERO,
            buttons: [ButtonFrame::default(); 4],
            scroll: 0.0,
            press_origin: None,
            clicked: false,
            cursor_in_window: false,
        }
    }

    // ── Event handlers ──────────────────────────────────────────────

    /// Process a `CursorMoved` event (physical pixels).
    pub fn on_cursor_moved(&mut self, x: f64, y: f64) {
        let new_pos = Vec2::new(x as f32, y as f32);
        self.delta += new_pos - self.position;
        self.position = new_pos;
    }

    pub fn on_button(&mut self, button: MouseButton, state: ElementState) {
        let frame = &mut self.buttons[button_index(button)];
        match state {
            ElementState::Pressed => {
                frame.pressed = true;
                frame.just_pressed = true;
                if button == MouseButton::Left {
                    self.press_origin = Some(self.position);
                }
            }
            ElementState::Released => {
                frame.pressed = false;
                frame.just_released = true;
                if button == MouseButton::Left {
                    self.clicked = self
                        .press_origin
                        .take()
                        .is_some_and(|origin| origin.distance(self.position) <= CLICK_SLOP_PIXELS);
                }
            }
        }
    }

    pub fn on_scroll(&mut self, delta: MouseScrollDelta) {
        match delta {
            MouseScrollDelta::LineDelta(_x, y) => {
                self.scroll += y;
            }
            MouseScrollDelta::PixelDelta(pos) => {
                // ~40 pixels per line
                self.scroll += (pos.y / 40.0) as f32;
            }
        }
    }

    pub fn on_cursor_entered(&mut self) {
        self.cursor_in_window = true;
    }

    pub fn on_cursor_left(&mut self) {
        self.cursor_in_window = false;
        self.press_origin = None;
    }

    /// Clears delta, scroll, click and per-button edges. Call at end of frame.
    pub fn clear_transients(&mut self) {
        self.delta = Vec2::ZERO;
        self.scroll = 0.0;
        self.clicked = false;
        for b in &mut self.buttons {
            b.just_pressed = false;
            b.just_released = false;
        }
    }

    // ── Queries ─────────────────────────────────────────────────────

    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Movement since the last clear.
    #[must_use]
    pub fn delta(&self) -> Vec2 {
        self.delta
    }

    /// Movement since the last clear while the left button was held.
    #[must_use]
    pub fn drag(&self) -> Vec2 {
        if self.is_button_pressed(MouseButton::Left) {
            self.delta
        } else {
            Vec2::ZERO
        }
    }

    #[must_use]
    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.buttons[button_index(button)].pressed
    }

    #[must_use]
    pub fn just_button_pressed(&self, button: MouseButton) -> bool {
        self.buttons[button_index(button)].just_pressed
    }

    #[must_use]
    pub fn just_button_released(&self, button: MouseButton) -> bool {
        self.buttons[button_index(button)].just_released
    }

    /// Wheel lines this frame, positive away from the user.
    #[must_use]
    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    /// A left click completed this frame.
    #[must_use]
    pub fn clicked(&self) -> bool {
        self.clicked
    }

    #[must_use]
    pub fn cursor_in_window(&self) -> bool {
        self.cursor_in_window
    }

    /// Pointer in normalized device coordinates: x right, y up, both in [-1, 1].
    #[must_use]
    pub fn ndc(&self, width: u32, height: u32) -> Vec2 {
        let size = Vec2::new(width.max(1) as f32, height.max(1) as f32);
        Vec2::new(
            self.position.x / size.x * 2.0 - 1.0,
            -(self.position.y / size.y) * 2.0 + 1.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_only_while_left_held() {
        let mut mouse = MouseState::new();
        mouse.on_cursor_moved(10.0, 10.0);
        mouse.clear_transients();
        mouse.on_cursor_moved(20.0, 15.0);
        assert_eq!(mouse.drag(), Vec2::ZERO);
        mouse.on_button(MouseButton::Left, ElementState::Pressed);
        mouse.on_cursor_moved(25.0, 15.0);
        assert_eq!(mouse.drag(), Vec2::new(15.0, 5.0));
    }

    #[test]
    fn test_click_vs_drag() {
        let mut mouse = MouseState::new();
        mouse.on_cursor_moved(100.0, 100.0);
        mouse.on_button(MouseButton::Left, ElementState::Pressed);
        mouse.on_cursor_moved(102.0, 101.0);
        mouse.on_button(MouseButton::Left, ElementState::Released);
        assert!(mouse.clicked());
        mouse.clear_transients();
        assert!(!mouse.clicked());

        mouse.on_button(MouseButton::Left, ElementState::Pressed);
        mouse.on_cursor_moved(160.0, 101.0);
        mouse.on_button(MouseButton::Left, ElementState::Released);
        assert!(!mouse.clicked());
    }

    #[test]
    fn test_ndc_corners() {
        let mut mouse = MouseState::new();
        mouse.on_cursor_moved(0.0, 0.0);
        assert_eq!(mouse.ndc(800, 600), Vec2::new(-1.0, 1.0));
        mouse.on_cursor_moved(400.0, 300.0);
        assert_eq!(mouse.ndc(800, 600), Vec2::ZERO);
        mouse.on_cursor_moved(800.0, 600.0);
        assert_eq!(mouse.ndc(800, 600), Vec2::new(1.0, -1.0));
    }

    #[test]
    fn test_scroll_accumulates_and_clears() {
        let mut mouse = MouseState::new();
        mouse.on_scroll(MouseScrollDelta::LineDelta(0.0, 1.0));
        mouse.on_scroll(MouseScrollDelta::LineDelta(0.0, 2.0));
        assert_eq!(mouse.scroll(), 3.0);
        mouse.clear_transients();
        assert_eq!(mouse.scroll(), 0.0);
    }
}
