//! Window-size tracking and conversions between pixels and normalized device
//! coordinates.
//!
//! Zero-size windows (minimized, or Wayland before the first configure) are
//! clamped to 1×1 for the GPU but reported as not presentable, so the frame
//! loop can skip submission without tearing anything down.

use glam::Vec2;

/// Minimum surface dimension (prevents zero-size panics).
pub const MIN_SURFACE_DIMENSION: u32 = 1;

/// Emitted when the physical size or scale factor actually changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportResize {
    /// New physical width in pixels (clamped to >= 1).
    pub width: u32,
    /// New physical height in pixels (clamped to >= 1).
    pub height: u32,
    /// Physical pixels per logical pixel.
    pub scale_factor: f64,
}

impl ViewportResize {
    /// Width over height.
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Current drawable area in physical pixels.
#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    width: u32,
    height: u32,
    scale_factor: f64,
    minimized: bool,
}

impl Viewport {
    /// Create a viewport from the window's initial physical size.
    pub fn new(width: u32, height: u32, scale_factor: f64) -> Self {
        Self {
            width: width.max(MIN_SURFACE_DIMENSION),
            height: height.max(MIN_SURFACE_DIMENSION),
            scale_factor,
            minimized: width == 0 || height == 0,
        }
    }

    /// Track a window resize. Returns `None` when nothing changed.
    pub fn handle_resize(&mut self, width: u32, height: u32) -> Option<ViewportResize> {
        self.minimized = width == 0 || height == 0;
        let width = width.max(MIN_SURFACE_DIMENSION);
        let height = height.max(MIN_SURFACE_DIMENSION);

        if width == self.width && height == self.height {
            return None;
        }

        self.width = width;
        self.height = height;
        Some(self.resize_event())
    }

    /// Track a DPI change; the physical size changes with it.
    pub fn handle_scale_factor_changed(
        &mut self,
        scale_factor: f64,
        width: u32,
        height: u32,
    ) -> Option<ViewportResize> {
        let scale_changed = (scale_factor - self.scale_factor).abs() > f64::EPSILON;
        self.scale_factor = scale_factor;
        match self.handle_resize(width, height) {
            None if scale_changed => Some(self.resize_event()),
            other => other,
        }
    }

    fn resize_event(&self) -> ViewportResize {
        ViewportResize {
            width: self.width,
            height: self.height,
            scale_factor: self.scale_factor,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Width over height.
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// False while the window has no drawable area.
    pub fn is_presentable(&self) -> bool {
        !self.minimized
    }

    /// Pixel position (origin top-left, +y down) to NDC (+y up, [-1, 1]).
    pub fn pixel_to_ndc(&self, pixel: Vec2) -> Vec2 {
        Vec2::new(
            pixel.x / self.width as f32 * 2.0 - 1.0,
            -(pixel.y / self.height as f32) * 2.0 + 1.0,
        )
    }

    /// NDC to pixel position; the inverse of [`pixel_to_ndc`](Self::pixel_to_ndc).
    pub fn ndc_to_pixel(&self, ndc: Vec2) -> Vec2 {
        let half_w = self.width as f32 / 2.0;
        let half_h = self.height as f32 / 2.0;
        Vec2::new(ndc.x * half_w + half_w, -ndc.y * half_h + half_h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_size_is_clamped_and_not_presentable() {
        let viewport = Viewport::new(0, 0, 1.0);
        assert_eq!(viewport.width(), 1);
        assert_eq!(viewport.height(), 1);
        assert!(!viewport.is_presentable());
    }

    #[test]
    fn test_first_real_resize_becomes_presentable() {
        let mut viewport = Viewport::new(0, 0, 1.0);
        let event = viewport.handle_resize(1920, 1080).unwrap();
        assert_eq!((event.width, event.height), (1920, 1080));
        assert!(viewport.is_presentable());
        assert!((event.aspect_ratio() - 16.0 / 9.0).abs() < 1e-5);
    }

    #[test]
    fn test_no_event_on_same_dimensions() {
        let mut viewport = Viewport::new(1280, 720, 1.0);
        assert!(viewport.handle_resize(1280, 720).is_none());
    }

    #[test]
    fn test_minimize_keeps_last_size_clamped() {
        let mut viewport = Viewport::new(800, 600, 1.0);
        let event = viewport.handle_resize(0, 0).unwrap();
        assert_eq!((event.width, event.height), (1, 1));
        assert!(!viewport.is_presentable());
    }

    #[test]
    fn test_scale_factor_change_reports_even_without_size_change() {
        let mut viewport = Viewport::new(1920, 1080, 1.0);
        let event = viewport.handle_scale_factor_changed(2.0, 1920, 1080).unwrap();
        assert_eq!(event.scale_factor, 2.0);
        assert_eq!(viewport.scale_factor(), 2.0);
    }

    #[test]
    fn test_ndc_round_trip() {
        let viewport = Viewport::new(1280, 720, 1.0);
        let centre = viewport.pixel_to_ndc(Vec2::new(640.0, 360.0));
        assert!(centre.length() < 1e-6);

        let top_left = viewport.pixel_to_ndc(Vec2::ZERO);
        assert_eq!(top_left, Vec2::new(-1.0, 1.0));

        let pixel = Vec2::new(100.0, 600.0);
        let back = viewport.ndc_to_pixel(viewport.pixel_to_ndc(pixel));
        assert!((back - pixel).length() < 1e-3);
    }
}
