//! Render-agnostic geometry handed to the renderer each frame.

use glam::{Mat4, Vec3, Vec4};

/// A camera-facing point with a distance-attenuated size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub position: Vec3,
    pub size: f32,
    /// Linear RGB with straight alpha.
    pub color: Vec4,
}

/// A connected line strip.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub points: Vec<Vec3>,
    pub color: Vec4,
    /// Blend additively instead of over.
    pub additive: bool,
}

impl Polyline {
    pub fn new(points: Vec<Vec3>, color: Vec4) -> Self {
        Self {
            points,
            color,
            additive: false,
        }
    }

    /// Segment endpoint pairs, for line-list rendering.
    pub fn segments(&self) -> impl Iterator<Item = (Vec3, Vec3)> + '_ {
        self.points.windows(2).map(|w| (w[0], w[1]))
    }
}

/// A sphere placed in root-local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub position: Vec3,
    pub radius: f32,
    /// Rotation about the body's own Y axis, radians.
    pub spin: f32,
}

impl Body {
    pub fn new(position: Vec3, radius: f32) -> Self {
        Self {
            position,
            radius,
            spin: 0.0,
        }
    }

    /// Local transform: translate, spin, then scale a unit sphere.
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position)
            * Mat4::from_rotation_y(self.spin)
            * Mat4::from_scale(Vec3::splat(self.radius))
    }
}

/// `segments + 1` points around a circle in the XZ plane; first and last coincide.
pub fn circle_xz(center: Vec3, radius: f32, segments: u32) -> Vec<Vec3> {
    let segments = segments.max(3);
    (0..=segments)
        .map(|i| {
            let a = i as f32 / segments as f32 * std::f32::consts::TAU;
            Vec3::new(center.x + a.cos() * radius, center.y, center.z + a.sin() * radius)
        })
        .collect()
}
