//! Great-circle arcs lifted off the globe surface.

use glam::Vec3;

use crate::geodetic::geodetic_to_cartesian;

/// Segment count used for cables and flight routes.
pub const DEFAULT_ARC_SEGMENTS: usize = 32;
/// Radius of the arc endpoints, just above the surface.
pub const DEFAULT_ARC_BASE_RADIUS: f32 = 1.002;
/// Peak lift per radian of separation.
pub const DEFAULT_ARC_HEIGHT_BIAS: f32 = 0.05;
/// Separations below this (radians, about 0.06°) collapse to one point.
pub const DEGENERATE_ARC_THRESHOLD: f32 = 0.001;
/// Radius of the single point emitted for a degenerate arc.
pub const DEGENERATE_ARC_RADIUS: f32 = 1.003;

/// Lazy sequence of points along the shorter great circle between two
/// surface directions.
///
/// Each point sits at `base_radius + sin(t·π)·height_bias·angle`, so the arc
/// leaves and lands on the surface and peaks at its midpoint. The iterator is
/// finite and `Clone`; cloning before iteration (or calling
/// [`restart`](Self::restart)) replays the same points.
#[derive(Debug, Clone)]
pub struct GreatCircleArc {
    from: Vec3,
    to: Vec3,
    angle: f32,
    segments: usize,
    height_bias: f32,
    base_radius: f32,
    next: usize,
}

impl GreatCircleArc {
    /// Arc between two directions. Inputs are normalized; zero vectors
    /// produce a degenerate arc.
    pub fn new(from: Vec3, to: Vec3, segments: usize, height_bias: f32) -> Self {
        let from = from.normalize_or_zero();
        let to = to.normalize_or_zero();
        let angle = if from == Vec3::ZERO || to == Vec3::ZERO {
            0.0
        } else {
            from.dot(to).clamp(-1.0, 1.0).acos()
        };

        Self {
            from,
            to,
            angle,
            segments: segments.max(1),
            height_bias,
            base_radius: DEFAULT_ARC_BASE_RADIUS,
            next: 0,
        }
    }

    /// Arc between two geodetic points with the default segment count and lift.
    pub fn between(lat1: f32, lon1: f32, lat2: f32, lon2: f32) -> Self {
        Self::new(
            geodetic_to_cartesian(lat1, lon1, 1.0),
            geodetic_to_cartesian(lat2, lon2, 1.0),
            DEFAULT_ARC_SEGMENTS,
            DEFAULT_ARC_HEIGHT_BIAS,
        )
    }

    /// Override the radius of the arc endpoints.
    pub fn with_base_radius(mut self, base_radius: f32) -> Self {
        self.base_radius = base_radius;
        self
    }

    /// Angular separation of the endpoints in radians.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// True when the endpoints are too close to interpolate between.
    pub fn is_degenerate(&self) -> bool {
        self.angle < DEGENERATE_ARC_THRESHOLD
    }

    /// Rewind to the first point.
    pub fn restart(&mut self) {
        self.next = 0;
    }

    fn total(&self) -> usize {
        if self.is_degenerate() {
            1
        } else {
            self.segments + 1
        }
    }

    fn point_at(&self, index: usize) -> Vec3 {
        if self.is_degenerate() {
            return self.from * DEGENERATE_ARC_RADIUS;
        }

        let t = index as f32 / self.segments as f32;
        let sin_angle = self.angle.sin();
        let w1 = ((1.0 - t) * self.angle).sin() / sin_angle;
        let w2 = (t * self.angle).sin() / sin_angle;
        let lift = (t * std::f32::consts::PI).sin() * self.height_bias * self.angle;
        (self.from * w1 + self.to * w2) * (self.base_radius + lift)
    }
}

impl Iterator for GreatCircleArc {
    type Item = Vec3;

    fn next(&mut self) -> Option<Vec3> {
        if self.next >= self.total() {
            return None;
        }
        let point = self.point_at(self.next);
        self.next += 1;
        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for GreatCircleArc {}
