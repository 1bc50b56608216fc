//! The earth and what it owns: sun placement and light direction, cloud
//! drift, aurora clock, the backdrop, and the fly-to ping marker.

use glam::{Mat4, Vec3};
use orbis_geo::{geodetic_to_cartesian, wrap_unit};
use std::time::Duration;

use crate::shapes::Body;

pub const GLOBE_RADIUS: f32 = 1.0;
pub const SUN_DISTANCE: f32 = 20.0;
pub const SUN_RADIUS: f32 = 0.5;
pub const SUN_FALLBACK_COLOR: u32 = 0xffffee;
/// Cloud texture scroll, texture widths per second.
pub const CLOUD_DRIFT_RATE: f32 = 0.002;
pub const MILKY_WAY_RADIUS: f32 = 90.0;

pub const PING_RADIUS: f32 = 0.012;
pub const PING_ALTITUDE: f32 = 1.002;
pub const PING_COLOR: u32 = 0x00f0ff;
pub const PING_LIFETIME: Duration = Duration::from_secs(5);

/// Marker dropped on the surface at a fly-to target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PingMarker {
    /// Root-local position.
    pub position: Vec3,
    /// Elapsed time at creation.
    pub created_at: Duration,
}

impl PingMarker {
    pub fn is_expired(&self, now: Duration) -> bool {
        now.saturating_sub(self.created_at) >= PING_LIFETIME
    }

    pub fn body(&self) -> Body {
        Body::new(self.position, PING_RADIUS)
    }
}

#[derive(Debug, Clone)]
pub struct Globe {
    sun_local: Vec3,
    cloud_offset: f32,
    aurora_time: f32,
    ping: Option<PingMarker>,
}

impl Default for Globe {
    fn default() -> Self {
        Self::new()
    }
}

impl Globe {
    pub fn new() -> Self {
        Self {
            sun_local: Vec3::new(1.0, 0.0, 0.5).normalize() * SUN_DISTANCE,
            cloud_offset: 0.0,
            aurora_time: 0.0,
            ping: None,
        }
    }

    /// Sun centre in root-local space.
    pub fn sun_local(&self) -> Vec3 {
        self.sun_local
    }

    pub fn sun_body(&self) -> Body {
        Body::new(self.sun_local, SUN_RADIUS)
    }

    /// Unit vector toward the sun's world position under `root`. Called after
    /// the root transform for the frame is final.
    pub fn sun_direction(&self, root: &Mat4) -> Vec3 {
        root.transform_point3(self.sun_local).normalize_or_zero()
    }

    /// Scroll the clouds by `delta` seconds and, when the aurora is
    /// animating, pin its clock to `elapsed`.
    pub fn advance(&mut self, delta: f32, elapsed: f32, aurora_enabled: bool) {
        self.cloud_offset = wrap_unit(self.cloud_offset - delta * CLOUD_DRIFT_RATE);
        if aurora_enabled {
            self.aurora_time = elapsed;
        }
    }

    /// In [0, 1).
    pub fn cloud_offset(&self) -> f32 {
        self.cloud_offset
    }

    pub fn aurora_time(&self) -> f32 {
        self.aurora_time
    }

    /// Drop a marker at `(lat, lon)`, replacing any previous one.
    pub fn place_ping(&mut self, lat: f32, lon: f32, now: Duration) -> PingMarker {
        let marker = PingMarker {
            position: geodetic_to_cartesian(lat, lon, PING_ALTITUDE),
            created_at: now,
        };
        self.ping = Some(marker);
        marker
    }

    /// Remove the marker once its lifetime has passed. Returns true when one
    /// was removed.
    pub fn expire_ping(&mut self, now: Duration) -> bool {
        if self.ping.is_some_and(|p| p.is_expired(now)) {
            self.ping = None;
            return true;
        }
        false
    }

    pub fn ping(&self) -> Option<&PingMarker> {
        self.ping.as_ref()
    }
}

/// Backdrop tilt: z by π/4 then x by π/6, applied as Euler XYZ.
pub fn milky_way_matrix() -> Mat4 {
    Mat4::from_euler(
        glam::EulerRot::XYZ,
        std::f32::consts::FRAC_PI_6,
        0.0,
        std::f32::consts::FRAC_PI_4,
    ) * Mat4::from_scale(Vec3::splat(MILKY_WAY_RADIUS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneRoot;

    #[test]
    fn test_sun_sits_twenty_units_out() {
        let globe = Globe::new();
        assert!((globe.sun_local().length() - SUN_DISTANCE).abs() < 1e-4);
        assert_eq!(globe.sun_local().y, 0.0);
    }

    #[test]
    fn test_sun_direction_follows_root_rotation() {
        let globe = Globe::new();
        let mut root = SceneRoot::new();
        let before = globe.sun_direction(&root.matrix());
        root.advance(50.0, false);
        let after = globe.sun_direction(&root.matrix());
        assert!((before.length() - 1.0).abs() < 1e-5);
        assert!((after.length() - 1.0).abs() < 1e-5);
        assert!((before - after).length() > 0.5);
        let expected = root.matrix().transform_point3(globe.sun_local()).normalize();
        assert!((after - expected).length() < 1e-6);
    }

    #[test]
    fn test_cloud_offset_wraps_into_unit_interval() {
        let mut globe = Globe::new();
        globe.advance(0.5, 0.5, true);
        let off = globe.cloud_offset();
        assert!((0.0..1.0).contains(&off));
        assert!((off - (1.0 - 0.001)).abs() < 1e-5);

        for _ in 0..10_000 {
            globe.advance(0.25, 0.0, false);
        }
        assert!((0.0..1.0).contains(&globe.cloud_offset()));
    }

    #[test]
    fn test_aurora_clock_freezes_when_disabled() {
        let mut globe = Globe::new();
        globe.advance(0.016, 3.0, true);
        assert_eq!(globe.aurora_time(), 3.0);
        globe.advance(0.016, 9.0, false);
        assert_eq!(globe.aurora_time(), 3.0);
    }

    #[test]
    fn test_ping_expires_after_five_seconds() {
        let mut globe = Globe::new();
        let marker = globe.place_ping(51.5, -0.13, Duration::from_secs(10));
        assert!((marker.position.length() - PING_ALTITUDE).abs() < 1e-5);

        assert!(!globe.expire_ping(Duration::from_millis(14_999)));
        assert!(globe.ping().is_some());
        assert!(globe.expire_ping(Duration::from_secs(15)));
        assert!(globe.ping().is_none());
        assert!(!globe.expire_ping(Duration::from_secs(20)));
    }

    #[test]
    fn test_new_ping_replaces_old() {
        let mut globe = Globe::new();
        globe.place_ping(0.0, 0.0, Duration::ZERO);
        globe.place_ping(10.0, 10.0, Duration::from_secs(4));
        assert!(!globe.expire_ping(Duration::from_secs(6)));
    }
}
