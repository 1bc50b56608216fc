//! The rotating root every celestial object hangs from.

use glam::{Mat4, Quat, Vec3};

/// Starting yaw of the root, radians.
pub const INITIAL_ROOT_ANGLE: f32 = -std::f32::consts::FRAC_PI_2;
/// Idle spin rate about +Y, radians per second.
pub const ROOT_SPIN_RATE: f32 = 0.02;

/// Yaw of the sky around the world Y axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneRoot {
    angle: f32,
}

impl Default for SceneRoot {
    fn default() -> Self {
        Self {
            angle: INITIAL_ROOT_ANGLE,
        }
    }
}

impl SceneRoot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spin by `delta` seconds. The sky holds still during a flight so the
    /// target stays put.
    pub fn advance(&mut self, delta: f32, flying: bool) {
        if !flying {
            self.angle += delta * ROOT_SPIN_RATE;
        }
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.angle)
    }

    /// Root-local to world.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_rotation_y(self.angle)
    }

    /// World to root-local.
    pub fn to_local(&self, world: Vec3) -> Vec3 {
        self.rotation().inverse() * world
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_a_quarter_turn_back() {
        let root = SceneRoot::new();
        assert_eq!(root.angle(), -std::f32::consts::FRAC_PI_2);
        // +X local ends up on +Z world.
        let p = root.matrix().transform_point3(Vec3::X);
        assert!((p - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_advances_only_while_not_flying() {
        let mut root = SceneRoot::new();
        root.advance(1.0, false);
        assert!((root.angle() - (INITIAL_ROOT_ANGLE + 0.02)).abs() < 1e-6);
        root.advance(10.0, true);
        assert!((root.angle() - (INITIAL_ROOT_ANGLE + 0.02)).abs() < 1e-6);
    }

    #[test]
    fn test_to_local_inverts_matrix() {
        let mut root = SceneRoot::new();
        root.advance(3.0, false);
        let local = Vec3::new(0.3, -0.2, 0.9);
        let world = root.matrix().transform_point3(local);
        assert!((root.to_local(world) - local).length() < 1e-5);
    }
}
