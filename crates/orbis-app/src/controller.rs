//! Camera control: damped orbiting around the globe and eased fly-to
//! flights toward a geographic target.

use glam::{Mat4, Vec2, Vec3};
use orbis_config::CameraConfig;
use orbis_geo::{ease_out_cubic, geodetic_to_cartesian};
use orbis_render::Camera;
use tracing::{debug, info};

/// Distance from the globe centre a flight ends at.
pub const FLIGHT_ALTITUDE: f32 = 1.5;
/// Flight progress per second; a flight lasts 1 / rate seconds.
pub const FLIGHT_RATE: f32 = 1.2;

/// Keeps the polar angle off the poles so `look_at` has a stable up.
const POLAR_EPSILON: f32 = 1e-4;

/// An in-progress camera flight.
#[derive(Debug, Clone, PartialEq)]
pub struct Flight {
    pub start: Vec3,
    pub target: Vec3,
    /// In [0, 1].
    pub progress: f32,
    pub label: String,
}

impl Flight {
    /// Camera position for the current progress.
    pub fn position(&self) -> Vec3 {
        self.start
            .lerp(self.target, ease_out_cubic(self.progress.clamp(0.0, 1.0)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControllerState {
    FreeOrbit,
    Flying(Flight),
}

/// Reported by [`CameraController::update`].
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    /// A flight reached its target this frame.
    Arrived { label: String },
}

/// Orbit and flight state for the single scene camera.
#[derive(Debug, Clone)]
pub struct CameraController {
    min_distance: f32,
    max_distance: f32,
    damping: f32,
    rotate_speed: f32,
    zoom_speed: f32,
    state: ControllerState,
    /// Pending (azimuth, polar) rotation still to be applied, radians.
    orbit_delta: Vec2,
    /// Radius multiplier accumulated from scroll since the last update.
    zoom_scale: f32,
}

impl CameraController {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            damping: config.damping,
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            state: ControllerState::FreeOrbit,
            orbit_delta: Vec2::ZERO,
            zoom_scale: 1.0,
        }
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn is_flying(&self) -> bool {
        matches!(self.state, ControllerState::Flying(_))
    }

    /// User orbit input is accepted only outside a flight.
    pub fn input_enabled(&self) -> bool {
        !self.is_flying()
    }

    /// Start a flight toward `(lat, lon)` on the globe placed by
    /// `earth_world`. A flight already underway restarts from the camera's
    /// current position. Returns the world-space target.
    pub fn fly_to(
        &mut self,
        camera: &Camera,
        lat: f32,
        lon: f32,
        label: &str,
        earth_world: &Mat4,
    ) -> Vec3 {
        let target =
            earth_world.transform_point3(geodetic_to_cartesian(lat, lon, FLIGHT_ALTITUDE));
        info!(lat, lon, "ACQUIRING TARGET: {}", label.to_uppercase());
        self.state = ControllerState::Flying(Flight {
            start: camera.position,
            target,
            progress: 0.0,
            label: label.to_string(),
        });
        self.orbit_delta = Vec2::ZERO;
        self.zoom_scale = 1.0;
        target
    }

    /// Queue a drag in pixels. Ignored during a flight.
    pub fn rotate(&mut self, drag: Vec2) {
        if !self.input_enabled() || drag == Vec2::ZERO {
            return;
        }
        self.orbit_delta -= drag * self.rotate_speed;
    }

    /// Queue a zoom in wheel lines, positive toward the globe. Ignored
    /// during a flight.
    pub fn zoom(&mut self, lines: f32) {
        if !self.input_enabled() || lines == 0.0 {
            return;
        }
        self.zoom_scale *= self.zoom_speed.powf(lines);
    }

    /// Advance the flight or the damped orbit by `delta` seconds and aim the
    /// camera at the origin.
    pub fn update(&mut self, camera: &mut Camera, delta: f32) -> Option<ControllerEvent> {
        let mut event = None;
        if let ControllerState::Flying(flight) = &mut self.state {
            flight.progress += delta * FLIGHT_RATE;
            if flight.progress < 1.0 {
                camera.position = flight.position();
                camera.look_at(Vec3::ZERO);
                return None;
            }
            flight.progress = 1.0;
            camera.position = flight.target;
            debug!(place = %flight.label, "Flight complete");
            event = Some(ControllerEvent::Arrived {
                label: std::mem::take(&mut flight.label),
            });
            self.state = ControllerState::FreeOrbit;
        }
        self.update_orbit(camera);
        event
    }

    fn update_orbit(&mut self, camera: &mut Camera) {
        let offset = camera.position;
        let mut radius = offset.length();
        if radius <= f32::EPSILON {
            radius = self.min_distance;
        }
        let mut azimuth = offset.x.atan2(offset.z);
        let mut polar = (offset.y / radius).clamp(-1.0, 1.0).acos();

        azimuth += self.orbit_delta.x * self.damping;
        polar += self.orbit_delta.y * self.damping;
        polar = polar.clamp(POLAR_EPSILON, std::f32::consts::PI - POLAR_EPSILON);
        radius = (radius * self.zoom_scale).clamp(self.min_distance, self.max_distance);

        camera.position = Vec3::new(
            radius * polar.sin() * azimuth.sin(),
            radius * polar.cos(),
            radius * polar.sin() * azimuth.cos(),
        );
        camera.look_at(Vec3::ZERO);

        self.orbit_delta *= 1.0 - self.damping;
        self.zoom_scale = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbis_sky::SceneRoot;

    fn camera_at(distance: f32) -> Camera {
        Camera::new(Vec3::new(0.0, 0.0, distance), 45.0, 0.1, 120.0)
    }

    fn controller() -> CameraController {
        CameraController::new(&CameraConfig::default())
    }

    fn run(controller: &mut CameraController, camera: &mut Camera, seconds: f32) {
        let steps = (seconds * 60.0) as usize;
        for _ in 0..steps {
            controller.update(camera, 1.0 / 60.0);
        }
    }

    #[test]
    fn test_starts_in_free_orbit() {
        let c = controller();
        assert_eq!(*c.state(), ControllerState::FreeOrbit);
        assert!(c.input_enabled());
    }

    #[test]
    fn test_london_flight_ends_at_flight_altitude() {
        let root = SceneRoot::new();
        let mut camera = camera_at(3.5);
        let mut c = controller();
        let target = c.fly_to(&camera, 51.5, -0.12, "London", &root.matrix());
        assert!((target.length() - FLIGHT_ALTITUDE).abs() < 1e-4);
        assert!(!c.input_enabled());

        run(&mut c, &mut camera, 1.0);

        assert!(!c.is_flying());
        assert!(c.input_enabled());
        assert!((camera.distance() - FLIGHT_ALTITUDE).abs() < 1e-3);
        let to_origin = (-camera.position).normalize();
        assert!(camera.forward().dot(to_origin) > 0.9999);
    }

    #[test]
    fn test_flight_distance_to_target_decreases() {
        let root = SceneRoot::new();
        let mut camera = camera_at(3.5);
        let mut c = controller();
        let target = c.fly_to(&camera, 35.68, 139.69, "Tokyo", &root.matrix());

        let mut last = camera.position.distance(target);
        while c.is_flying() {
            c.update(&mut camera, 1.0 / 60.0);
            let now = camera.position.distance(target);
            assert!(now <= last + 1e-5, "distance grew: {last} -> {now}");
            last = now;
        }
        assert!(last < 1e-3);
    }

    #[test]
    fn test_flight_endpoints() {
        let flight = Flight {
            start: Vec3::new(0.0, 0.0, 3.5),
            target: Vec3::new(1.5, 0.0, 0.0),
            progress: 0.0,
            label: String::new(),
        };
        assert_eq!(flight.position(), flight.start);
        let done = Flight {
            progress: 1.0,
            ..flight
        };
        assert!(done.position().distance(done.target) < 1e-6);
    }

    #[test]
    fn test_arrival_event_fires_once() {
        let mut camera = camera_at(3.5);
        let mut c = controller();
        c.fly_to(&camera, 0.0, 0.0, "Null Island", &Mat4::IDENTITY);
        let mut arrivals = 0;
        for _ in 0..120 {
            if let Some(ControllerEvent::Arrived { label }) = c.update(&mut camera, 1.0 / 60.0) {
                assert_eq!(label, "Null Island");
                arrivals += 1;
            }
        }
        assert_eq!(arrivals, 1);
    }

    #[test]
    fn test_refly_restarts_from_current_position() {
        let mut camera = camera_at(3.5);
        let mut c = controller();
        c.fly_to(&camera, 0.0, 0.0, "first", &Mat4::IDENTITY);
        run(&mut c, &mut camera, 0.3);
        let midway = camera.position;
        c.fly_to(&camera, 40.0, 100.0, "second", &Mat4::IDENTITY);
        match c.state() {
            ControllerState::Flying(flight) => {
                assert_eq!(flight.start, midway);
                assert_eq!(flight.progress, 0.0);
                assert_eq!(flight.label, "second");
            }
            ControllerState::FreeOrbit => panic!("expected a flight"),
        }
    }

    #[test]
    fn test_input_ignored_while_flying() {
        let mut camera = camera_at(3.5);
        let mut c = controller();
        c.fly_to(&camera, 0.0, 0.0, "x", &Mat4::IDENTITY);
        c.rotate(Vec2::new(100.0, 0.0));
        c.zoom(10.0);
        assert_eq!(c.orbit_delta, Vec2::ZERO);
        assert_eq!(c.zoom_scale, 1.0);
        c.update(&mut camera, 0.0);
    }

    #[test]
    fn test_zoom_clamps_to_min_distance() {
        let mut camera = camera_at(3.5);
        let mut c = controller();
        for _ in 0..10 {
            c.zoom(100.0);
            c.update(&mut camera, 1.0 / 60.0);
        }
        assert!((camera.distance() - 1.15).abs() < 1e-4);
    }

    #[test]
    fn test_zoom_out_clamps_to_max_distance() {
        let mut camera = camera_at(3.5);
        let mut c = controller();
        c.zoom(-500.0);
        c.update(&mut camera, 1.0 / 60.0);
        assert!((camera.distance() - 80.0).abs() < 1e-3);
    }

    #[test]
    fn test_drag_rotation_is_damped() {
        let mut camera = camera_at(3.5);
        let mut c = controller();
        c.rotate(Vec2::new(-200.0, 0.0));
        c.update(&mut camera, 1.0 / 60.0);
        let first = camera.position;
        // One frame moves only a damped fraction of the requested rotation.
        let azimuth = first.x.atan2(first.z);
        assert!((azimuth - 200.0 * 0.005 * 0.05).abs() < 1e-4);
        // Remaining motion decays toward zero.
        run(&mut c, &mut camera, 5.0);
        let before = camera.position;
        c.update(&mut camera, 1.0 / 60.0);
        assert!(camera.position.distance(before) < 1e-4);
        assert!((camera.distance() - 3.5).abs() < 1e-3);
    }

    #[test]
    fn test_orbit_keeps_looking_at_origin() {
        let mut camera = camera_at(3.5);
        let mut c = controller();
        c.rotate(Vec2::new(50.0, 80.0));
        run(&mut c, &mut camera, 1.0);
        let to_origin = (-camera.position).normalize();
        assert!(camera.forward().dot(to_origin) > 0.9999);
    }
}
