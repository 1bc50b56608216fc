//! Planets circling the sun in the XZ ecliptic, with their orbit rings.
//!
//! Distances are artistic; ordering and relative sizes are kept.

use glam::{Mat4, Vec3, Vec4};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::shapes::{Body, Polyline, circle_xz};
use orbis_geo::hex_rgba;

/// Planet spin in radians per second.
pub const PLANET_SPIN_RATE: f32 = 0.6;
pub const ORBIT_RING_SEGMENTS: u32 = 128;
pub const ORBIT_RING_COLOR: u32 = 0x334455;
pub const ORBIT_RING_OPACITY: f32 = 0.12;
pub const EARTH_ORBIT_COLOR: u32 = 0x4facfe;
pub const EARTH_ORBIT_OPACITY: f32 = 0.2;

pub const RING_INNER_FACTOR: f32 = 1.4;
pub const RING_OUTER_FACTOR: f32 = 2.2;
pub const RING_TILT: f32 = std::f32::consts::PI / 2.5;
pub const RING_COLOR: u32 = 0xd4b870;
pub const RING_OPACITY: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanetDescriptor {
    pub name: &'static str,
    pub radius: f32,
    pub orbit: f32,
    /// Radians per second.
    pub speed: f32,
    pub color: u32,
    pub has_rings: bool,
}

const fn planet(
    name: &'static str,
    radius: f32,
    orbit: f32,
    speed: f32,
    color: u32,
    has_rings: bool,
) -> PlanetDescriptor {
    PlanetDescriptor {
        name,
        radius,
        orbit,
        speed,
        color,
        has_rings,
    }
}

pub const PLANETS: [PlanetDescriptor; 7] = [
    planet("Mercury", 0.06, 8.0, 0.9, 0xa0a0a0, false),
    planet("Venus", 0.10, 14.0, 0.55, 0xe8c060, false),
    planet("Mars", 0.07, 30.0, 0.3, 0xc04020, false),
    planet("Jupiter", 0.45, 50.0, 0.12, 0xc8a050, false),
    planet("Saturn", 0.35, 68.0, 0.07, 0xd4b870, true),
    planet("Uranus", 0.20, 85.0, 0.04, 0x70c8e0, false),
    planet("Neptune", 0.19, 100.0, 0.025, 0x3060d0, false),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Planet {
    pub descriptor: PlanetDescriptor,
    pub start_angle: f32,
    pub body: Body,
}

impl Planet {
    /// Ring transform relative to root-local space. The ring rides on the
    /// planet's spin, then tilts about its own X axis.
    pub fn ring_matrix(&self) -> Option<Mat4> {
        self.descriptor.has_rings.then(|| {
            Mat4::from_translation(self.body.position)
                * Mat4::from_rotation_y(self.body.spin)
                * Mat4::from_rotation_x(RING_TILT)
        })
    }

    /// Inner and outer ring radii.
    pub fn ring_radii(&self) -> (f32, f32) {
        (
            self.descriptor.radius * RING_INNER_FACTOR,
            self.descriptor.radius * RING_OUTER_FACTOR,
        )
    }

    pub fn color(&self) -> Vec4 {
        hex_rgba(self.descriptor.color, 1.0)
    }
}

#[derive(Debug, Clone)]
pub struct SolarSystem {
    sun: Vec3,
    planets: Vec<Planet>,
    rings: Vec<Polyline>,
}

impl SolarSystem {
    /// Planets orbit `sun` (root-local) with phases drawn from `seed`.
    pub fn new(sun: Vec3, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let planets = PLANETS
            .iter()
            .map(|&descriptor| Planet {
                descriptor,
                start_angle: rng.random::<f32>() * std::f32::consts::TAU,
                body: Body::new(sun, descriptor.radius),
            })
            .collect();

        let mut rings: Vec<Polyline> = PLANETS
            .iter()
            .map(|p| {
                Polyline::new(
                    circle_xz(sun, p.orbit, ORBIT_RING_SEGMENTS),
                    hex_rgba(ORBIT_RING_COLOR, ORBIT_RING_OPACITY),
                )
            })
            .collect();
        rings.push(Polyline::new(
            circle_xz(sun, sun.length(), ORBIT_RING_SEGMENTS),
            hex_rgba(EARTH_ORBIT_COLOR, EARTH_ORBIT_OPACITY),
        ));

        let mut system = Self {
            sun,
            planets,
            rings,
        };
        system.place(0.0);
        system
    }

    /// Move and spin planets to their state at `elapsed`.
    pub fn update(&mut self, elapsed: f32) {
        self.place(elapsed);
    }

    fn place(&mut self, elapsed: f32) {
        for planet in &mut self.planets {
            let angle = planet.start_angle + elapsed * planet.descriptor.speed;
            planet.body.position = Vec3::new(
                self.sun.x + angle.cos() * planet.descriptor.orbit,
                0.0,
                self.sun.z + angle.sin() * planet.descriptor.orbit,
            );
            planet.body.spin = elapsed * PLANET_SPIN_RATE;
        }
    }

    pub fn planets(&self) -> &[Planet] {
        &self.planets
    }

    /// Every planet's orbit plus the earth's own, which passes through the
    /// globe at the origin.
    pub fn orbit_rings(&self) -> &[Polyline] {
        &self.rings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sun() -> Vec3 {
        Vec3::new(1.0, 0.0, 0.5).normalize() * 20.0
    }

    #[test]
    fn test_planets_stay_on_their_orbits() {
        let mut system = SolarSystem::new(sun(), 3);
        system.update(37.0);
        for p in system.planets() {
            let r = (p.body.position - sun()).length();
            assert!((r - p.descriptor.orbit).abs() < 1e-3, "{} at {r}", p.descriptor.name);
            assert_eq!(p.body.position.y, 0.0);
        }
    }

    #[test]
    fn test_update_is_idempotent() {
        let mut a = SolarSystem::new(sun(), 3);
        a.update(5.0);
        let once = a.planets().to_vec();
        a.update(5.0);
        assert_eq!(a.planets(), once.as_slice());

        let mut b = SolarSystem::new(sun(), 3);
        b.update(1.0);
        b.update(5.0);
        assert_eq!(b.planets(), once.as_slice());
        assert!((once[0].body.spin - 5.0 * PLANET_SPIN_RATE).abs() < 1e-5);
    }

    #[test]
    fn test_only_saturn_has_rings() {
        let system = SolarSystem::new(sun(), 3);
        let ringed: Vec<_> = system
            .planets()
            .iter()
            .filter(|p| p.ring_matrix().is_some())
            .map(|p| p.descriptor.name)
            .collect();
        assert_eq!(ringed, vec!["Saturn"]);
        let saturn = &system.planets()[4];
        let (inner, outer) = saturn.ring_radii();
        assert!((inner - 0.49).abs() < 1e-5);
        assert!((outer - 0.77).abs() < 1e-5);
    }

    #[test]
    fn test_earth_orbit_ring_passes_through_origin() {
        let system = SolarSystem::new(sun(), 3);
        let rings = system.orbit_rings();
        assert_eq!(rings.len(), PLANETS.len() + 1);
        let earth = rings.last().unwrap();
        let closest = earth
            .points
            .iter()
            .map(|p| p.length())
            .fold(f32::MAX, f32::min);
        assert!(closest < 0.6, "closest approach {closest}");
        assert!((earth.color.w - EARTH_ORBIT_OPACITY).abs() < 1e-6);
    }
}
