//! Earth's orbital environment: the moon, the space station with its trail,
//! and a small satellite constellation.
//!
//! Every position is a closed-form function of elapsed time, so any frame can
//! be reproduced without history.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::shapes::{Body, Polyline};
use orbis_geo::hex_rgba;

pub const MOON_RADIUS: f32 = 0.27;
pub const MOON_DISTANCE: f32 = 3.5;
pub const MOON_INCLINATION: f32 = 0.09;
pub const MOON_RATE: f32 = 0.05;
pub const MOON_FALLBACK_COLOR: u32 = 0x999999;
pub const MOON_EMISSIVE: u32 = 0x111111;

pub const STATION_RADIUS: f32 = 0.012;
pub const STATION_ALTITUDE: f32 = 1.06;
pub const STATION_INCLINATION_DEG: f32 = 51.6;
pub const STATION_RATE: f32 = 2.0;
pub const STATION_COLOR: u32 = 0x00ff00;

pub const TRAIL_SAMPLES: usize = 300;
/// Seconds between trail samples.
pub const TRAIL_STEP: f32 = 0.02;
pub const TRAIL_OPACITY: f32 = 0.3;

pub const SATELLITE_RADIUS: f32 = 0.005;

/// A circular orbit around the globe centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitDescriptor {
    pub altitude: f32,
    pub inclination: f32,
    /// Radians per second.
    pub speed: f32,
    pub phase: f32,
    /// Right ascension of the ascending node.
    pub raan: f32,
}

impl OrbitDescriptor {
    pub fn position_at(&self, elapsed: f32) -> Vec3 {
        let angle = self.phase + elapsed * self.speed;
        let sx = angle.cos() * self.altitude;
        let sz = angle.sin() * self.altitude;
        let (sin_i, cos_i) = self.inclination.sin_cos();
        let (sin_r, cos_r) = self.raan.sin_cos();
        Vec3::new(
            sx * cos_r - sz * sin_r * cos_i,
            sz * sin_i,
            sx * sin_r + sz * cos_r * cos_i,
        )
    }
}

/// The station's orbit: no node offset, zero phase.
pub fn station_orbit() -> OrbitDescriptor {
    OrbitDescriptor {
        altitude: STATION_ALTITUDE,
        inclination: STATION_INCLINATION_DEG.to_radians(),
        speed: STATION_RATE,
        phase: 0.0,
        raan: 0.0,
    }
}

/// Moon position and spin. The moon keeps one face toward the globe.
pub fn moon_at(elapsed: f32) -> Body {
    let angle = elapsed * MOON_RATE;
    Body {
        position: Vec3::new(
            angle.cos() * MOON_DISTANCE,
            MOON_INCLINATION.sin() * angle.sin() * MOON_DISTANCE,
            angle.sin() * MOON_DISTANCE,
        ),
        radius: MOON_RADIUS,
        spin: angle,
    }
}

/// Inclination, speed, colour, altitude.
const SATELLITE_TABLE: [(f32, f32, u32, f32); 10] = [
    (0.35, 3.5, 0xffff00, 1.03),
    (0.80, 2.8, 0xff8800, 1.04),
    (0.10, 2.2, 0x00ffff, 1.05),
    (0.60, 1.5, 0xff00ff, 1.08),
    (0.05, 0.8, 0xffffff, 1.15),
    (0.98, 3.0, 0x88ff88, 1.03),
    (0.45, 2.5, 0xff4444, 1.04),
    (0.70, 1.8, 0x4488ff, 1.06),
    (0.52, 2.0, 0xffaa00, 1.07),
    (0.30, 3.2, 0x00ff88, 1.03),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Satellite {
    pub orbit: OrbitDescriptor,
    pub color: u32,
    pub position: Vec3,
}

/// Moon, station, trail, and satellites in root-local space.
#[derive(Debug, Clone)]
pub struct EarthOrbits {
    moon: Body,
    station: Body,
    trail: Vec<Vec3>,
    satellites: Vec<Satellite>,
}

impl EarthOrbits {
    /// Satellite phases and nodes are drawn from `seed`.
    pub fn new(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let satellites = SATELLITE_TABLE
            .iter()
            .map(|&(inclination, speed, color, altitude)| {
                let orbit = OrbitDescriptor {
                    altitude,
                    inclination,
                    speed,
                    phase: rng.random::<f32>() * std::f32::consts::TAU,
                    raan: rng.random::<f32>() * std::f32::consts::TAU,
                };
                Satellite {
                    orbit,
                    color,
                    position: orbit.position_at(0.0),
                }
            })
            .collect();

        let mut orbits = Self {
            moon: moon_at(0.0),
            station: Body::new(Vec3::ZERO, STATION_RADIUS),
            trail: Vec::with_capacity(TRAIL_SAMPLES),
            satellites,
        };
        orbits.update(0.0);
        orbits
    }

    /// Recompute every position for `elapsed` seconds.
    pub fn update(&mut self, elapsed: f32) {
        self.moon = moon_at(elapsed);

        let station = station_orbit();
        self.station.position = station.position_at(elapsed);
        self.trail.clear();
        self.trail.extend(
            (0..TRAIL_SAMPLES).map(|i| station.position_at(elapsed - i as f32 * TRAIL_STEP)),
        );

        for sat in &mut self.satellites {
            sat.position = sat.orbit.position_at(elapsed);
        }
    }

    pub fn moon(&self) -> Body {
        self.moon
    }

    pub fn station(&self) -> Body {
        self.station
    }

    /// Newest sample first.
    pub fn station_trail(&self) -> &[Vec3] {
        &self.trail
    }

    pub fn trail_polyline(&self) -> Polyline {
        Polyline::new(self.trail.clone(), hex_rgba(STATION_COLOR, TRAIL_OPACITY))
    }

    pub fn satellites(&self) -> &[Satellite] {
        &self.satellites
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_follows_inclined_orbit() {
        let orbit = station_orbit();
        for i in 0..50 {
            let p = orbit.position_at(i as f32 * 0.13);
            assert!((p.length() - STATION_ALTITUDE).abs() < 1e-4);
            let max_y = STATION_ALTITUDE * STATION_INCLINATION_DEG.to_radians().sin();
            assert!(p.y.abs() <= max_y + 1e-4);
        }
        let quarter = orbit.position_at(std::f32::consts::FRAC_PI_4);
        assert!(quarter.y > 0.8, "y = {}", quarter.y);
    }

    #[test]
    fn test_moon_orbit_and_spin() {
        let moon = moon_at(0.0);
        assert!((moon.position - Vec3::new(MOON_DISTANCE, 0.0, 0.0)).length() < 1e-5);
        let later = moon_at(20.0);
        assert_eq!(later.spin, 1.0);
        assert_eq!(later.radius, MOON_RADIUS);
    }

    #[test]
    fn test_trail_is_recomputed_not_accumulated() {
        let mut orbits = EarthOrbits::new(7);
        orbits.update(3.0);
        let first = orbits.station_trail().to_vec();
        orbits.update(4.0);
        orbits.update(3.0);
        assert_eq!(orbits.station_trail().len(), TRAIL_SAMPLES);
        assert_eq!(orbits.station_trail(), first.as_slice());
        assert_eq!(orbits.station_trail()[0], orbits.station().position);
    }

    #[test]
    fn test_satellites_are_seeded() {
        let a = EarthOrbits::new(42);
        let b = EarthOrbits::new(42);
        let c = EarthOrbits::new(43);
        assert_eq!(a.satellites().len(), 10);
        assert_eq!(a.satellites(), b.satellites());
        assert_ne!(a.satellites()[0].orbit.phase, c.satellites()[0].orbit.phase);
    }

    #[test]
    fn test_orbits_are_deterministic_and_periodic() {
        let orbits = EarthOrbits::new(9);
        let descriptors = std::iter::once(station_orbit())
            .chain(orbits.satellites().iter().map(|s| s.orbit));
        for orbit in descriptors {
            let period = std::f32::consts::TAU / orbit.speed;
            for t in [0.0, 1.7, 12.5] {
                let p = orbit.position_at(t);
                assert_eq!(p, orbit.position_at(t));
                let wrapped = orbit.position_at(t + period);
                assert!(
                    (wrapped - p).length() < 1e-3,
                    "speed {} at t={t}: {p} vs {wrapped}",
                    orbit.speed
                );
            }
        }
    }

    #[test]
    fn test_satellite_altitude_preserved() {
        let mut orbits = EarthOrbits::new(1);
        orbits.update(123.4);
        for sat in orbits.satellites() {
            assert!((sat.position.length() - sat.orbit.altitude).abs() < 1e-4);
        }
    }
}
