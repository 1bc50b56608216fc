//! Geodetic and equatorial coordinate conversions.

use glam::Vec3;

/// A point given by latitude/longitude in degrees and a radius.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Geodetic {
    /// Degrees north, in [-90, 90].
    pub lat: f32,
    /// Degrees east, in [-180, 180].
    pub lon: f32,
    /// Distance from the globe centre.
    pub radius: f32,
}

/// Position of `(lat, lon)` at `radius` from the centre.
///
/// Longitude zero lands on +X and +90° east on -Z; the 180° offset lines an
/// equirectangular texture's left edge up with the antimeridian.
pub fn geodetic_to_cartesian(lat: f32, lon: f32, radius: f32) -> Vec3 {
    let phi = (90.0 - lat).to_radians();
    let theta = (lon + 180.0).to_radians();
    Vec3::new(
        -radius * phi.sin() * theta.cos(),
        radius * phi.cos(),
        radius * phi.sin() * theta.sin(),
    )
}

/// Inverse of [`geodetic_to_cartesian`].
///
/// A zero-length input has no direction and maps to the origin default.
/// At the poles the longitude is arbitrary and reported as -180.
pub fn cartesian_to_geodetic(position: Vec3) -> Geodetic {
    let radius = position.length();
    if radius <= f32::EPSILON {
        return Geodetic::default();
    }

    let horizontal = (position.x * position.x + position.z * position.z).sqrt();
    let lat = position.y.atan2(horizontal).to_degrees();
    let theta = position.z.atan2(-position.x).to_degrees();

    Geodetic {
        lat,
        lon: wrap_longitude(theta - 180.0),
        radius,
    }
}

/// Position of a celestial object from right ascension (hours) and
/// declination (degrees).
pub fn equatorial_to_cartesian(ra_hours: f32, dec_degrees: f32, radius: f32) -> Vec3 {
    let ra = ra_hours / 24.0 * std::f32::consts::TAU;
    let dec = dec_degrees.to_radians();
    Vec3::new(
        -radius * dec.cos() * ra.cos(),
        radius * dec.sin(),
        radius * dec.cos() * ra.sin(),
    )
}

/// Wrap a longitude in degrees into [-180, 180].
pub fn wrap_longitude(lon: f32) -> f32 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && lon > 0.0 {
        180.0
    } else {
        wrapped
    }
}
