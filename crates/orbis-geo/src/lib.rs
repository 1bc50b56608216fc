//! Geodesy utilities for a unit globe.
//!
//! Pure functions mapping latitude/longitude and right ascension/declination
//! onto the globe's Cartesian frame (+Y north, longitude 0 on +X after the
//! 180° texture offset), great-circle arcs for routes and cables, the
//! scalar easing curves shared by animation code, and hex colour decoding.

mod arc;
mod color;
mod easing;
mod geodetic;

pub use arc::{
    DEFAULT_ARC_BASE_RADIUS, DEFAULT_ARC_HEIGHT_BIAS, DEFAULT_ARC_SEGMENTS, DEGENERATE_ARC_RADIUS,
    DEGENERATE_ARC_THRESHOLD, GreatCircleArc,
};
pub use color::{hex_rgba, hex_to_linear};
pub use easing::{ease_out_cubic, lerp, smoothstep, wrap_unit};
pub use geodetic::{
    Geodetic, cartesian_to_geodetic, equatorial_to_cartesian, geodetic_to_cartesian,
    wrap_longitude,
};
