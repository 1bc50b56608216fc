//! Scene model for the globe: the rotating root, the Earth and sun, orbiting
//! bodies, the solar system, and the star sphere.
//!
//! Everything here is plain geometry in root-local coordinates. The renderer
//! applies [`SceneRoot::matrix`] when drawing.

mod globe;
mod orbits;
mod scene;
mod shapes;
mod solar;
mod stars;

pub use globe::{
    CLOUD_DRIFT_RATE, GLOBE_RADIUS, Globe, MILKY_WAY_RADIUS, PING_COLOR, PING_LIFETIME,
    PingMarker, SUN_DISTANCE, SUN_FALLBACK_COLOR, SUN_RADIUS, milky_way_matrix,
};
pub use orbits::{
    EarthOrbits, MOON_EMISSIVE, MOON_FALLBACK_COLOR, OrbitDescriptor, SATELLITE_RADIUS,
    STATION_COLOR, Satellite, TRAIL_OPACITY, moon_at, station_orbit,
};
pub use scene::{INITIAL_ROOT_ANGLE, ROOT_SPIN_RATE, SceneRoot};
pub use shapes::{Body, Polyline, Sprite, circle_xz};
pub use solar::{
    EARTH_ORBIT_COLOR, ORBIT_RING_COLOR, PLANETS, Planet, PlanetDescriptor, RING_COLOR,
    RING_OPACITY, SolarSystem,
};
pub use stars::{
    CONSTELLATIONS, CatalogStar, LABEL_MIN_DISTANCE, STAR_CATALOG, StarField, StarLabel,
};
