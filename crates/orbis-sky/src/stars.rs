//! Bright-star catalog, a seeded background field, and constellation figures.

use glam::{Vec3, Vec4};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;

use crate::shapes::Sprite;
use orbis_geo::{equatorial_to_cartesian, hex_rgba};

pub const STAR_SPHERE_RADIUS: f32 = 70.0;
pub const FIELD_STAR_COUNT: usize = 2000;
/// Field stars scatter ±half this around the sphere radius.
pub const FIELD_DEPTH: f32 = 5.0;
pub const CATALOG_POINT_SIZE: f32 = 0.5;
pub const CATALOG_OPACITY: f32 = 0.9;
pub const FIELD_POINT_SIZE: f32 = 0.15;
pub const FIELD_OPACITY: f32 = 0.5;
pub const CONSTELLATION_COLOR: u32 = 0x334466;
pub const CONSTELLATION_OPACITY: f32 = 0.25;
/// Stars brighter (numerically lower) than this are labelled.
pub const LABEL_MAGNITUDE: f32 = 1.0;
/// Star labels only appear once the camera is farther than this.
pub const LABEL_MIN_DISTANCE: f32 = 4.0;

/// A named catalog star.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatalogStar {
    pub name: &'static str,
    pub ra_hours: f32,
    pub dec_degrees: f32,
    pub magnitude: f32,
}

const fn star(name: &'static str, ra_hours: f32, dec_degrees: f32, magnitude: f32) -> CatalogStar {
    CatalogStar {
        name,
        ra_hours,
        dec_degrees,
        magnitude,
    }
}

pub const STAR_CATALOG: &[CatalogStar] = &[
    star("Sirius", 6.75, -16.72, -1.46),
    star("Canopus", 6.40, -52.70, -0.74),
    star("Arcturus", 14.26, 19.18, -0.05),
    star("Vega", 18.62, 38.78, 0.03),
    star("Capella", 5.28, 46.00, 0.08),
    star("Rigel", 5.24, -8.20, 0.13),
    star("Procyon", 7.65, 5.22, 0.34),
    star("Betelgeuse", 5.92, 7.41, 0.42),
    star("Achernar", 1.63, -57.24, 0.46),
    star("Beta Centauri", 14.06, -60.37, 0.61),
    star("Altair", 19.85, 8.87, 0.77),
    star("Aldebaran", 4.60, 16.51, 0.85),
    star("Antares", 16.49, -26.43, 0.96),
    star("Spica", 13.42, -11.16, 0.97),
    star("Pollux", 7.76, 28.03, 1.14),
    star("Fomalhaut", 22.96, -29.62, 1.16),
    star("Deneb", 20.69, 45.28, 1.25),
    star("Regulus", 10.14, 11.97, 1.35),
    star("Castor", 7.58, 31.89, 1.58),
    star("Bellatrix", 5.42, 6.35, 1.64),
    star("Alnilam", 5.60, -1.20, 1.69),
    star("Polaris", 2.53, 89.26, 1.98),
    star("Alnitak", 5.68, -1.94, 1.77),
    star("Mintaka", 5.53, -0.30, 2.23),
    star("Saiph", 5.80, -9.67, 2.09),
    star("Shaula", 17.56, -37.10, 1.63),
    star("Dubhe", 11.06, 61.75, 1.79),
    star("Merak", 11.03, 56.38, 2.37),
    star("Alioth", 12.90, 55.96, 1.77),
    star("Mizar", 13.40, 54.93, 2.27),
    star("Alkaid", 13.79, 49.31, 1.86),
    star("Phecda", 11.90, 53.69, 2.44),
    star("Megrez", 12.26, 57.03, 3.31),
    star("Schedar", 0.68, 56.54, 2.23),
    star("Caph", 0.15, 59.15, 2.27),
    star("Gamma Cas", 0.95, 60.72, 2.47),
    star("Denebola", 11.82, 14.57, 2.14),
    star("Alphard", 9.46, -8.66, 1.98),
    star("Albireo", 19.51, 27.96, 3.08),
    star("Sadr", 20.37, 40.26, 2.23),
    star("Gienah", 20.77, 33.97, 2.48),
    star("Rasalhague", 17.58, 12.56, 2.08),
    star("Eltanin", 17.94, 51.49, 2.24),
    star("Thuban", 14.07, 64.38, 3.65),
    star("Kochab", 14.85, 74.16, 2.08),
    star("Hamal", 2.12, 23.46, 2.00),
    star("Alphecca", 15.58, 26.71, 2.23),
    star("Mirfak", 3.41, 49.86, 1.79),
    star("Algol", 3.14, 40.96, 2.12),
    star("Enif", 21.74, 9.88, 2.39),
    star("Markab", 23.08, 15.21, 2.49),
    star("Scheat", 23.06, 28.08, 2.42),
    star("Algenib", 0.22, 15.18, 2.83),
    star("Alpheratz", 0.14, 29.09, 2.06),
    star("Mirach", 1.16, 35.62, 2.05),
    star("Almach", 2.06, 42.33, 2.17),
    star("Diphda", 0.73, -17.99, 2.02),
    star("Acrux", 12.44, -63.10, 0.77),
    star("Mimosa", 12.80, -59.69, 1.25),
    star("Gacrux", 12.52, -57.11, 1.63),
    star("Peacock", 20.43, -56.74, 1.94),
    star("Atria", 16.81, -69.03, 1.92),
    star("Avior", 8.38, -59.51, 1.86),
    star("Miaplacidus", 9.22, -69.72, 1.68),
    star("Alnair", 22.14, -46.96, 1.74),
    star("Sargas", 17.62, -42.99, 1.87),
    star("Kaus Australis", 18.40, -34.38, 1.85),
    star("Nunki", 18.92, -26.30, 2.05),
    star("Naos", 8.06, -40.00, 2.25),
    star("Wezen", 7.14, -26.39, 1.84),
    star("Adhara", 6.98, -28.97, 1.50),
    star("Mirzam", 6.38, -17.96, 1.98),
    star("Alhena", 6.63, 16.40, 1.93),
    star("Elnath", 5.44, 28.61, 1.65),
    star("Menkalinan", 6.00, 44.95, 1.90),
    star("Dschubba", 16.01, -22.62, 2.32),
    star("Graffias", 16.09, -19.81, 2.62),
    star("Wei", 16.84, -34.29, 2.29),
];

/// Figures as pairs of catalog names.
pub const CONSTELLATIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Orion",
        &[
            ("Betelgeuse", "Bellatrix"),
            ("Bellatrix", "Mintaka"),
            ("Mintaka", "Alnilam"),
            ("Alnilam", "Alnitak"),
            ("Alnitak", "Saiph"),
            ("Saiph", "Rigel"),
            ("Rigel", "Mintaka"),
            ("Betelgeuse", "Alnitak"),
        ],
    ),
    (
        "Ursa Major",
        &[
            ("Dubhe", "Merak"),
            ("Merak", "Phecda"),
            ("Phecda", "Megrez"),
            ("Megrez", "Alioth"),
            ("Alioth", "Mizar"),
            ("Mizar", "Alkaid"),
            ("Megrez", "Dubhe"),
        ],
    ),
    (
        "Cassiopeia",
        &[("Schedar", "Caph"), ("Schedar", "Gamma Cas")],
    ),
    (
        "Scorpius",
        &[
            ("Antares", "Dschubba"),
            ("Dschubba", "Graffias"),
            ("Antares", "Shaula"),
            ("Antares", "Wei"),
            ("Wei", "Sargas"),
            ("Sargas", "Shaula"),
        ],
    ),
    ("Leo", &[("Regulus", "Denebola"), ("Regulus", "Alphard")]),
    (
        "Summer Triangle",
        &[("Vega", "Deneb"), ("Deneb", "Altair"), ("Altair", "Vega")],
    ),
    ("Southern Cross", &[("Acrux", "Gacrux"), ("Mimosa", "Gacrux")]),
    (
        "Pegasus",
        &[
            ("Markab", "Scheat"),
            ("Scheat", "Alpheratz"),
            ("Alpheratz", "Algenib"),
            ("Algenib", "Markab"),
            ("Scheat", "Enif"),
        ],
    ),
    ("Andromeda", &[("Alpheratz", "Mirach"), ("Mirach", "Almach")]),
    ("Perseus", &[("Mirfak", "Algol")]),
    (
        "Cygnus",
        &[("Deneb", "Sadr"), ("Sadr", "Albireo"), ("Sadr", "Gienah")],
    ),
];

/// Brightness in [0.3, 1.4]: larger for lower magnitudes.
pub fn catalog_brightness(magnitude: f32) -> f32 {
    (1.0 - magnitude * 0.25).max(0.3)
}

/// Blue-white for the brightest, warm white below magnitude 1, amber beyond.
pub fn catalog_tint(magnitude: f32) -> Vec3 {
    if magnitude < 0.0 {
        Vec3::new(0.9, 0.95, 1.0)
    } else if magnitude < 1.0 {
        Vec3::new(1.0, 0.98, 0.9)
    } else {
        Vec3::new(0.95, 0.9, 0.85)
    }
}

/// A star name anchored to a root-local position.
#[derive(Debug, Clone, PartialEq)]
pub struct StarLabel {
    pub name: &'static str,
    pub position: Vec3,
}

/// Catalog and field stars plus constellation segments, all root-local.
#[derive(Debug, Clone)]
pub struct StarField {
    catalog: Vec<Sprite>,
    field: Vec<Sprite>,
    segments: Vec<(Vec3, Vec3)>,
    labels: Vec<StarLabel>,
}

impl StarField {
    /// Build the sky once. The background field is drawn from `seed`.
    pub fn new(seed: u64) -> Self {
        let positions: HashMap<&str, Vec3> = STAR_CATALOG
            .iter()
            .map(|s| {
                (
                    s.name,
                    equatorial_to_cartesian(s.ra_hours, s.dec_degrees, STAR_SPHERE_RADIUS),
                )
            })
            .collect();

        let catalog = STAR_CATALOG
            .iter()
            .map(|s| Sprite {
                position: positions[s.name],
                size: CATALOG_POINT_SIZE * catalog_brightness(s.magnitude),
                color: catalog_tint(s.magnitude).extend(CATALOG_OPACITY),
            })
            .collect();

        let segments = CONSTELLATIONS
            .iter()
            .flat_map(|(_, pairs)| pairs.iter())
            .filter_map(|(a, b)| Some((*positions.get(a)?, *positions.get(b)?)))
            .collect();

        let labels = STAR_CATALOG
            .iter()
            .filter(|s| s.magnitude < LABEL_MAGNITUDE)
            .map(|s| StarLabel {
                name: s.name,
                position: positions[s.name],
            })
            .collect();

        Self {
            catalog,
            field: generate_field(seed),
            segments,
            labels,
        }
    }

    pub fn catalog(&self) -> &[Sprite] {
        &self.catalog
    }

    pub fn field(&self) -> &[Sprite] {
        &self.field
    }

    /// Constellation line segments.
    pub fn segments(&self) -> &[(Vec3, Vec3)] {
        &self.segments
    }

    pub fn segment_color(&self) -> Vec4 {
        hex_rgba(CONSTELLATION_COLOR, CONSTELLATION_OPACITY)
    }

    pub fn labels(&self) -> &[StarLabel] {
        &self.labels
    }
}

fn generate_field(seed: u64) -> Vec<Sprite> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..FIELD_STAR_COUNT)
        .map(|_| {
            let theta = rng.random::<f32>() * std::f32::consts::TAU;
            let phi = (2.0 * rng.random::<f32>() - 1.0).acos();
            let r = STAR_SPHERE_RADIUS + (rng.random::<f32>() - 0.5) * FIELD_DEPTH;
            let magnitude = 2.5 + rng.random::<f32>() * 3.0;
            let brightness = (1.0 - magnitude * 0.2).max(0.1);
            Sprite {
                position: Vec3::new(
                    r * phi.sin() * theta.cos(),
                    r * phi.cos(),
                    r * phi.sin() * theta.sin(),
                ),
                size: FIELD_POINT_SIZE * brightness * 1.5,
                color: Vec4::new(0.9, 0.9, 0.95, FIELD_OPACITY),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_on_star_sphere() {
        let stars = StarField::new(1);
        assert_eq!(stars.catalog().len(), STAR_CATALOG.len());
        for s in stars.catalog() {
            assert!((s.position.length() - STAR_SPHERE_RADIUS).abs() < 1e-3);
        }
    }

    #[test]
    fn test_field_is_seeded_and_within_shell() {
        let a = StarField::new(42);
        let b = StarField::new(42);
        assert_eq!(a.field().len(), FIELD_STAR_COUNT);
        assert_eq!(a.field(), b.field());
        for s in a.field() {
            let r = s.position.length();
            assert!((r - STAR_SPHERE_RADIUS).abs() <= FIELD_DEPTH / 2.0 + 1e-3);
        }
        assert_ne!(a.field()[0], StarField::new(43).field()[0]);
    }

    #[test]
    fn test_every_constellation_pair_resolves() {
        let total: usize = CONSTELLATIONS.iter().map(|(_, p)| p.len()).sum();
        assert_eq!(StarField::new(0).segments().len(), total);
    }

    #[test]
    fn test_labels_are_the_brightest_stars() {
        let stars = StarField::new(0);
        let names: Vec<_> = stars.labels().iter().map(|l| l.name).collect();
        assert!(names.contains(&"Sirius"));
        assert!(names.contains(&"Acrux"));
        assert!(!names.contains(&"Pollux"));
        assert!(!names.contains(&"Polaris"));
    }

    #[test]
    fn test_brightness_and_tint_by_magnitude() {
        assert!(catalog_brightness(-1.46) > catalog_brightness(2.0));
        assert_eq!(catalog_brightness(5.0), 0.3);
        assert_eq!(catalog_tint(-0.5), Vec3::new(0.9, 0.95, 1.0));
        assert_eq!(catalog_tint(0.5), Vec3::new(1.0, 0.98, 0.9));
    }
}
