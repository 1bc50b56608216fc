//! Screen-space readouts: city and star labels projected from the scene,
//! camera telemetry, the frame counter and the population ticker.
//!
//! Text is carried by the window title; labels are exposed as screen
//! positions for hover and click handling and drawn as markers by the
//! renderer.

use glam::{Mat4, Vec2, Vec3};
use orbis_geo::cartesian_to_geodetic;
use orbis_overlay::{City, OverlayRecord};
use orbis_render::Camera;
use orbis_sky::{LABEL_MIN_DISTANCE, StarLabel};
use rand::Rng;

pub const EARTH_RADIUS_KM: f32 = 6371.0;
/// Labels whose surface normal is turned further than this from the camera
/// direction are hidden.
pub const FACING_THRESHOLD: f32 = 0.15;
/// Pointer distance in pixels within which a label counts as hovered.
pub const LABEL_HOVER_RADIUS: f32 = 10.0;
pub const CITY_CATEGORY: &str = "METROPOLITAN NODE";
pub const INITIAL_POPULATION: u64 = 8_189_700_000;

/// Highest city tier shown at camera `distance` from the globe centre.
pub fn city_tier_limit(distance: f32) -> u8 {
    if distance > 10.0 {
        0
    } else if distance > 3.0 {
        1
    } else if distance > 2.0 {
        2
    } else if distance > 1.5 {
        3
    } else {
        4
    }
}

/// NDC to window pixels, origin top-left.
pub fn ndc_to_screen(ndc: Vec2, size: Vec2) -> Vec2 {
    let half = size * 0.5;
    Vec2::new(ndc.x * half.x + half.x, -ndc.y * half.y + half.y)
}

/// A city label placed on screen this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct CityLabel {
    pub city: &'static City,
    pub screen: Vec2,
    /// Surface anchor in world space.
    pub world: Vec3,
}

/// Cities visible from `camera`: within the tier limit for its distance and
/// facing it.
pub fn project_city_labels(
    cities: &'static [City],
    camera: &Camera,
    earth_world: &Mat4,
    size: Vec2,
) -> Vec<CityLabel> {
    let limit = city_tier_limit(camera.distance());
    let camera_dir = camera.position.normalize_or_zero();
    cities
        .iter()
        .filter(|city| city.tier <= limit)
        .filter_map(|city| {
            let local = orbis_geo::geodetic_to_cartesian(city.lat, city.lon, 1.0);
            let world = earth_world.transform_point3(local);
            if world.normalize_or_zero().dot(camera_dir) < FACING_THRESHOLD {
                return None;
            }
            let ndc = camera.project(world)?;
            Some(CityLabel {
                city,
                screen: ndc_to_screen(ndc.truncate(), size),
                world,
            })
        })
        .collect()
}

/// A star name placed on screen this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct StarLabelView {
    pub name: &'static str,
    pub screen: Vec2,
    /// Star position in world space.
    pub world: Vec3,
}

/// Star labels, shown only once the camera has pulled back past
/// [`LABEL_MIN_DISTANCE`]. Anchors are root-local and turn with `root`.
pub fn project_star_labels(
    labels: &[StarLabel],
    camera: &Camera,
    root: &Mat4,
    size: Vec2,
) -> Vec<StarLabelView> {
    if camera.distance() <= LABEL_MIN_DISTANCE {
        return Vec::new();
    }
    labels
        .iter()
        .filter_map(|label| {
            let world = root.transform_point3(label.position);
            let ndc = camera.project(world)?;
            // Reverse-Z: depth 0 is the far plane.
            if !(0.0..=1.0).contains(&ndc.z) {
                return None;
            }
            Some(StarLabelView {
                name: label.name,
                screen: ndc_to_screen(ndc.truncate(), size),
                world,
            })
        })
        .collect()
}

/// Nearest label to `pointer` within [`LABEL_HOVER_RADIUS`].
pub fn city_label_at(labels: &[CityLabel], pointer: Vec2) -> Option<&CityLabel> {
    labels
        .iter()
        .map(|label| (label, label.screen.distance(pointer)))
        .filter(|(_, d)| *d <= LABEL_HOVER_RADIUS)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(label, _)| label)
}

pub fn star_label_at(labels: &[StarLabelView], pointer: Vec2) -> Option<&StarLabelView> {
    labels
        .iter()
        .map(|label| (label, label.screen.distance(pointer)))
        .filter(|(_, d)| *d <= LABEL_HOVER_RADIUS)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(label, _)| label)
}

/// Inspect record shown while a city label is hovered.
pub fn city_record(city: &City) -> OverlayRecord {
    OverlayRecord::new(city.lat, city.lon)
        .with_category(CITY_CATEGORY)
        .with_title(city.name.to_uppercase())
        .with_detail(format!("TIER {} NODE", city.tier))
}

/// Camera position over the globe.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Telemetry {
    pub lat: f32,
    pub lon: f32,
    pub altitude_km: f32,
}

impl Telemetry {
    /// Read the camera's sub-point in the globe's own frame.
    pub fn from_camera(camera_world: Vec3, earth_world: &Mat4) -> Self {
        let local = earth_world.inverse().transform_point3(camera_world);
        let geo = cartesian_to_geodetic(local);
        Self {
            lat: geo.lat,
            lon: geo.lon,
            altitude_km: (camera_world.length() * EARTH_RADIUS_KM - EARTH_RADIUS_KM).max(0.0),
        }
    }
}

/// Frames counted over one-second windows.
#[derive(Debug, Clone, Default)]
pub struct FpsCounter {
    frames: u32,
    window_start: f32,
    fps: u32,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a frame at wall time `now` seconds. Returns the new reading
    /// when a one-second window closes.
    pub fn record_frame(&mut self, now: f32) -> Option<u32> {
        self.frames += 1;
        if now - self.window_start <= 1.0 {
            return None;
        }
        self.fps = self.frames;
        self.frames = 0;
        self.window_start = now;
        Some(self.fps)
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }
}

/// World population estimate, growing once per second.
#[derive(Debug, Clone)]
pub struct PopulationCounter {
    value: u64,
    carry: f32,
}

impl Default for PopulationCounter {
    fn default() -> Self {
        Self {
            value: INITIAL_POPULATION,
            carry: 0.0,
        }
    }
}

impl PopulationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by `delta` seconds, adding 4.4 to 5.0 people (rounded) for
    /// every whole second crossed.
    pub fn advance(&mut self, delta: f32, rng: &mut impl Rng) {
        self.carry += delta.max(0.0);
        while self.carry >= 1.0 {
            self.carry -= 1.0;
            self.value += (4.4 + rng.random::<f32>() * 0.6).round() as u64;
        }
    }

    pub fn value(&self) -> u64 {
        self.value
    }
}

/// `8189700000` as `8,189,700,000`.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Everything the window title shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HudSnapshot {
    pub telemetry: Telemetry,
    pub fps: u32,
    pub population: u64,
    pub station: Option<(f32, f32)>,
    pub crew: Option<u32>,
    /// Title of whatever the pointer is over.
    pub inspect: Option<String>,
}

impl HudSnapshot {
    pub fn window_title(&self, base: &str, show_fps: bool) -> String {
        let t = &self.telemetry;
        let mut title = format!(
            "{base} | LAT {:.4}\u{b0} LON {:.4}\u{b0} ALT {:.0}km",
            t.lat, t.lon, t.altitude_km
        );
        if show_fps {
            title.push_str(&format!(" | {} FPS", self.fps));
        }
        title.push_str(&format!(" | POP {}", group_thousands(self.population)));
        if let Some((lat, lon)) = self.station {
            title.push_str(&format!(" | ISS {lat:.2},{lon:.2}"));
        }
        if let Some(crew) = self.crew {
            title.push_str(&format!(" | CREW {crew}"));
        }
        if let Some(inspect) = &self.inspect {
            title.push_str(&format!(" | {inspect}"));
        }
        title
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbis_overlay::CITIES;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn camera_at(position: Vec3) -> Camera {
        let mut camera = Camera::new(position, 45.0, 0.1, 120.0);
        camera.set_aspect_ratio(1280.0, 720.0);
        camera
    }

    #[test]
    fn test_tier_limits_by_distance() {
        assert_eq!(city_tier_limit(20.0), 0);
        assert_eq!(city_tier_limit(10.5), 0);
        assert_eq!(city_tier_limit(5.0), 1);
        assert_eq!(city_tier_limit(3.0), 2);
        assert_eq!(city_tier_limit(2.5), 2);
        assert_eq!(city_tier_limit(1.8), 3);
        assert_eq!(city_tier_limit(1.5), 4);
        assert_eq!(city_tier_limit(1.2), 4);
    }

    #[test]
    fn test_ndc_to_screen_corners() {
        let size = Vec2::new(800.0, 600.0);
        assert_eq!(ndc_to_screen(Vec2::ZERO, size), Vec2::new(400.0, 300.0));
        assert_eq!(ndc_to_screen(Vec2::new(-1.0, 1.0), size), Vec2::ZERO);
        assert_eq!(ndc_to_screen(Vec2::new(1.0, -1.0), size), size);
    }

    #[test]
    fn test_far_camera_shows_only_tier_zero() {
        let camera = camera_at(Vec3::new(0.0, 0.0, 20.0));
        let labels =
            project_city_labels(CITIES, &camera, &Mat4::IDENTITY, Vec2::new(1280.0, 720.0));
        assert!(!labels.is_empty());
        assert!(labels.iter().all(|l| l.city.tier == 0));
    }

    #[test]
    fn test_back_side_cities_hidden() {
        // Camera over lon 0 (+X); cities near lon 180 face away.
        let camera = camera_at(Vec3::new(1.4, 0.0, 0.0));
        let labels =
            project_city_labels(CITIES, &camera, &Mat4::IDENTITY, Vec2::new(1280.0, 720.0));
        for label in &labels {
            let dir = label.world.normalize();
            assert!(dir.dot(Vec3::X) >= FACING_THRESHOLD, "{}", label.city.name);
        }
        assert!(labels.iter().all(|l| l.city.name != "Auckland"));
    }

    #[test]
    fn test_city_under_camera_lands_mid_screen() {
        let london = CITIES.iter().find(|c| c.name == "London");
        let Some(london) = london else {
            panic!("London missing from the city table");
        };
        let anchor = orbis_geo::geodetic_to_cartesian(london.lat, london.lon, 1.0);
        let camera = camera_at(anchor * 2.0);
        let size = Vec2::new(1280.0, 720.0);
        let labels = project_city_labels(CITIES, &camera, &Mat4::IDENTITY, size);
        let label = labels.iter().find(|l| l.city.name == "London");
        let Some(label) = label else {
            panic!("London should be visible from directly above");
        };
        assert!(label.screen.distance(size * 0.5) < 1.0);
        assert_eq!(city_label_at(&labels, size * 0.5 + 3.0).map(|l| l.city.name), Some("London"));
    }

    #[test]
    fn test_star_labels_hidden_close_in() {
        let sky = orbis_sky::StarField::new(1);
        let near = camera_at(Vec3::new(0.0, 0.0, 3.5));
        let size = Vec2::new(1280.0, 720.0);
        assert!(project_star_labels(sky.labels(), &near, &Mat4::IDENTITY, size).is_empty());

        let far = camera_at(Vec3::new(0.0, 0.0, 30.0));
        let shown = project_star_labels(sky.labels(), &far, &Mat4::IDENTITY, size);
        assert!(!shown.is_empty());
        assert!(shown.len() < sky.labels().len());
    }

    #[test]
    fn test_telemetry_over_prime_meridian() {
        let camera = orbis_geo::geodetic_to_cartesian(0.0, 0.0, 2.0);
        let t = Telemetry::from_camera(camera, &Mat4::IDENTITY);
        assert!(t.lat.abs() < 1e-3);
        assert!(t.lon.abs() < 1e-3);
        assert!((t.altitude_km - 6371.0).abs() < 0.5);
    }

    #[test]
    fn test_telemetry_undoes_earth_rotation() {
        let earth = Mat4::from_rotation_y(-std::f32::consts::FRAC_PI_2);
        let local = orbis_geo::geodetic_to_cartesian(30.0, 45.0, 1.5);
        let t = Telemetry::from_camera(earth.transform_point3(local), &earth);
        assert!((t.lat - 30.0).abs() < 1e-3);
        assert!((t.lon - 45.0).abs() < 1e-3);
    }

    #[test]
    fn test_altitude_never_negative() {
        let t = Telemetry::from_camera(Vec3::new(0.5, 0.0, 0.0), &Mat4::IDENTITY);
        assert_eq!(t.altitude_km, 0.0);
    }

    #[test]
    fn test_fps_sampled_per_second() {
        let mut fps = FpsCounter::new();
        let mut reading = None;
        for i in 1..=61 {
            if let Some(r) = fps.record_frame(i as f32 / 60.0) {
                reading = Some(r);
            }
        }
        assert_eq!(reading, Some(61));
        assert_eq!(fps.fps(), 61);
    }

    #[test]
    fn test_population_grows_four_or_five_per_second() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut pop = PopulationCounter::new();
        pop.advance(0.5, &mut rng);
        assert_eq!(pop.value(), INITIAL_POPULATION);
        pop.advance(0.5, &mut rng);
        let gained = pop.value() - INITIAL_POPULATION;
        assert!((4..=5).contains(&gained));

        pop.advance(10.0, &mut rng);
        let total = pop.value() - INITIAL_POPULATION;
        assert!((44..=55).contains(&total));
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(INITIAL_POPULATION), "8,189,700,000");
    }

    #[test]
    fn test_city_record_category() {
        let record = city_record(&CITIES[0]);
        assert_eq!(record.category, CITY_CATEGORY);
        assert_eq!(record.title, CITIES[0].name.to_uppercase());
    }

    #[test]
    fn test_window_title_contents() {
        let snapshot = HudSnapshot {
            telemetry: Telemetry {
                lat: 51.5,
                lon: -0.12,
                altitude_km: 3185.5,
            },
            fps: 60,
            population: INITIAL_POPULATION,
            station: Some((10.0, 20.0)),
            crew: Some(7),
            inspect: Some("LONDON".into()),
        };
        let title = snapshot.window_title("Orbis", true);
        assert!(title.starts_with("Orbis | LAT 51.5000"));
        assert!(title.contains("60 FPS"));
        assert!(title.contains("POP 8,189,700,000"));
        assert!(title.contains("CREW 7"));
        assert!(title.ends_with("LONDON"));
        assert!(!snapshot.window_title("Orbis", false).contains("FPS"));
    }
}
