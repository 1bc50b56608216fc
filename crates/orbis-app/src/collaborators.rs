//! External collaborators: texture assets, place search, encyclopedia
//! summaries and live data feeds.
//!
//! The frame loop only sees the traits; the HTTP adapters here are driven
//! from worker threads by [`crate::dispatch::Dispatcher`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use image::RgbaImage;
use orbis_config::FeedConfig;
use orbis_overlay::{
    CITIES, FeedError, LIVE_EVENTS, LIVE_QUAKES, OverlayRecord, Place, Summary, normalize_eonet,
    normalize_usgs,
};
use orbis_render::TextureEncoding;
use serde::Deserialize;
use tracing::debug;

/// Queries shorter than this never reach a geocoder.
pub const MIN_QUERY_LEN: usize = 3;
/// Upper bound on places returned by a search.
pub const MAX_PLACES: usize = 5;
/// Extract shown when a summary exists but has no text.
pub const EMPTY_EXTRACT: &str = "No data available for this location.";

#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Failed to read response body: {0}")]
    Body(#[from] std::io::Error),

    #[error("Malformed response: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error("Network collaborators are disabled (offline mode)")]
    Offline,
}

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("No file found for texture '{id}' (tried {tried:?})")]
    Missing { id: &'static str, tried: Vec<PathBuf> },

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Textures the renderer asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureId {
    EarthDay,
    EarthNight,
    EarthClouds,
    EarthHeight,
    MilkyWay,
    Sun,
    Moon,
}

impl TextureId {
    pub const ALL: [TextureId; 7] = [
        Self::EarthDay,
        Self::EarthNight,
        Self::EarthClouds,
        Self::EarthHeight,
        Self::MilkyWay,
        Self::Sun,
        Self::Moon,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::EarthDay => "earth_day",
            Self::EarthNight => "earth_night",
            Self::EarthClouds => "earth_clouds",
            Self::EarthHeight => "earth_height",
            Self::MilkyWay => "milky_way",
            Self::Sun => "sun",
            Self::Moon => "moon",
        }
    }

    /// File names to try, highest resolution first.
    pub fn candidates(self) -> &'static [&'static str] {
        match self {
            Self::EarthDay => &["earth_day_8k.jpg", "earth_day_4k.jpg"],
            Self::EarthNight => &["earth_night_8k.jpg", "earth_night_4k.jpg"],
            Self::EarthClouds => &["earth_clouds_8k.jpg", "earth_clouds.jpg"],
            Self::EarthHeight => &["earth_heightmap.png"],
            Self::MilkyWay => &["milkyway_8k.jpg", "milkyway.png"],
            Self::Sun => &["sun_8k.jpg"],
            Self::Moon => &["moon_8k.jpg"],
        }
    }

    /// Flat colour used when no file loads. Height falls back to the
    /// displacement bias so the surface stays at radius 1.
    pub fn fallback_color(self) -> u32 {
        match self {
            Self::EarthDay => 0x1a_3d_6b,
            Self::EarthNight | Self::EarthClouds | Self::MilkyWay => 0x000000,
            Self::EarthHeight => 0x4d_4d_4d,
            Self::Sun => orbis_sky::SUN_FALLBACK_COLOR,
            Self::Moon => orbis_sky::MOON_FALLBACK_COLOR,
        }
    }

    /// Height data is sampled raw; everything else is colour.
    pub fn encoding(self) -> TextureEncoding {
        match self {
            Self::EarthHeight => TextureEncoding::Linear,
            _ => TextureEncoding::Srgb,
        }
    }
}

pub trait AssetProvider {
    fn load_texture(&self, id: TextureId) -> Result<RgbaImage, AssetError>;
}

/// Reads textures from a directory, walking each id's fallback chain.
#[derive(Debug, Clone)]
pub struct DirectoryAssets {
    root: PathBuf,
}

impl DirectoryAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetProvider for DirectoryAssets {
    fn load_texture(&self, id: TextureId) -> Result<RgbaImage, AssetError> {
        let mut tried = Vec::new();
        let mut last_decode_error = None;
        for name in id.candidates() {
            let path = self.root.join(name);
            if !path.is_file() {
                tried.push(path);
                continue;
            }
            match image::open(&path) {
                Ok(img) => {
                    debug!(texture = id.name(), path = %path.display(), "Loaded texture");
                    return Ok(img.to_rgba8());
                }
                Err(source) => {
                    debug!(texture = id.name(), path = %path.display(), "Texture decode failed: {source}");
                    last_decode_error = Some(AssetError::Decode { path, source });
                }
            }
        }
        Err(last_decode_error.unwrap_or(AssetError::Missing {
            id: id.name(),
            tried,
        }))
    }
}

pub trait Geocoder: Send + Sync {
    fn search(&self, query: &str) -> Result<Vec<Place>, CollaboratorError>;
}

/// Searches the built-in city table. Used in offline mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogGeocoder;

impl Geocoder for CatalogGeocoder {
    fn search(&self, query: &str) -> Result<Vec<Place>, CollaboratorError> {
        let needle = query.trim().to_lowercase();
        if needle.chars().count() < MIN_QUERY_LEN {
            return Ok(Vec::new());
        }
        Ok(CITIES
            .iter()
            .filter(|city| city.name.to_lowercase().contains(&needle))
            .take(MAX_PLACES)
            .map(|city| Place {
                name: city.name.to_string(),
                lat: city.lat,
                lon: city.lon,
            })
            .collect())
    }
}

fn http_agent(config: &FeedConfig) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(&config.user_agent)
        .build()
}

fn read_body(request: ureq::Request) -> Result<String, CollaboratorError> {
    let response = request
        .call()
        .map_err(|e| CollaboratorError::Http(e.to_string()))?;
    Ok(response.into_string()?)
}

/// OpenStreetMap Nominatim search.
pub struct NominatimGeocoder {
    agent: ureq::Agent,
    url: String,
}

impl NominatimGeocoder {
    pub fn new(config: &FeedConfig) -> Self {
        Self {
            agent: http_agent(config),
            url: config.geocoder_url.clone(),
        }
    }
}

impl Geocoder for NominatimGeocoder {
    fn search(&self, query: &str) -> Result<Vec<Place>, CollaboratorError> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return Ok(Vec::new());
        }
        let limit = MAX_PLACES.to_string();
        let body = read_body(
            self.agent
                .get(&self.url)
                .query("format", "json")
                .query("q", query)
                .query("limit", &limit),
        )?;
        parse_places(&body)
    }
}

#[derive(Deserialize)]
struct NominatimPlace {
    display_name: String,
    lat: String,
    lon: String,
}

/// Nominatim returns coordinates as strings; entries that do not parse are
/// skipped.
pub(crate) fn parse_places(body: &str) -> Result<Vec<Place>, CollaboratorError> {
    let raw: Vec<NominatimPlace> = serde_json::from_str(body)?;
    Ok(raw
        .into_iter()
        .filter_map(|p| {
            Some(Place {
                lat: p.lat.trim().parse().ok()?,
                lon: p.lon.trim().parse().ok()?,
                name: p.display_name,
            })
        })
        .take(MAX_PLACES)
        .collect())
}

pub trait KnowledgeSource: Send + Sync {
    fn summary(&self, name: &str) -> Result<Summary, CollaboratorError>;
}

/// Wikipedia REST page summaries.
pub struct WikipediaSummaries {
    agent: ureq::Agent,
    base_url: String,
}

impl WikipediaSummaries {
    pub fn new(config: &FeedConfig) -> Self {
        Self {
            agent: http_agent(config),
            base_url: config.knowledge_url.clone(),
        }
    }
}

impl KnowledgeSource for WikipediaSummaries {
    fn summary(&self, name: &str) -> Result<Summary, CollaboratorError> {
        let url = format!("{}{}", self.base_url, encode_title(name));
        let body = read_body(self.agent.get(&url))?;
        parse_summary(name, &body)
    }
}

/// Percent-encode a page title for use as a URL path segment.
pub(crate) fn encode_title(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for byte in title.trim().bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            b' ' => out.push('_'),
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

#[derive(Deserialize)]
struct WikiSummary {
    title: Option<String>,
    extract: Option<String>,
    content_urls: Option<WikiContentUrls>,
}

#[derive(Deserialize)]
struct WikiContentUrls {
    desktop: Option<WikiPage>,
}

#[derive(Deserialize)]
struct WikiPage {
    page: String,
}

pub(crate) fn parse_summary(name: &str, body: &str) -> Result<Summary, CollaboratorError> {
    let raw: WikiSummary = serde_json::from_str(body)?;
    Ok(Summary {
        title: raw.title.unwrap_or_else(|| name.to_string()),
        extract: raw
            .extract
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| EMPTY_EXTRACT.to_string()),
        page_url: raw.content_urls.and_then(|u| u.desktop).map(|d| d.page),
    })
}

/// A source of records for one live overlay layer.
pub trait FeedSource: Send + Sync {
    /// The overlay layer the records belong to.
    fn layer(&self) -> &'static str;

    fn fetch(&self) -> Result<Vec<OverlayRecord>, CollaboratorError>;
}

/// USGS earthquakes of magnitude 2.5+ over the last day.
pub struct UsgsQuakes {
    agent: ureq::Agent,
    url: String,
}

impl UsgsQuakes {
    pub fn new(config: &FeedConfig) -> Self {
        Self {
            agent: http_agent(config),
            url: config.quakes_url.clone(),
        }
    }
}

impl FeedSource for UsgsQuakes {
    fn layer(&self) -> &'static str {
        LIVE_QUAKES
    }

    fn fetch(&self) -> Result<Vec<OverlayRecord>, CollaboratorError> {
        let body = read_body(self.agent.get(&self.url))?;
        Ok(normalize_usgs(&body)?)
    }
}

/// Open NASA EONET natural events.
pub struct EonetEvents {
    agent: ureq::Agent,
    url: String,
}

impl EonetEvents {
    pub fn new(config: &FeedConfig) -> Self {
        Self {
            agent: http_agent(config),
            url: config.events_url.clone(),
        }
    }
}

impl FeedSource for EonetEvents {
    fn layer(&self) -> &'static str {
        LIVE_EVENTS
    }

    fn fetch(&self) -> Result<Vec<OverlayRecord>, CollaboratorError> {
        let body = read_body(self.agent.get(&self.url))?;
        Ok(normalize_eonet(&body)?)
    }
}

/// Position and crew of the crewed orbital station.
pub trait StationSource: Send + Sync {
    /// Sub-station point as (lat, lon) in degrees.
    fn position(&self) -> Result<(f32, f32), CollaboratorError>;

    fn crew_count(&self) -> Result<u32, CollaboratorError>;
}

pub struct StationTelemetry {
    agent: ureq::Agent,
    position_url: String,
    crew_url: String,
}

impl StationTelemetry {
    pub fn new(config: &FeedConfig) -> Self {
        Self {
            agent: http_agent(config),
            position_url: config.station_url.clone(),
            crew_url: config.crew_url.clone(),
        }
    }
}

impl StationSource for StationTelemetry {
    fn position(&self) -> Result<(f32, f32), CollaboratorError> {
        parse_station_position(&read_body(self.agent.get(&self.position_url))?)
    }

    fn crew_count(&self) -> Result<u32, CollaboratorError> {
        parse_crew_count(&read_body(self.agent.get(&self.crew_url))?)
    }
}

#[derive(Deserialize)]
struct StationFix {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct Astronauts {
    number: u32,
}

pub(crate) fn parse_station_position(body: &str) -> Result<(f32, f32), CollaboratorError> {
    let fix: StationFix = serde_json::from_str(body)?;
    Ok((fix.latitude as f32, fix.longitude as f32))
}

pub(crate) fn parse_crew_count(body: &str) -> Result<u32, CollaboratorError> {
    Ok(serde_json::from_str::<Astronauts>(body)?.number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_short_query_returns_nothing() {
        assert!(CatalogGeocoder.search("Lo").unwrap().is_empty());
        assert!(CatalogGeocoder.search("  a ").unwrap().is_empty());
    }

    #[test]
    fn test_catalog_matches_case_insensitively() {
        let places = CatalogGeocoder.search("lonDON").unwrap();
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].name, "London");
        assert!((places[0].lat - 51.50).abs() < 1e-4);
    }

    #[test]
    fn test_catalog_caps_results() {
        let places = CatalogGeocoder.search("ana").unwrap();
        assert!(places.len() <= MAX_PLACES);
        assert!(places.iter().all(|p| p.name.to_lowercase().contains("ana")));
    }

    #[test]
    fn test_parse_places_reads_string_coordinates() {
        let body = r#"[
            {"display_name": "Paris, Île-de-France, France", "lat": "48.8566", "lon": "2.3522"},
            {"display_name": "Broken", "lat": "north", "lon": "2"},
            {"display_name": "Paris, Texas", "lat": "33.66", "lon": "-95.55"}
        ]"#;
        let places = parse_places(body).unwrap();
        assert_eq!(places.len(), 2);
        assert_eq!(places[0].name, "Paris, Île-de-France, France");
        assert!((places[0].lat - 48.8566).abs() < 1e-4);
        assert!((places[1].lon + 95.55).abs() < 1e-4);
    }

    #[test]
    fn test_parse_places_caps_at_five() {
        let entry = r#"{"display_name": "x", "lat": "1", "lon": "2"}"#;
        let body = format!("[{}]", vec![entry; 8].join(","));
        assert_eq!(parse_places(&body).unwrap().len(), MAX_PLACES);
    }

    #[test]
    fn test_parse_places_rejects_garbage() {
        assert!(matches!(
            parse_places("<html>"),
            Err(CollaboratorError::Json(_))
        ));
    }

    #[test]
    fn test_parse_summary() {
        let body = r#"{
            "title": "Tokyo",
            "extract": "Tokyo is the capital of Japan.",
            "content_urls": {"desktop": {"page": "https://en.wikipedia.org/wiki/Tokyo"}}
        }"#;
        let summary = parse_summary("tokyo", body).unwrap();
        assert_eq!(summary.title, "Tokyo");
        assert_eq!(summary.extract, "Tokyo is the capital of Japan.");
        assert_eq!(
            summary.page_url.as_deref(),
            Some("https://en.wikipedia.org/wiki/Tokyo")
        );
    }

    #[test]
    fn test_parse_summary_fills_missing_fields() {
        let summary = parse_summary("Atlantis", "{}").unwrap();
        assert_eq!(summary.title, "Atlantis");
        assert_eq!(summary.extract, EMPTY_EXTRACT);
        assert_eq!(summary.page_url, None);
    }

    #[test]
    fn test_encode_title() {
        assert_eq!(encode_title("New York"), "New_York");
        assert_eq!(encode_title("São Paulo"), "S%C3%A3o_Paulo");
        assert_eq!(encode_title("AT&T"), "AT%26T");
    }

    #[test]
    fn test_parse_station_and_crew() {
        let fix = r#"{"name": "iss", "id": 25544, "latitude": -12.5, "longitude": 101.25}"#;
        assert_eq!(parse_station_position(fix).unwrap(), (-12.5, 101.25));
        let crew = r#"{"message": "success", "number": 7, "people": []}"#;
        assert_eq!(parse_crew_count(crew).unwrap(), 7);
    }

    #[test]
    fn test_texture_candidates_prefer_8k() {
        assert_eq!(
            TextureId::EarthDay.candidates(),
            &["earth_day_8k.jpg", "earth_day_4k.jpg"]
        );
        for id in TextureId::ALL {
            assert!(!id.candidates().is_empty());
        }
        assert!(matches!(
            TextureId::EarthHeight.encoding(),
            TextureEncoding::Linear
        ));
    }

    #[test]
    fn test_directory_assets_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let assets = DirectoryAssets::new(dir.path());
        match assets.load_texture(TextureId::EarthDay) {
            Err(AssetError::Missing { id, tried }) => {
                assert_eq!(id, "earth_day");
                assert_eq!(tried.len(), 2);
            }
            other => panic!("expected missing, got {other:?}"),
        }
    }

    #[test]
    fn test_directory_assets_falls_back_to_second_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let img = RgbaImage::from_pixel(2, 1, image::Rgba([10, 20, 30, 255]));
        img.save(dir.path().join("milkyway.png")).unwrap();

        let loaded = DirectoryAssets::new(dir.path())
            .load_texture(TextureId::MilkyWay)
            .unwrap();
        assert_eq!(loaded.dimensions(), (2, 1));
        assert_eq!(loaded.get_pixel(0, 0).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_directory_assets_reports_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("moon_8k.jpg"), b"not a jpeg").unwrap();
        let err = DirectoryAssets::new(dir.path())
            .load_texture(TextureId::Moon)
            .unwrap_err();
        assert!(matches!(err, AssetError::Decode { .. }));
    }
}
