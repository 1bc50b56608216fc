//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::diagnostics::DiagnosticsConfig;
use crate::error::ConfigError;

const APP_NAME: &str = "orbis";
const CONFIG_FILE: &str = "config.ron";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Rendering settings.
    pub render: RenderConfig,
    /// Camera and orbit-control settings.
    pub camera: CameraConfig,
    /// Subsystem toggles, switchable at runtime.
    pub diagnostics: DiagnosticsConfig,
    /// Overlay layers shown at startup.
    pub overlays: OverlayConfig,
    /// Remote collaborator endpoints.
    pub feeds: FeedConfig,
    /// Texture lookup.
    pub assets: AssetConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Start in fullscreen mode.
    pub fullscreen: bool,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    /// Window title prefix; telemetry is appended at runtime.
    pub title: String,
}

/// Bloom post-process parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BloomSettings {
    /// Luminance above which pixels bloom.
    pub threshold: f32,
    /// Strength when the camera hugs the surface.
    pub strength_near: f32,
    /// Strength at orbital distance.
    pub strength_far: f32,
    /// Blur radius applied during upsampling.
    pub radius: f32,
    /// Number of mip levels in the blur chain.
    pub iterations: u32,
}

/// Rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Bloom chain parameters.
    pub bloom: BloomSettings,
    /// Longitudinal segments of the globe mesh.
    pub globe_width_segments: u32,
    /// Latitudinal segments of the globe mesh.
    pub globe_height_segments: u32,
    /// Heightmap displacement scale.
    pub displace_scale: f32,
    /// Heightmap value treated as sea level.
    pub displace_bias: f32,
    /// Seed for the background star field and orbital phases.
    pub sky_seed: u64,
}

/// Camera and orbit-control configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Near clip plane.
    pub near: f32,
    /// Far clip plane.
    pub far: f32,
    /// Distance from the origin at startup.
    pub start_distance: f32,
    /// Closest the orbit controls may approach.
    pub min_distance: f32,
    /// Farthest the orbit controls may retreat.
    pub max_distance: f32,
    /// Fraction of angular velocity applied per frame.
    pub damping: f32,
    /// Radians of orbit per pixel of drag.
    pub rotate_speed: f32,
    /// Zoom factor per scroll line.
    pub zoom_speed: f32,
}

/// Overlay layer configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OverlayConfig {
    /// Layers active at startup.
    pub active_layers: Vec<String>,
}

/// Remote collaborator configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FeedConfig {
    /// Never touch the network; use built-in catalogs only.
    pub offline: bool,
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
    /// Station telemetry refresh period in seconds.
    pub station_refresh_seconds: u64,
    /// Delay before the one-shot crew count request.
    pub crew_delay_seconds: u64,
    /// USGS earthquake GeoJSON summary.
    pub quakes_url: String,
    /// NASA EONET open events.
    pub events_url: String,
    /// Station position endpoint.
    pub station_url: String,
    /// People-in-space endpoint.
    pub crew_url: String,
    /// Free-text geocoding endpoint.
    pub geocoder_url: String,
    /// Page summary endpoint; the place name is appended.
    pub knowledge_url: String,
    /// User-Agent sent with every request.
    pub user_agent: String,
}

/// Asset configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory holding the planet, sky and body textures.
    pub texture_dir: PathBuf,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Append the frame rate to the window title.
    pub show_fps: bool,
    /// Log filter directive (e.g., "debug", "info,wgpu=warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fullscreen: false,
            vsync: true,
            title: "ORBIS".to_string(),
        }
    }
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            threshold: 0.95,
            strength_near: 0.06,
            strength_far: 0.25,
            radius: 0.3,
            iterations: 5,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            bloom: BloomSettings::default(),
            globe_width_segments: 512,
            globe_height_segments: 256,
            displace_scale: 0.07,
            displace_bias: 0.3,
            sky_seed: 42,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 45.0,
            near: 0.1,
            far: 120.0,
            start_distance: 3.5,
            min_distance: 1.15,
            max_distance: 80.0,
            damping: 0.05,
            rotate_speed: 0.005,
            zoom_speed: 0.95,
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            active_layers: ["nuclear", "conflicts", "cables", "flights", "seismic"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            offline: false,
            timeout_seconds: 10,
            station_refresh_seconds: 10,
            crew_delay_seconds: 5,
            quakes_url: "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/2.5_day.geojson"
                .to_string(),
            events_url: "https://eonet.gsfc.nasa.gov/api/v3/events?status=open&days=10"
                .to_string(),
            station_url: "https://api.wheretheiss.at/v1/satellites/25544".to_string(),
            crew_url: "http://api.open-notify.org/astros.json".to_string(),
            geocoder_url: "https://nominatim.openstreetmap.org/search".to_string(),
            knowledge_url: "https://en.wikipedia.org/api/rest_v1/page/summary/".to_string(),
            user_agent: "orbis/0.1".to_string(),
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            texture_dir: PathBuf::from("assets").join("textures"),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            show_fps: true,
            log_level: "info,wgpu=warn,naga=warn".to_string(),
        }
    }
}

/// Platform configuration directory for Orbis (`<os config dir>/orbis`).
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|base| base.join(APP_NAME))
        .ok_or(ConfigError::NoConfigDir)
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join(CONFIG_FILE);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(!ron_str.is_empty());
        assert!(ron_str.contains("width: 1280"));
        assert!(ron_str.contains("start_distance: 3.5"));
    }

    #[test]
    fn test_camera_defaults_match_scene_scale() {
        let camera = CameraConfig::default();
        assert_eq!(camera.fov_y_degrees, 45.0);
        assert_eq!(camera.far, 120.0);
        assert!(camera.min_distance > 1.0, "camera must stay above the globe");
        assert!(camera.start_distance < camera.max_distance);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_field_uses_default() {
        let ron_str = "(window: (), render: (), camera: (), debug: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.feeds, FeedConfig::default());
        assert_eq!(config.diagnostics, DiagnosticsConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let ron_str = "(future_setting: true)";
        let result: Result<Config, _> = ron::from_str(ron_str);
        assert!(result.is_ok());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let ron_str = "(camera: (damping: 0.1))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.camera.damping, 0.1);
        assert_eq!(config.camera.min_distance, 1.15);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.window.width = 1920;
        config.window.height = 1080;
        config.feeds.offline = true;
        config.overlays.active_layers = vec!["cables".to_string()];

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join(CONFIG_FILE).exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.diagnostics.bloom = true;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert!(result.is_some());
        assert!(result.unwrap().diagnostics.bloom);
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let result: Result<Config, _> = ron::from_str("{{not valid}}");
        assert!(result.is_err());
    }

    #[test]
    fn test_ron_comments_preserved() {
        let ron_str = "// This is a comment\n(\n  // Another comment\n)";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config, Config::default());
    }
}
