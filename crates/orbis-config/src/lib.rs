//! Configuration system for Orbis.
//!
//! Runtime settings persist to disk as `config.ron`. Values can be overridden
//! from the command line, and the diagnostic toggle set that gates each
//! rendering subsystem lives here so the frame scheduler can be handed one
//! explicit struct instead of reading ambient globals.

mod cli;
mod config;
mod diagnostics;
mod error;

pub use cli::CliArgs;
pub use config::{
    AssetConfig, BloomSettings, CameraConfig, Config, DebugConfig, FeedConfig, OverlayConfig,
    RenderConfig, WindowConfig, default_config_dir,
};
pub use diagnostics::{Diagnostic, DiagnosticsConfig};
pub use error::ConfigError;
