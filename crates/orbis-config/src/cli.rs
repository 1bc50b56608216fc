//! Command-line argument parsing for Orbis.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Orbis command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "orbis", about = "Interactive shaded globe")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Start in fullscreen.
    #[arg(long)]
    pub fullscreen: Option<bool>,

    /// Start with bloom enabled.
    #[arg(long)]
    pub bloom: Option<bool>,

    /// Directory containing textures.
    #[arg(long)]
    pub assets: Option<PathBuf>,

    /// Place to fly to once the globe is up (resolved by the geocoder).
    #[arg(long)]
    pub fly_to: Option<String>,

    /// Disable all network collaborators.
    #[arg(long)]
    pub offline: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(fs) = args.fullscreen {
            self.window.fullscreen = fs;
        }
        if let Some(bloom) = args.bloom {
            self.diagnostics.bloom = bloom;
        }
        if let Some(ref dir) = args.assets {
            self.assets.texture_dir = dir.clone();
        }
        if args.offline {
            self.feeds.offline = true;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
