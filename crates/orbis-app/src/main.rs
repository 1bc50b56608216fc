//! The binary entry point for the Orbis globe viewer.

use clap::Parser;
use orbis_app::AppError;
use orbis_app::platform::PlatformDirs;
use orbis_app::window::run_with_config;
use orbis_config::{CliArgs, Config};
use tracing::{error, info};

fn main() {
    let args = CliArgs::parse();

    let dirs = match PlatformDirs::resolve() {
        Ok(dirs) => dirs.with_config_dir(args.config.clone()),
        Err(e) => {
            eprintln!("Failed to initialize platform directories: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&args, &dirs) {
        error!("FATAL SYSTEM ERROR: {e}");
        eprintln!("FATAL SYSTEM ERROR: {e}");
        std::process::exit(1);
    }
}

fn run(args: &CliArgs, dirs: &PlatformDirs) -> Result<(), AppError> {
    dirs.create_dirs()?;
    let mut config = Config::load_or_create(&dirs.config_dir)?;
    config.apply_cli_overrides(args);

    orbis_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));
    info!(
        config = %dirs.config_dir.display(),
        assets = %config.assets.texture_dir.display(),
        offline = config.feeds.offline,
        "Orbis starting"
    );

    run_with_config(config, args.fly_to.as_deref())
}
