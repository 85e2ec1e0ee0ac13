pub mod config;
pub mod restore;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use rekindle_core::{load_config, load_config_from_env, validate_config, Config};

/// Config file used when none is given and it exists.
const DEFAULT_CONFIG_FILE: &str = "rekindle.toml";

/// Load and validate configuration.
///
/// Order: explicit path, `REKINDLE_CONFIG`, `./rekindle.toml`, then
/// environment variables alone.
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var("REKINDLE_CONFIG").ok().map(PathBuf::from))
        .or_else(|| {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.exists().then_some(default)
        });

    let config = match path {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            load_config(&path).with_context(|| format!("Failed to load config from {:?}", path))?
        }
        None => load_config_from_env().context("Failed to load config from environment")?,
    };

    validate_config(&config).context("Configuration validation failed")?;
    Ok(config)
}
