//! Configuration loading from the file system

use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use super::types::Config;
use crate::error::{PasteboardError, Result};

/// Default location: `<config dir>/pasteboard/config.json`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(shellexpand::tilde("~/.config").as_ref()))
        .join("pasteboard")
        .join("config.json")
}

/// Load configuration from `path` (tilde-expanded), or the default location.
///
/// Returns Config::default() if the file is missing or cannot be parsed.
#[instrument(name = "load_config")]
pub fn load_config(path: Option<&str>) -> Config {
    let config_path = match path {
        Some(p) => PathBuf::from(shellexpand::tilde(p).as_ref()),
        None => default_config_path(),
    };

    if !config_path.exists() {
        info!(path = %config_path.display(), "Config file not found, using defaults");
        return Config::default();
    }

    match read_config(&config_path) {
        Ok(config) => {
            info!(path = %config_path.display(), "Successfully loaded config");
            config
        }
        Err(e) => {
            warn!(
                path = %config_path.display(),
                error = %e,
                "Failed to load config, using defaults"
            );
            Config::default()
        }
    }
}

/// Read and parse a config file, reporting what went wrong.
pub fn read_config(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str::<Config>(&contents)
        .map_err(|e| PasteboardError::Config(format!("{}: {}", path.display(), e)))
}
