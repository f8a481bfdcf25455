//! Configuration file loading.

use crate::config::Config;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file.
///
/// Returns default config if the file does not exist.
pub fn load_config_file(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|e| Error::ConfigRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&contents).map_err(|e| Error::ConfigParse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load configuration from an explicit path, or the platform default.
///
/// Returns default config if no config file exists.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => load_config_file(path),
        None => super::config_file_path()
            .map_or_else(|_| Ok(Config::default()), |path| load_config_file(&path)),
    }
}

/// Save configuration to a TOML file.
pub fn save_config(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::ConfigWrite {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    let contents = toml::to_string_pretty(config).map_err(|e| Error::ConfigSerialize { source: e })?;

    std::fs::write(path, contents).map_err(|e| Error::ConfigWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Resolve the config file path: explicit path or platform default.
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    explicit.map_or_else(super::config_file_path, |p| Ok(p.to_path_buf()))
}
