//! Platform-specific configuration and data paths.

use crate::constants::APP_NAME;
use crate::error::{Error, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Get the configuration directory for the current platform.
///
/// - Linux: `~/.config/biowatch/`
/// - macOS: `~/Library/Application Support/biowatch/`
/// - Windows: `%APPDATA%\biowatch\`
pub fn config_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or(Error::ConfigDirNotFound)
}

/// Get the full path to the config file.
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Get the platform data directory (detection history lives here).
///
/// - Linux: `~/.local/share/biowatch/`
/// - macOS: `~/Library/Application Support/biowatch/`
/// - Windows: `%APPDATA%\biowatch\data\`
pub fn default_data_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or(Error::DataDirNotFound)
}

/// Resolve the data directory: CLI override, then config, then platform default.
pub fn resolve_data_dir(cli_override: Option<&Path>, configured: Option<&Path>) -> Result<PathBuf> {
    match cli_override.or(configured) {
        Some(dir) => Ok(dir.to_path_buf()),
        None => default_data_dir(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir_returns_path() {
        let path = config_dir().unwrap();
        assert!(path.to_string_lossy().contains("biowatch"));
    }

    #[test]
    fn test_config_file_path_ends_with_toml() {
        let path = config_file_path().unwrap();
        assert!(path.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn test_resolve_data_dir_prefers_cli() {
        let dir = resolve_data_dir(Some(Path::new("/cli")), Some(Path::new("/cfg"))).unwrap();
        assert_eq!(dir, PathBuf::from("/cli"));

        let dir = resolve_data_dir(None, Some(Path::new("/cfg"))).unwrap();
        assert_eq!(dir, PathBuf::from("/cfg"));
    }
}
