//! Configuration loading and management.

mod file;
mod paths;
mod types;
mod validate;

pub use file::{load_config, load_config_file, resolve_config_path, save_config};
pub use paths::{config_dir, config_file_path, default_data_dir, resolve_data_dir};
pub use types::{
    Config, DefaultsConfig, DetectorBackend, DetectorConfig, Normalization, OutputConfig,
    OutputFormat, StorageConfig,
};
pub use validate::{validate_config, validate_detector_files};
