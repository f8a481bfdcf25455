//! Configuration type definitions.

use crate::catalog::Coordinates;
use crate::constants::{
    DEFAULT_INPUT_SIZE, DEFAULT_MAX_DIMENSION, DEFAULT_MIN_CONFIDENCE, DEFAULT_TOP_K,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Detector backend settings.
    #[serde(default)]
    pub detector: DetectorConfig,

    /// Default analysis settings.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// User-defined monitoring locations by name.
    #[serde(default)]
    pub locations: BTreeMap<String, Coordinates>,
}

/// Which detector implementation to run.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DetectorBackend {
    /// Randomized demonstration detector over the species catalogue.
    #[default]
    Simulated,
    /// ONNX image classifier run through ONNX Runtime.
    Onnx,
}

impl std::fmt::Display for DetectorBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Simulated => write!(f, "simulated"),
            Self::Onnx => write!(f, "onnx"),
        }
    }
}

/// Pixel normalization applied before ONNX inference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Normalization {
    /// Scale channels to [0, 1].
    #[default]
    Unit,
    /// Scale to [0, 1] then apply `ImageNet` mean/std.
    Imagenet,
}

/// Detector settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Backend to use.
    pub backend: DetectorBackend,

    /// RNG seed for the simulated backend (random when unset).
    pub seed: Option<u64>,

    /// Path to the ONNX model file.
    pub model: Option<PathBuf>,

    /// Path to the labels file.
    pub labels: Option<PathBuf>,

    /// Square input size expected by the model.
    pub input_size: u32,

    /// Number of top predictions to keep.
    pub top_k: usize,

    /// Pixel normalization.
    pub normalization: Normalization,

    /// Apply softmax to raw model outputs.
    pub softmax: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            backend: DetectorBackend::default(),
            seed: None,
            model: None,
            labels: None,
            input_size: DEFAULT_INPUT_SIZE,
            top_k: DEFAULT_TOP_K,
            normalization: Normalization::default(),
            softmax: true,
        }
    }
}

/// Default analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Minimum confidence threshold.
    pub min_confidence: f32,

    /// Largest image side kept after preprocessing.
    pub max_dimension: u32,

    /// Default monitoring location name.
    pub location: Option<String>,

    /// Per-image result formats.
    pub formats: Vec<OutputFormat>,

    /// Write annotated images.
    pub annotate: bool,

    /// Write thumbnails.
    pub thumbnails: bool,

    /// Enhance contrast before detection.
    pub enhance: bool,

    /// Species allow-list file.
    pub species_list_file: Option<PathBuf>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            max_dimension: DEFAULT_MAX_DIMENSION,
            location: None,
            formats: vec![OutputFormat::Csv],
            annotate: true,
            thumbnails: false,
            enhance: false,
            species_list_file: None,
        }
    }
}

/// Storage settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the detection history (platform data dir when unset).
    pub data_dir: Option<PathBuf>,
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Prefix CSV files with a UTF-8 BOM for spreadsheet compatibility.
    pub csv_bom: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { csv_bom: true }
    }
}

/// Supported machine-readable output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Comma-separated values.
    Csv,
    /// JSON records.
    Json,
}

impl OutputFormat {
    /// File extension without the dot.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("csv".parse::<OutputFormat>().ok(), Some(OutputFormat::Csv));
        assert_eq!("JSON".parse::<OutputFormat>().ok(), Some(OutputFormat::Json));
        assert!("parquet".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Csv.to_string(), "csv");
        assert_eq!(OutputFormat::Json.to_string(), "json");
    }

    #[test]
    fn test_defaults_config_default_values() {
        let defaults = DefaultsConfig::default();
        assert_eq!(defaults.min_confidence, 0.5);
        assert_eq!(defaults.max_dimension, 1200);
        assert!(defaults.annotate);
        assert_eq!(defaults.formats, vec![OutputFormat::Csv]);
    }

    #[test]
    fn test_detector_config_defaults_to_simulated() {
        let detector = DetectorConfig::default();
        assert_eq!(detector.backend, DetectorBackend::Simulated);
        assert_eq!(detector.input_size, 224);
        assert!(detector.softmax);
    }
}
