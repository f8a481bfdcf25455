//! Species detection backends.

mod onnx;
mod simulated;
mod types;

pub use onnx::{OnnxDetector, read_labels, softmax, to_nchw, top_k};
pub use simulated::SimulatedDetector;
pub use types::{BoundingBox, ConfidenceTier, Detection};

use crate::catalog::{Location, find_species};
use crate::config::{DetectorBackend, DetectorConfig, validate_detector_files};
use crate::constants::TIMESTAMP_FORMAT;
use crate::error::Result;
use image::RgbImage;
use std::collections::HashSet;
use tracing::{debug, info};

/// A model that finds species in an image.
pub trait SpeciesDetector: Send + Sync {
    /// Short backend name for logs and results.
    fn name(&self) -> &str;

    /// Raw detections for one image, before thresholding.
    fn detect(&self, image: &RgbImage) -> Result<Vec<Detection>>;
}

/// Build the detector selected by the configuration.
pub fn build_detector(config: &DetectorConfig) -> Result<Box<dyn SpeciesDetector>> {
    match config.backend {
        DetectorBackend::Simulated => {
            info!(
                "Using simulated detector{}",
                config
                    .seed
                    .map_or_else(String::new, |s| format!(" (seed {s})"))
            );
            Ok(Box::new(SimulatedDetector::new(config.seed)))
        }
        DetectorBackend::Onnx => {
            validate_detector_files(config)?;
            Ok(Box::new(OnnxDetector::from_config(config)?))
        }
    }
}

/// Set of species names allowed through detection.
///
/// Entries may be common names, scientific names or `Scientific_Common`
/// labels; catalogued species match by any of their names.
#[derive(Debug, Clone, Default)]
pub struct SpeciesFilter {
    names: HashSet<String>,
}

impl SpeciesFilter {
    /// Build a filter from species list entries.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = entries
            .into_iter()
            .map(|entry| normalized_name(entry.as_ref()))
            .collect();
        Self { names }
    }

    /// Whether a detected species passes the filter.
    pub fn allows(&self, species: &str) -> bool {
        self.names.contains(&normalized_name(species))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the filter has no entries.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn normalized_name(entry: &str) -> String {
    find_species(entry).map_or_else(
        || {
            entry
                .split_once('_')
                .map_or(entry, |(_, common)| common)
                .trim()
                .to_lowercase()
        },
        |s| s.common_name.to_string(),
    )
}

/// Post-processing applied to raw detector output.
#[derive(Debug, Clone, Default)]
pub struct DetectOptions {
    /// Minimum confidence kept.
    pub min_confidence: f32,
    /// Optional species allow-list.
    pub species_filter: Option<SpeciesFilter>,
    /// Where the image was taken.
    pub location: Option<Location>,
}

/// Run a detector and turn its output into final results.
///
/// Results below the threshold or outside the allow-list are dropped; the
/// survivors get the location and a timestamp. When nothing survives the
/// list holds the single "No wildlife detected" marker.
pub fn detect_species(
    detector: &dyn SpeciesDetector,
    image: &RgbImage,
    options: &DetectOptions,
) -> Result<Vec<Detection>> {
    let raw = detector.detect(image)?;
    let raw_count = raw.len();

    let mut detections: Vec<Detection> = raw
        .into_iter()
        .filter(|d| d.confidence >= options.min_confidence)
        .filter(|d| {
            options
                .species_filter
                .as_ref()
                .is_none_or(|filter| filter.allows(&d.species))
        })
        .collect();

    debug!(
        "{}: {} raw detections, {} kept",
        detector.name(),
        raw_count,
        detections.len()
    );

    if detections.is_empty() {
        detections.push(Detection::no_detection());
    }

    let detected_at = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
    for detection in &mut detections {
        detection.detected_at.clone_from(&detected_at);
        detection.location.clone_from(&options.location);
    }

    Ok(detections)
}
