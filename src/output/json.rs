//! JSON output format writer.

use crate::error::{Error, Result};
use crate::imaging::ImageMetadata;
use crate::inference::{BoundingBox, Detection};
use crate::output::OutputWriter;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Write any serializable value as pretty JSON.
pub fn write_json_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|e| Error::JsonWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    writer.flush()?;
    Ok(())
}

/// JSON result file structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonResultFile {
    /// Source image file name.
    pub source_file: String,
    /// Analysis timestamp.
    pub analysis_date: DateTime<Utc>,
    /// Detector backend used.
    pub detector: String,
    /// Analysis settings.
    pub settings: JsonSettings,
    /// Image properties.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<serde_json::Value>,
    /// Detection results.
    pub detections: Vec<JsonDetection>,
    /// Summary statistics.
    pub summary: JsonSummary,
}

/// Analysis settings for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSettings {
    /// Minimum confidence threshold.
    pub min_confidence: f32,
    /// Largest processed image side.
    pub max_dimension: u32,
    /// Whether contrast enhancement was applied.
    pub enhanced: bool,
    /// Monitoring location name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Latitude.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    /// Longitude.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
}

/// Single detection in JSON format.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonDetection {
    /// Common name.
    pub species: String,
    /// Scientific name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scientific_name: Option<String>,
    /// Confidence score.
    pub confidence: f32,
    /// Individuals counted.
    pub count: u32,
    /// Box in processed-image pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    /// Conservation status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conservation_status: Option<String>,
    /// Detection time.
    pub detected_at: String,
}

/// Summary statistics.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonSummary {
    /// Number of species detections (excluding the empty marker).
    pub total_detections: usize,
    /// Number of unique species.
    pub unique_species: usize,
    /// Sum of individual counts.
    pub total_individuals: u32,
}

/// Writer for per-image JSON result files.
pub struct JsonResultWriter {
    detections: Vec<Detection>,
    output_path: PathBuf,
    source_file: String,
    detector: String,
    settings: JsonSettings,
    image: Option<serde_json::Value>,
}

impl JsonResultWriter {
    /// Create a new JSON result writer.
    pub fn new(
        output_path: &Path,
        source_file: &str,
        detector: &str,
        settings: JsonSettings,
        metadata: Option<&ImageMetadata>,
    ) -> Result<Self> {
        let image = metadata
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| Error::JsonWrite {
                path: output_path.to_path_buf(),
                source: e,
            })?;

        Ok(Self {
            detections: Vec::new(),
            output_path: output_path.to_path_buf(),
            source_file: source_file.to_string(),
            detector: detector.to_string(),
            settings,
            image,
        })
    }

    /// Compute summary from detections.
    fn compute_summary(&self) -> JsonSummary {
        let species: Vec<&Detection> = self
            .detections
            .iter()
            .filter(|d| !d.is_no_detection())
            .collect();
        let unique_species: HashSet<&str> = species.iter().map(|d| d.species.as_str()).collect();

        JsonSummary {
            total_detections: species.len(),
            unique_species: unique_species.len(),
            total_individuals: species.iter().map(|d| d.count).sum(),
        }
    }
}

impl OutputWriter for JsonResultWriter {
    fn write_header(&mut self) -> Result<()> {
        // No header for JSON - written at finalize
        Ok(())
    }

    fn write_detection(&mut self, detection: &Detection) -> Result<()> {
        self.detections.push(detection.clone());
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        let detections = self
            .detections
            .iter()
            .map(|d| JsonDetection {
                species: d.species.clone(),
                scientific_name: d.scientific_name().map(str::to_string),
                confidence: d.confidence,
                count: d.count,
                bounding_box: d.bounding_box,
                conservation_status: d.info.map(|i| i.conservation_status.to_string()),
                detected_at: d.detected_at.clone(),
            })
            .collect();

        let result = JsonResultFile {
            source_file: self.source_file.clone(),
            analysis_date: Utc::now(),
            detector: self.detector.clone(),
            settings: self.settings.clone(),
            image: self.image.take(),
            detections,
            summary: self.compute_summary(),
        };

        write_json_pretty(&self.output_path, &result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn settings() -> JsonSettings {
        JsonSettings {
            min_confidence: 0.5,
            max_dimension: 1200,
            enhanced: false,
            location: Some("Everglades".to_string()),
            lat: Some(25.2866),
            lon: Some(-80.8987),
        }
    }

    #[test]
    fn test_write_json_pretty_complete_file() {
        let dir = tempdir().expect("create temp dir");
        let path = dir.path().join("values.json");
        let values: Vec<u32> = (0..5000).collect();

        write_json_pretty(&path, &values).expect("write json");

        let back: Vec<u32> =
            serde_json::from_str(&std::fs::read_to_string(&path).expect("read file"))
                .expect("parse JSON");
        assert_eq!(back.len(), 5000);
    }

    #[test]
    fn test_json_writer_basic() {
        let dir = tempdir().expect("create temp dir");
        let output_path = dir.path().join("cam01.biowatch.json");

        let mut writer =
            JsonResultWriter::new(&output_path, "cam01.jpg", "simulated", settings(), None)
                .expect("create writer");
        writer.write_header().expect("write header");
        writer
            .write_detection(&Detection::from_label("raccoon", 0.91, None))
            .expect("write detection");
        writer.finalize().expect("finalize");

        let content = std::fs::read_to_string(&output_path).expect("read file");
        let result: JsonResultFile = serde_json::from_str(&content).expect("parse JSON");

        assert_eq!(result.source_file, "cam01.jpg");
        assert_eq!(result.detector, "simulated");
        assert_eq!(result.detections.len(), 1);
        assert_eq!(
            result.detections[0].scientific_name.as_deref(),
            Some("Procyon lotor")
        );
        assert_eq!(result.summary.total_detections, 1);
        assert_eq!(result.settings.lat, Some(25.2866));
    }

    #[test]
    fn test_json_summary_skips_marker() {
        let dir = tempdir().expect("create temp dir");
        let output_path = dir.path().join("cam02.biowatch.json");

        let mut writer =
            JsonResultWriter::new(&output_path, "cam02.jpg", "simulated", settings(), None)
                .expect("create writer");
        for d in [
            Detection::from_label("coyote", 0.9, None),
            Detection::from_label("coyote", 0.7, None),
            Detection::from_label("bobcat", 0.6, None),
        ] {
            writer.write_detection(&d).expect("write");
        }
        writer.finalize().expect("finalize");

        let content = std::fs::read_to_string(&output_path).expect("read file");
        let result: JsonResultFile = serde_json::from_str(&content).expect("parse JSON");
        assert_eq!(result.summary.total_detections, 3);
        assert_eq!(result.summary.unique_species, 2);
        assert_eq!(result.summary.total_individuals, 3);

        let empty_path = dir.path().join("empty.biowatch.json");
        let mut writer =
            JsonResultWriter::new(&empty_path, "empty.jpg", "simulated", settings(), None)
                .expect("create writer");
        writer
            .write_detection(&Detection::no_detection())
            .expect("write");
        writer.finalize().expect("finalize");
        let content = std::fs::read_to_string(&empty_path).expect("read file");
        let result: JsonResultFile = serde_json::from_str(&content).expect("parse JSON");
        assert_eq!(result.summary.total_detections, 0);
        assert_eq!(result.detections.len(), 1);
    }
}
