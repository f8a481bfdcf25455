//! History export to CSV or JSON.

use crate::config::OutputFormat;
use crate::constants::history::{EXPORT_PREFIX, EXPORT_STAMP_FORMAT};
use crate::error::Result;
use crate::history::HistoryEntry;
use crate::output::{write_csv_records, write_json_pretty};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Flat CSV row; the `csv` crate cannot serialize nested boxes.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    detection_id: &'a str,
    timestamp: &'a str,
    image_name: &'a str,
    species: &'a str,
    confidence: f64,
    count: u32,
    latitude: Option<f64>,
    longitude: Option<f64>,
    location_name: &'a str,
    scientific_name: Option<&'a str>,
    weight_range: Option<&'a str>,
    height_range: Option<&'a str>,
    conservation_status: Option<&'a str>,
    habitat: Option<&'a str>,
    description: Option<&'a str>,
    detected_at: Option<&'a str>,
    bbox_x: Option<u32>,
    bbox_y: Option<u32>,
    bbox_width: Option<u32>,
    bbox_height: Option<u32>,
}

impl<'a> From<&'a HistoryEntry> for ExportRow<'a> {
    fn from(e: &'a HistoryEntry) -> Self {
        let bbox = e.bounding_box;
        Self {
            detection_id: &e.detection_id,
            timestamp: &e.timestamp,
            image_name: &e.image_name,
            species: &e.species,
            confidence: e.confidence,
            count: e.count,
            latitude: e.latitude,
            longitude: e.longitude,
            location_name: &e.location_name,
            scientific_name: e.scientific_name.as_deref(),
            weight_range: e.weight_range.as_deref(),
            height_range: e.height_range.as_deref(),
            conservation_status: e.conservation_status.as_deref(),
            habitat: e.habitat.as_deref(),
            description: e.description.as_deref(),
            detected_at: e.detected_at.as_deref(),
            bbox_x: bbox.map(|b| b.x),
            bbox_y: bbox.map(|b| b.y),
            bbox_width: bbox.map(|b| b.width),
            bbox_height: bbox.map(|b| b.height),
        }
    }
}

/// Default export file name, e.g. `detection_export_20240601_103000.csv`.
pub fn export_file_name(format: OutputFormat, now: NaiveDateTime) -> String {
    format!(
        "{EXPORT_PREFIX}{}.{}",
        now.format(EXPORT_STAMP_FORMAT),
        format.extension()
    )
}

/// Write entries to `path` as CSV or a JSON array of records.
pub fn export(entries: &[HistoryEntry], format: OutputFormat, path: &Path, bom: bool) -> Result<()> {
    match format {
        OutputFormat::Csv => {
            let rows: Vec<ExportRow<'_>> = entries.iter().map(ExportRow::from).collect();
            write_csv_records(path, &rows, bom)?;
        }
        OutputFormat::Json => write_json_pretty(path, entries)?,
    }
    info!("Exported {} history entries to {}", entries.len(), path.display());
    Ok(())
}
