//! Detection history records.

use crate::catalog::Location;
use crate::constants::UNKNOWN_LOCATION;
use crate::constants::confidence::DECIMAL_PLACES;
use crate::inference::{BoundingBox, Detection};
use crate::utils::date::parse_timestamp;
use crate::utils::format::round_to;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

fn unknown_location() -> String {
    UNKNOWN_LOCATION.to_string()
}

/// One species detected in one analysed image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Identifier shared by all entries of one image analysis.
    pub detection_id: String,
    /// Analysis time (`YYYY-MM-DD HH:MM:SS`).
    pub timestamp: String,
    /// Analysed image file name.
    pub image_name: String,
    /// Species common name.
    pub species: String,
    /// Detection confidence.
    pub confidence: f64,
    /// Number of individuals.
    pub count: u32,
    /// Latitude of the camera, when known.
    pub latitude: Option<f64>,
    /// Longitude of the camera, when known.
    pub longitude: Option<f64>,
    /// Monitoring location name.
    #[serde(default = "unknown_location")]
    pub location_name: String,
    /// Scientific name from the catalogue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scientific_name: Option<String>,
    /// Typical weight range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_range: Option<String>,
    /// Typical height range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_range: Option<String>,
    /// Conservation status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conservation_status: Option<String>,
    /// Habitat description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub habitat: Option<String>,
    /// Species description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Time the detector produced the result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_at: Option<String>,
    /// Box in processed-image pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
}

impl HistoryEntry {
    /// Build an entry from a detection.
    ///
    /// `location` wins over the detection's own location.
    pub fn from_detection(
        detection_id: &str,
        timestamp: &str,
        image_name: &str,
        location: Option<&Location>,
        detection: &Detection,
    ) -> Self {
        let location = location.or(detection.location.as_ref());
        let info = detection.info;

        Self {
            detection_id: detection_id.to_string(),
            timestamp: timestamp.to_string(),
            image_name: image_name.to_string(),
            species: detection.species.clone(),
            confidence: round_to(f64::from(detection.confidence), DECIMAL_PLACES),
            count: detection.count,
            latitude: location.map(|l| l.latitude),
            longitude: location.map(|l| l.longitude),
            location_name: location.map_or_else(unknown_location, |l| l.name.clone()),
            scientific_name: info.map(|i| i.scientific_name.to_string()),
            weight_range: info.map(|i| i.weight_range.to_string()),
            height_range: info.map(|i| i.height_range.to_string()),
            conservation_status: info.map(|i| i.conservation_status.to_string()),
            habitat: info.map(|i| i.habitat.to_string()),
            description: info.map(|i| i.description.to_string()),
            detected_at: (!detection.detected_at.is_empty()).then(|| detection.detected_at.clone()),
            bounding_box: detection.bounding_box,
        }
    }

    /// Parsed analysis time.
    pub fn parsed_timestamp(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.timestamp)
    }

    /// Whether this records an image where nothing was detected.
    pub fn is_no_detection(&self) -> bool {
        self.species == crate::constants::NO_DETECTION_LABEL
    }

    /// Coordinates when both are present.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}
