//! Detection result types.

use crate::catalog::{Location, SpeciesInfo, find_species};
use crate::constants::{NO_DETECTION_LABEL, annotate, confidence};
use serde::{Deserialize, Serialize};

/// Axis-aligned box in pixel coordinates of the processed image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Box width.
    pub width: u32,
    /// Box height.
    pub height: u32,
}

/// Confidence band used for coloring and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceTier {
    /// Above 0.8.
    High,
    /// Above 0.65.
    Medium,
    /// Everything else.
    Low,
}

impl ConfidenceTier {
    /// Classify a confidence score.
    pub fn from_confidence(value: f32) -> Self {
        if value > confidence::HIGH_TIER {
            Self::High
        } else if value > confidence::MEDIUM_TIER {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// RGB color for annotation.
    pub fn color(self) -> [u8; 3] {
        match self {
            Self::High => annotate::HIGH_COLOR,
            Self::Medium => annotate::MEDIUM_COLOR,
            Self::Low => annotate::LOW_COLOR,
        }
    }
}

impl std::fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// A single species detection in one image.
#[derive(Debug, Clone)]
pub struct Detection {
    /// Common name of the species.
    pub species: String,
    /// Detection confidence (0.0 - 1.0).
    pub confidence: f32,
    /// Number of individuals.
    pub count: u32,
    /// Location of the animal in the image, when the backend localizes.
    pub bounding_box: Option<BoundingBox>,
    /// Catalogue entry for the species, if catalogued.
    pub info: Option<&'static SpeciesInfo>,
    /// Local time the detection was made.
    pub detected_at: String,
    /// Where the image was taken.
    pub location: Option<Location>,
}

impl Detection {
    /// Create a detection from a classifier label.
    ///
    /// Labels may be plain names or `Scientific name_Common name`. Catalogued
    /// species are normalized to their catalogue common name.
    pub fn from_label(label: &str, confidence: f32, bounding_box: Option<BoundingBox>) -> Self {
        let info = find_species(label);
        let species = info.map_or_else(
            || {
                label
                    .split_once('_')
                    .map_or(label, |(_, common)| common)
                    .trim()
                    .to_string()
            },
            |s| s.common_name.to_string(),
        );

        Self {
            species,
            confidence,
            count: 1,
            bounding_box,
            info,
            detected_at: String::new(),
            location: None,
        }
    }

    /// The marker recorded when nothing was detected.
    pub fn no_detection() -> Self {
        Self {
            species: NO_DETECTION_LABEL.to_string(),
            confidence: 0.0,
            count: 0,
            bounding_box: None,
            info: None,
            detected_at: String::new(),
            location: None,
        }
    }

    /// Whether this is the "nothing detected" marker.
    pub fn is_no_detection(&self) -> bool {
        self.species == NO_DETECTION_LABEL
    }

    /// Confidence tier of this detection.
    pub fn tier(&self) -> ConfidenceTier {
        ConfidenceTier::from_confidence(self.confidence)
    }

    /// Scientific name from the catalogue.
    pub fn scientific_name(&self) -> Option<&'static str> {
        self.info.map(|i| i.scientific_name)
    }
}
