//! Application-wide constants.
//!
//! All magic numbers and strings are defined here to ensure consistency
//! and make changes easy to track.

/// Application name used for config directories and user-facing messages.
pub const APP_NAME: &str = "biowatch";

/// Default minimum confidence threshold for detections.
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.5;

/// Largest side (in pixels) kept after image preprocessing.
///
/// Larger images are downscaled preserving aspect ratio.
pub const DEFAULT_MAX_DIMENSION: u32 = 1200;

/// Default number of top predictions kept by the ONNX classifier.
pub const DEFAULT_TOP_K: usize = 3;

/// Default square input size for ONNX image classifiers.
pub const DEFAULT_INPUT_SIZE: u32 = 224;

/// Lock file extension.
pub const LOCK_FILE_EXTENSION: &str = ".biowatch.lock";

/// Species label used when nothing was detected in an image.
pub const NO_DETECTION_LABEL: &str = "No wildlife detected";

/// Location name stored when a detection has no known location.
pub const UNKNOWN_LOCATION: &str = "Unknown";

/// Location name recorded for `--lat`/`--lon` without `--location-name`.
pub const CUSTOM_LOCATION_NAME: &str = "Custom";

/// Location name used for coordinates read from the image's EXIF GPS block.
pub const EXIF_LOCATION_NAME: &str = "Camera GPS";

/// Timestamp format used in history entries and results.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Supported image file extensions.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Output file suffixes by kind.
pub mod output_extensions {
    /// Per-image CSV results.
    pub const CSV: &str = ".biowatch.csv";
    /// Per-image JSON results.
    pub const JSON: &str = ".biowatch.json";
    /// Annotated image with detection boxes.
    pub const ANNOTATED: &str = ".annotated.png";
    /// Thumbnail image.
    pub const THUMBNAIL: &str = ".thumb.png";
}

/// Detection history storage.
pub mod history {
    /// History file name inside the data directory.
    pub const FILE_NAME: &str = "detection_history.json";
    /// Prefix of history export files.
    pub const EXPORT_PREFIX: &str = "detection_export_";
    /// Timestamp format embedded in export file names.
    pub const EXPORT_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
}

/// Confidence value bounds and tiers.
pub mod confidence {
    /// Minimum valid confidence value.
    pub const MIN: f32 = 0.0;
    /// Maximum valid confidence value.
    pub const MAX: f32 = 1.0;
    /// Decimal places for confidence formatting in machine-readable output.
    pub const DECIMAL_PLACES: usize = 4;
    /// Scores above this are high confidence.
    pub const HIGH_TIER: f32 = 0.8;
    /// Scores above this (and not high) are medium confidence.
    pub const MEDIUM_TIER: f32 = 0.65;
}

/// Simulated detector parameters.
pub mod simulated {
    /// Maximum detections produced per image.
    pub const MAX_DETECTIONS: usize = 3;
    /// Upper bound (exclusive) of generated confidence scores.
    pub const MAX_CONFIDENCE: f32 = 0.95;
    /// Minimum distance of a box origin from the top/left edge.
    pub const EDGE_OFFSET: u32 = 10;
    /// Minimum distance of a box from the right/bottom edge.
    pub const EDGE_MARGIN: u32 = 5;
}

/// Annotation drawing parameters.
pub mod annotate {
    /// Box outline thickness in pixels.
    pub const BOX_THICKNESS: u32 = 3;
    /// Label text height in pixels.
    pub const LABEL_SCALE: f32 = 16.0;
    /// Padding around the label text inside its tab.
    pub const LABEL_PADDING: u32 = 5;
    /// Label text color.
    pub const LABEL_TEXT_COLOR: [u8; 3] = [255, 255, 255];
    /// Color for high-confidence detections.
    pub const HIGH_COLOR: [u8; 3] = [0, 200, 0];
    /// Color for medium-confidence detections.
    pub const MEDIUM_COLOR: [u8; 3] = [255, 165, 0];
    /// Color for low-confidence detections.
    pub const LOW_COLOR: [u8; 3] = [255, 0, 0];
}

/// Image enhancement parameters.
pub mod enhance {
    /// Gaussian sigma used for mild denoising.
    pub const DENOISE_SIGMA: f32 = 0.8;
    /// Default thumbnail bounding box.
    pub const THUMBNAIL_SIZE: (u32, u32) = (300, 300);
}

/// Confidence histogram bins used by reports.
pub mod confidence_bins {
    /// Upper edges of the bins (right inclusive).
    pub const EDGES: [f32; 4] = [0.25, 0.5, 0.75, 1.0];
    /// Bin labels.
    pub const LABELS: [&str; 4] = ["0-25%", "25-50%", "50-75%", "75-100%"];
}

/// ImageNet normalization constants.
pub mod imagenet {
    /// Per-channel mean.
    pub const MEAN: [f32; 3] = [0.485, 0.456, 0.406];
    /// Per-channel standard deviation.
    pub const STD: [f32; 3] = [0.229, 0.224, 0.225];
}

/// UTF-8 Byte Order Mark for Excel compatibility in CSV files.
pub const UTF8_BOM: &[u8; 3] = b"\xEF\xBB\xBF";
