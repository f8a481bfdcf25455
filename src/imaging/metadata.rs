//! Image metadata extraction and display.

use crate::error::Result;
use crate::imaging::camera_exif::{ExifData, format_aperture, format_exposure};
use crate::imaging::process::{SourceImage, load_image};
use image::{ColorType, ImageFormat};
use serde::Serialize;
use std::path::Path;

/// Basic file properties plus any EXIF fields.
#[derive(Debug, Clone, Serialize)]
pub struct ImageMetadata {
    /// File name.
    pub file_name: String,
    /// Stored width in pixels.
    pub width: u32,
    /// Stored height in pixels.
    pub height: u32,
    /// Container format name (e.g. `JPEG`).
    pub format: String,
    /// File size in bytes.
    pub file_size: u64,
    /// Color mode name (e.g. `RGB`).
    pub color_mode: String,
    /// EXIF fields (all empty when the file has none).
    #[serde(skip_serializing_if = "is_empty_exif")]
    pub exif: ExifData,
}

fn is_empty_exif(exif: &ExifData) -> bool {
    *exif == ExifData::default()
}

impl Serialize for ExifData {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let fields = exif_fields(self);
        let mut map = serializer.serialize_map(Some(fields.len()))?;
        for (key, value) in &fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl ImageMetadata {
    /// Build metadata from an already decoded image.
    pub fn from_source(source: &SourceImage) -> Self {
        Self {
            file_name: source.file_name(),
            width: source.width(),
            height: source.height(),
            format: format_name(source.format),
            file_size: source.file_size,
            color_mode: color_mode_name(source.color_type).to_string(),
            exif: source.exif.clone().unwrap_or_default(),
        }
    }

    /// Width divided by height.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            0.0
        } else {
            f64::from(self.width) / f64::from(self.height)
        }
    }

    /// Ordered label/value pairs for display.
    pub fn display_fields(&self) -> Vec<(&'static str, String)> {
        #[allow(clippy::cast_precision_loss)]
        let size_kb = self.file_size as f64 / 1024.0;

        let mut fields = vec![
            ("Image Name", self.file_name.clone()),
            ("Width", format!("{} px", self.width)),
            ("Height", format!("{} px", self.height)),
            ("Format", self.format.clone()),
            ("Size", format!("{size_kb:.1} KB")),
            (
                "Dimensions",
                format!("{} \u{d7} {} pixels", self.width, self.height),
            ),
            ("Color Mode", self.color_mode.clone()),
            ("Aspect Ratio", format!("{:.2}", self.aspect_ratio())),
        ];
        fields.extend(exif_fields(&self.exif));
        fields
    }
}

/// EXIF fields in display order, skipping absent ones.
fn exif_fields(exif: &ExifData) -> Vec<(&'static str, String)> {
    let mut fields = Vec::new();
    if let Some(date) = exif.date_taken() {
        fields.push(("Date Taken", date.to_string()));
    }
    if let Some(ref make) = exif.make {
        fields.push(("Camera Make", make.clone()));
    }
    if let Some(ref model) = exif.model {
        fields.push(("Camera Model", model.clone()));
    }
    if let Some(exposure) = exif.exposure_time {
        fields.push(("Exposure", format_exposure(exposure)));
    }
    if let Some(aperture) = exif.f_number.and_then(format_aperture) {
        fields.push(("Aperture", aperture));
    }
    if let Some(iso) = exif.iso {
        fields.push(("ISO", iso.to_string()));
    }
    if let Some(lat) = exif.gps_latitude {
        fields.push(("GPS Latitude", format!("{lat:.6}")));
    }
    if let Some(lon) = exif.gps_longitude {
        fields.push(("GPS Longitude", format!("{lon:.6}")));
    }
    fields
}

/// Read metadata for an image file.
pub fn extract_metadata(path: &Path) -> Result<ImageMetadata> {
    load_image(path).map(|source| ImageMetadata::from_source(&source))
}

fn format_name(format: Option<ImageFormat>) -> String {
    match format {
        Some(ImageFormat::Jpeg) => "JPEG".to_string(),
        Some(ImageFormat::Png) => "PNG".to_string(),
        Some(other) => format!("{other:?}").to_uppercase(),
        None => "Unknown".to_string(),
    }
}

fn color_mode_name(color: ColorType) -> &'static str {
    match color {
        ColorType::L8 => "L",
        ColorType::La8 => "LA",
        ColorType::Rgb8 => "RGB",
        ColorType::Rgba8 => "RGBA",
        ColorType::L16 => "I;16",
        ColorType::La16 => "LA;16",
        ColorType::Rgb16 => "RGB;16",
        ColorType::Rgba16 => "RGBA;16",
        ColorType::Rgb32F => "RGB;F",
        ColorType::Rgba32F => "RGBA;F",
        _ => "Unknown",
    }
}
