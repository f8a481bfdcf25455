//! Image decoding and preprocessing.
//!
//! Decodes an image once, capturing the source properties and the raw EXIF
//! block alongside the pixels, applies the EXIF orientation and downscales
//! oversized images so the longest side fits the configured maximum.

use crate::error::{Error, Result};
use crate::imaging::camera_exif::{ExifData, parse_exif};
use image::imageops::{self, FilterType};
use image::metadata::Orientation;
use image::{ColorType, DynamicImage, ImageDecoder, ImageFormat, ImageReader, RgbImage};
use std::path::{Path, PathBuf};

/// A decoded image plus the properties of the file it came from.
#[derive(Debug, Clone)]
pub struct SourceImage {
    /// Path the image was loaded from.
    pub path: PathBuf,
    /// Decoded pixels as stored in the file (no orientation applied).
    pub image: DynamicImage,
    /// Detected container format.
    pub format: Option<ImageFormat>,
    /// Color type as stored in the file.
    pub color_type: ColorType,
    /// File size in bytes.
    pub file_size: u64,
    /// Parsed EXIF fields, when the file carries a readable EXIF block.
    pub exif: Option<ExifData>,
}

impl SourceImage {
    /// Width of the stored image in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height of the stored image in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// File name component of the path.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| self.path.display().to_string(), |n| n.to_string_lossy().into_owned())
    }
}

/// Image ready for detection.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    /// Source image and its properties.
    pub source: SourceImage,
    /// Oriented, RGB, downscaled pixels.
    pub image: RgbImage,
}

impl ProcessedImage {
    /// Width of the processed image.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height of the processed image.
    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Decode an image file, keeping its EXIF block.
pub fn load_image(path: &Path) -> Result<SourceImage> {
    let file_size = std::fs::metadata(path)
        .map_err(|e| Error::ImageOpen {
            path: path.to_path_buf(),
            source: e,
        })?
        .len();

    let decode_err = |source| Error::ImageDecode {
        path: path.to_path_buf(),
        source,
    };

    let reader = ImageReader::open(path)
        .map_err(|e| Error::ImageOpen {
            path: path.to_path_buf(),
            source: e,
        })?
        .with_guessed_format()
        .map_err(|e| Error::ImageOpen {
            path: path.to_path_buf(),
            source: e,
        })?;
    let format = reader.format();

    let mut decoder = reader.into_decoder().map_err(decode_err)?;
    let color_type = decoder.color_type();

    let exif = match decoder.exif_metadata() {
        Ok(Some(raw)) => match parse_exif(&raw) {
            Ok(exif) => Some(exif),
            Err(e) => {
                tracing::warn!("Ignoring EXIF data in {}: {e}", path.display());
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            tracing::debug!("Could not read EXIF from {}: {e}", path.display());
            None
        }
    };

    let image = DynamicImage::from_decoder(decoder).map_err(decode_err)?;

    Ok(SourceImage {
        path: path.to_path_buf(),
        image,
        format,
        color_type,
        file_size,
        exif,
    })
}

/// Load an image and prepare it for detection.
pub fn process_image(path: &Path, max_dimension: u32) -> Result<ProcessedImage> {
    let source = load_image(path)?;
    let orientation = source.exif.as_ref().and_then(|e| e.orientation);

    let mut oriented = DynamicImage::ImageRgb8(source.image.to_rgb8());
    apply_orientation(&mut oriented, orientation);
    let image = downscale(oriented.into_rgb8(), max_dimension);

    tracing::debug!(
        "Processed {}: {}x{} -> {}x{}",
        source.file_name(),
        source.width(),
        source.height(),
        image.width(),
        image.height()
    );

    Ok(ProcessedImage { source, image })
}

/// Rotate/flip pixels according to an EXIF orientation value.
///
/// Missing values and values outside 1-8 leave the image untouched.
pub fn apply_orientation(image: &mut DynamicImage, orientation: Option<u16>) {
    if let Some(orientation) = orientation
        .and_then(|v| u8::try_from(v).ok())
        .and_then(Orientation::from_exif)
    {
        image.apply_orientation(orientation);
    }
}

/// Scale dimensions so the longest side is at most `max_dimension`.
///
/// Returns `None` when no scaling is needed.
pub fn scaled_dimensions(width: u32, height: u32, max_dimension: u32) -> Option<(u32, u32)> {
    let longest = width.max(height);
    if longest <= max_dimension || longest == 0 {
        return None;
    }
    let ratio = f64::from(max_dimension) / f64::from(longest);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let scale = |v: u32| ((f64::from(v) * ratio) as u32).max(1);
    Some((scale(width), scale(height)))
}

/// Downscale with a Lanczos filter when the image exceeds `max_dimension`.
pub fn downscale(image: RgbImage, max_dimension: u32) -> RgbImage {
    match scaled_dimensions(image.width(), image.height(), max_dimension) {
        Some((w, h)) => imageops::resize(&image, w, h, FilterType::Lanczos3),
        None => image,
    }
}
