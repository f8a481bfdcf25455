//! Image loading, metadata and rendering.

mod annotate;
pub mod camera_exif;
mod enhance;
mod metadata;
mod process;

pub use annotate::{annotate, detection_label};
pub use camera_exif::ExifData;
pub use enhance::{enhance_image, make_thumbnail};
pub use metadata::{ImageMetadata, extract_metadata};
pub use process::{
    ProcessedImage, SourceImage, apply_orientation, downscale, load_image, process_image,
    scaled_dimensions,
};
