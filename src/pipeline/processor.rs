//! Single image processing pipeline.

use crate::catalog::Location;
use crate::config::OutputFormat;
use crate::constants::enhance::THUMBNAIL_SIZE;
use crate::constants::{EXIF_LOCATION_NAME, output_extensions};
use crate::error::{Error, Result};
use crate::history::HistoryStore;
use crate::imaging::{
    ImageMetadata, ProcessedImage, annotate, enhance_image, make_thumbnail, process_image,
};
use crate::inference::{DetectOptions, Detection, SpeciesDetector, detect_species};
use crate::locking::FileLock;
use crate::output::{CsvWriter, JsonResultWriter, JsonSettings, OutputWriter};
use crate::pipeline::{ProcessOptions, output_path_for, result_path_for};
use crate::utils::date::{format_timestamp, now_local};
use image::{ImageFormat, RgbImage};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result of processing a single image.
#[derive(Debug)]
pub struct ProcessResult {
    /// Identifier shared by the history entries of this analysis.
    pub detection_id: String,
    /// Final results, possibly just the empty marker.
    pub detections: Vec<Detection>,
    /// Location recorded with the results.
    pub location: Option<Location>,
    /// Files written.
    pub outputs: Vec<PathBuf>,
    /// History entries appended.
    pub history_entries: usize,
    /// Processing duration in seconds.
    pub duration_secs: f64,
}

impl ProcessResult {
    /// Number of species detections, not counting the empty marker.
    pub fn species_detections(&self) -> usize {
        self.detections
            .iter()
            .filter(|d| !d.is_no_detection())
            .count()
    }
}

/// Pick the location for an image.
///
/// Command-line location first, then the image's EXIF GPS position, then the
/// configured default.
pub fn resolve_location(
    explicit: Option<&Location>,
    exif_gps: Option<(f64, f64)>,
    default: Option<&Location>,
) -> Option<Location> {
    if let Some(location) = explicit {
        return Some(location.clone());
    }
    if let Some((latitude, longitude)) = exif_gps {
        match Location::new(EXIF_LOCATION_NAME, latitude, longitude) {
            Ok(location) => return Some(location),
            Err(e) => warn!("Ignoring EXIF GPS position: {e}"),
        }
    }
    default.cloned()
}

/// Analyse one image: detect, write result files and append history.
pub fn process_file(
    input_path: &Path,
    output_dir: &Path,
    detector: &dyn SpeciesDetector,
    history: &HistoryStore,
    options: &ProcessOptions,
) -> Result<ProcessResult> {
    let start_time = Instant::now();

    info!("Processing: {}", input_path.display());

    std::fs::create_dir_all(output_dir).map_err(|e| Error::OutputDirCreateFailed {
        path: output_dir.to_path_buf(),
        source: e,
    })?;
    let _lock = FileLock::acquire(input_path, output_dir)?;

    let ProcessedImage { source, image } = process_image(input_path, options.max_dimension)?;
    let metadata = ImageMetadata::from_source(&source);
    let image_name = source.file_name();

    let location = resolve_location(
        options.location.as_ref(),
        source.exif.as_ref().and_then(|e| e.gps_position()),
        options.default_location.as_ref(),
    );
    if let Some(location) = &location {
        debug!(
            "Location: {} ({:.4}, {:.4})",
            location.name, location.latitude, location.longitude
        );
    }

    let image = if options.enhance {
        debug!("Enhancing contrast");
        enhance_image(&image)
    } else {
        image
    };

    let detect_options = DetectOptions {
        min_confidence: options.min_confidence,
        species_filter: options.species_filter.clone(),
        location: location.clone(),
    };
    let detections = detect_species(detector, &image, &detect_options)?;

    let detection_id = uuid::Uuid::new_v4().to_string();
    let timestamp = format_timestamp(&now_local());

    // Outputs mark the image as processed: keep them only once history holds
    // its detections.
    let mut outputs = Vec::new();
    let history_entries = write_outputs(
        input_path,
        output_dir,
        &image,
        &image_name,
        detector.name(),
        &metadata,
        location.as_ref(),
        &detections,
        options,
        &mut outputs,
    )
    .and_then(|()| {
        history.append(
            &detection_id,
            &timestamp,
            &image_name,
            location.as_ref(),
            &detections,
        )
    })
    .inspect_err(|_| discard_outputs(&outputs))?;

    let result = ProcessResult {
        detection_id,
        detections,
        location,
        outputs,
        history_entries,
        duration_secs: start_time.elapsed().as_secs_f64(),
    };

    info!(
        "{}: {} detection(s) above {:.1}% confidence in {:.2}s",
        image_name,
        result.species_detections(),
        options.min_confidence * 100.0,
        result.duration_secs
    );

    Ok(result)
}

/// Write the annotated image, result files and thumbnail, recording each path.
#[allow(clippy::too_many_arguments)]
fn write_outputs(
    input_path: &Path,
    output_dir: &Path,
    image: &RgbImage,
    image_name: &str,
    detector_name: &str,
    metadata: &ImageMetadata,
    location: Option<&Location>,
    detections: &[Detection],
    options: &ProcessOptions,
    outputs: &mut Vec<PathBuf>,
) -> Result<()> {
    if options.annotate {
        let path = output_path_for(input_path, output_dir, output_extensions::ANNOTATED);
        outputs.push(path.clone());
        save_png(&annotate(image, detections), &path)?;
    }

    for format in &options.formats {
        let path = result_path_for(input_path, output_dir, *format);
        outputs.push(path.clone());
        write_results(
            &path,
            *format,
            image_name,
            detector_name,
            metadata,
            location,
            detections,
            options,
        )?;
    }

    if options.thumbnails {
        let path = output_path_for(input_path, output_dir, output_extensions::THUMBNAIL);
        outputs.push(path.clone());
        save_png(&make_thumbnail(image, THUMBNAIL_SIZE.0, THUMBNAIL_SIZE.1), &path)?;
    }

    Ok(())
}

/// Remove outputs of a failed run so the image is picked up again.
fn discard_outputs(outputs: &[PathBuf]) {
    for path in outputs.iter().filter(|p| p.exists()) {
        match std::fs::remove_file(path) {
            Ok(()) => debug!("Removed partial output: {}", path.display()),
            Err(e) => warn!("Could not remove {}: {e}", path.display()),
        }
    }
}

fn save_png(image: &RgbImage, path: &Path) -> Result<()> {
    debug!("Writing image: {}", path.display());
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| Error::ImageWrite {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Write detections to a results file.
#[allow(clippy::too_many_arguments)]
fn write_results(
    path: &Path,
    format: OutputFormat,
    image_name: &str,
    detector_name: &str,
    metadata: &ImageMetadata,
    location: Option<&Location>,
    detections: &[Detection],
    options: &ProcessOptions,
) -> Result<()> {
    debug!("Writing {} output: {}", format, path.display());

    let mut writer: Box<dyn OutputWriter> = match format {
        OutputFormat::Csv => Box::new(CsvWriter::new(path, image_name, options.csv_bom)?),
        OutputFormat::Json => {
            let settings = JsonSettings {
                min_confidence: options.min_confidence,
                max_dimension: options.max_dimension,
                enhanced: options.enhance,
                location: location.map(|l| l.name.clone()),
                lat: location.map(|l| l.latitude),
                lon: location.map(|l| l.longitude),
            };
            Box::new(JsonResultWriter::new(
                path,
                image_name,
                detector_name,
                settings,
                Some(metadata),
            )?)
        }
    };

    writer.write_header()?;
    for detection in detections {
        writer.write_detection(detection)?;
    }
    writer.finalize()
}
