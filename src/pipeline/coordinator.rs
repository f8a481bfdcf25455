//! Pipeline coordination for image batches.

use crate::catalog::Location;
use crate::config::OutputFormat;
use crate::constants::{IMAGE_EXTENSIONS, output_extensions};
use crate::error::Result;
use crate::inference::SpeciesFilter;
use crate::locking::FileLock;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Options for processing a single image.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Output directory (None = same as input).
    pub output_dir: Option<PathBuf>,
    /// Per-image result formats.
    pub formats: Vec<OutputFormat>,
    /// Force reprocessing even if outputs exist.
    pub force: bool,
    /// Minimum confidence threshold.
    pub min_confidence: f32,
    /// Largest processed image side.
    pub max_dimension: u32,
    /// Enhance contrast before detection.
    pub enhance: bool,
    /// Write the annotated image.
    pub annotate: bool,
    /// Write a thumbnail.
    pub thumbnails: bool,
    /// Prefix CSV files with a UTF-8 BOM.
    pub csv_bom: bool,
    /// Optional species allow-list.
    pub species_filter: Option<SpeciesFilter>,
    /// Location given on the command line; beats EXIF GPS.
    pub location: Option<Location>,
    /// Configured default location; used when nothing else is known.
    pub default_location: Option<Location>,
}

/// Result of checking whether a file should be processed.
#[derive(Debug, PartialEq, Eq)]
pub enum ProcessCheck {
    /// File should be processed.
    Process,
    /// Skip - output already exists.
    SkipExists,
    /// Skip - file is locked by another process.
    SkipLocked,
}

/// Determine the output directory for a file.
pub fn output_dir_for(input: &Path, explicit_output_dir: Option<&Path>) -> PathBuf {
    explicit_output_dir.map_or_else(
        || {
            input
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
        },
        Path::to_path_buf,
    )
}

/// Output path built from the input stem and a suffix such as `.annotated.png`.
pub fn output_path_for(input: &Path, output_dir: &Path, suffix: &str) -> PathBuf {
    // Non-UTF-8 stems are kept lossily
    let stem = input.file_stem().map_or_else(
        || std::borrow::Cow::Borrowed("output"),
        |s| s.to_string_lossy(),
    );
    output_dir.join(format!("{stem}{suffix}"))
}

/// Results file path for a given format.
pub fn result_path_for(input: &Path, output_dir: &Path, format: OutputFormat) -> PathBuf {
    let suffix = match format {
        OutputFormat::Csv => output_extensions::CSV,
        OutputFormat::Json => output_extensions::JSON,
    };
    output_path_for(input, output_dir, suffix)
}

/// Every file a run with `options` writes for `input`.
pub fn expected_outputs(input: &Path, output_dir: &Path, options: &ProcessOptions) -> Vec<PathBuf> {
    let mut outputs: Vec<PathBuf> = options
        .formats
        .iter()
        .map(|fmt| result_path_for(input, output_dir, *fmt))
        .collect();
    if options.annotate {
        outputs.push(output_path_for(input, output_dir, output_extensions::ANNOTATED));
    }
    if options.thumbnails {
        outputs.push(output_path_for(input, output_dir, output_extensions::THUMBNAIL));
    }
    outputs
}

/// Check if a file should be processed.
pub fn should_process(input: &Path, output_dir: &Path, options: &ProcessOptions) -> ProcessCheck {
    if FileLock::is_locked(input, output_dir) {
        return ProcessCheck::SkipLocked;
    }

    if !options.force {
        let outputs = expected_outputs(input, output_dir, options);
        if !outputs.is_empty() && outputs.iter().all(|p| p.exists()) {
            return ProcessCheck::SkipExists;
        }
    }

    ProcessCheck::Process
}

/// Collect input images from paths (files and directories).
///
/// Directory contents are visited recursively in name order. Files given
/// explicitly are kept only when they carry an image extension.
pub fn collect_input_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            if is_image_file(path) {
                files.push(path.clone());
            } else {
                warn!("Skipping unsupported file: {}", path.display());
            }
        } else if path.is_dir() {
            collect_image_files_recursive(path, &mut files)?;
        } else {
            warn!("Skipping non-existent path: {}", path.display());
        }
    }

    Ok(files)
}

fn collect_image_files_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            collect_image_files_recursive(&path, files)?;
        } else if is_image_file(&path) {
            files.push(path);
        }
    }

    Ok(())
}

/// Check if a file has a supported image extension.
fn is_image_file(path: &Path) -> bool {
    use std::ffi::OsStr;

    path.extension().is_some_and(|ext| {
        IMAGE_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(OsStr::new(known)))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn options() -> ProcessOptions {
        ProcessOptions {
            output_dir: None,
            formats: vec![OutputFormat::Csv],
            force: false,
            min_confidence: 0.5,
            max_dimension: 1200,
            enhance: false,
            annotate: true,
            thumbnails: false,
            csv_bom: false,
            species_filter: None,
            location: None,
            default_location: None,
        }
    }

    #[test]
    fn test_output_dir_for_with_explicit() {
        let input = Path::new("/data/cam01.jpg");
        let output = output_dir_for(input, Some(Path::new("/results")));
        assert_eq!(output, PathBuf::from("/results"));
    }

    #[test]
    fn test_output_dir_for_without_explicit() {
        assert_eq!(
            output_dir_for(Path::new("/data/cam01.jpg"), None),
            PathBuf::from("/data")
        );
        assert_eq!(output_dir_for(Path::new("cam01.jpg"), None), PathBuf::from("."));
    }

    #[test]
    fn test_result_paths() {
        let csv = result_path_for(Path::new("cam01.JPG"), Path::new("/out"), OutputFormat::Csv);
        assert_eq!(csv, PathBuf::from("/out/cam01.biowatch.csv"));
        let json = result_path_for(Path::new("cam01.JPG"), Path::new("/out"), OutputFormat::Json);
        assert_eq!(json, PathBuf::from("/out/cam01.biowatch.json"));
    }

    #[test]
    fn test_output_path_for_unicode() {
        let path = output_path_for(
            Path::new("kettu_ähtäri.jpg"),
            Path::new("/output"),
            output_extensions::ANNOTATED,
        );
        assert!(path.to_string_lossy().ends_with("kettu_ähtäri.annotated.png"));
    }

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("cam.jpg")));
        assert!(is_image_file(Path::new("cam.JPEG")));
        assert!(is_image_file(Path::new("cam.Png")));
        assert!(!is_image_file(Path::new("cam.gif")));
        assert!(!is_image_file(Path::new("notes.txt")));
        assert!(!is_image_file(Path::new("jpg")));
    }

    #[test]
    fn test_collect_input_files_recursive_sorted() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("site_b");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(dir.path().join("b.jpg"), b"x").unwrap();
        std::fs::write(dir.path().join("a.PNG"), b"x").unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"x").unwrap();
        std::fs::write(nested.join("c.jpeg"), b"x").unwrap();

        let files = collect_input_files(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.PNG", "b.jpg", "c.jpeg"]);
    }

    #[test]
    fn test_should_process_checks_outputs_and_locks() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("cam01.jpg");
        std::fs::write(&input, b"x").unwrap();
        let opts = options();

        assert_eq!(should_process(&input, dir.path(), &opts), ProcessCheck::Process);

        for path in expected_outputs(&input, dir.path(), &opts) {
            std::fs::write(path, b"done").unwrap();
        }
        assert_eq!(should_process(&input, dir.path(), &opts), ProcessCheck::SkipExists);

        let forced = ProcessOptions {
            force: true,
            ..opts.clone()
        };
        assert_eq!(should_process(&input, dir.path(), &forced), ProcessCheck::Process);

        let _lock = FileLock::acquire(&input, dir.path()).unwrap();
        assert_eq!(should_process(&input, dir.path(), &forced), ProcessCheck::SkipLocked);
    }
}
