//! CSV output writers.

use crate::constants::UTF8_BOM;
use crate::constants::confidence::DECIMAL_PLACES;
use crate::error::{Error, Result};
use crate::inference::Detection;
use crate::output::OutputWriter;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Open a CSV writer on `path`, optionally starting with a UTF-8 BOM.
pub fn create_csv_writer(path: &Path, bom: bool) -> Result<csv::Writer<BufWriter<File>>> {
    let file = File::create(path)?;
    let mut buf = BufWriter::new(file);
    if bom {
        buf.write_all(UTF8_BOM)?;
    }
    Ok(csv::Writer::from_writer(buf))
}

/// Write serializable records with serde-derived headers.
pub fn write_csv_records<T: Serialize>(path: &Path, records: &[T], bom: bool) -> Result<()> {
    let csv_err = |e| Error::CsvWrite {
        path: path.to_path_buf(),
        source: e,
    };
    let mut writer = create_csv_writer(path, bom)?;
    for record in records {
        writer.serialize(record).map_err(csv_err)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write a table with explicit headers and string cells to any writer.
pub fn write_csv_table<W: Write>(
    out: W,
    headers: &[&str],
    rows: &[Vec<String>],
) -> std::result::Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Column headers of per-image result files.
pub const RESULT_HEADERS: [&str; 14] = [
    "Image",
    "Species",
    "Scientific name",
    "Confidence",
    "Count",
    "Tier",
    "Box X",
    "Box Y",
    "Box Width",
    "Box Height",
    "Latitude",
    "Longitude",
    "Location",
    "Detected at",
];

/// Per-image CSV results writer.
pub struct CsvWriter {
    writer: csv::Writer<BufWriter<File>>,
    path: PathBuf,
    image_name: String,
}

impl CsvWriter {
    /// Create a new CSV writer for the results of `image_name`.
    pub fn new(path: &Path, image_name: &str, bom: bool) -> Result<Self> {
        Ok(Self {
            writer: create_csv_writer(path, bom)?,
            path: path.to_path_buf(),
            image_name: image_name.to_string(),
        })
    }

    fn csv_err(&self, source: csv::Error) -> Error {
        Error::CsvWrite {
            path: self.path.clone(),
            source,
        }
    }
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl OutputWriter for CsvWriter {
    fn write_header(&mut self) -> Result<()> {
        self.writer
            .write_record(RESULT_HEADERS)
            .map_err(|e| self.csv_err(e))
    }

    fn write_detection(&mut self, detection: &Detection) -> Result<()> {
        let bbox = detection.bounding_box;
        let location = detection.location.as_ref();
        let record = [
            self.image_name.clone(),
            detection.species.clone(),
            opt(detection.scientific_name()),
            format!("{:.prec$}", detection.confidence, prec = DECIMAL_PLACES),
            detection.count.to_string(),
            if detection.is_no_detection() {
                String::new()
            } else {
                detection.tier().to_string()
            },
            opt(bbox.map(|b| b.x)),
            opt(bbox.map(|b| b.y)),
            opt(bbox.map(|b| b.width)),
            opt(bbox.map(|b| b.height)),
            opt(location.map(|l| l.latitude)),
            opt(location.map(|l| l.longitude)),
            opt(location.map(|l| l.name.clone())),
            detection.detected_at.clone(),
        ];
        self.writer
            .write_record(&record)
            .map_err(|e| self.csv_err(e))
    }

    fn finalize(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
