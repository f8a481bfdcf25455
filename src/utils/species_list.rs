//! Species allow-list file reading.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read a species allow-list.
///
/// # File Format
/// - One species per line
/// - Common name (`red fox`), scientific name (`Vulpes vulpes`) or a
///   classifier label (`Vulpes vulpes_Red Fox`)
/// - Blank lines and lines starting with `#` are ignored
///
/// # Errors
/// - Returns error if file cannot be read
/// - Returns error if file contains invalid UTF-8
pub fn read_species_list(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|e| Error::SpeciesListRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let reader = BufReader::new(file);
    let mut species = Vec::new();

    for line in reader.lines() {
        let line = line.map_err(|e| Error::SpeciesListRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        let trimmed = line.trim();
        if !trimmed.is_empty() && !trimmed.starts_with('#') {
            species.push(trimmed.to_string());
        }
    }

    Ok(species)
}
