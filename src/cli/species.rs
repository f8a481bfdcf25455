//! Species catalogue, location and metadata commands.

use crate::catalog::{
    Coordinates, Location, SPECIES, SpeciesInfo, all_locations, display_name, find_species,
};
use crate::error::{Error, Result};
use crate::imaging::extract_metadata;
use crate::output::{ReportFormat, TableRow, emit_rows, write_stdout};
use std::collections::BTreeMap;
use std::path::Path;

impl TableRow for SpeciesInfo {
    fn headers() -> &'static [&'static str] {
        &["Species", "Scientific Name", "Conservation Status"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            display_name(self.common_name),
            self.scientific_name.to_string(),
            self.conservation_status.to_string(),
        ]
    }
}

impl TableRow for Location {
    fn headers() -> &'static [&'static str] {
        &["Location", "Latitude", "Longitude"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            format!("{:.4}", self.latitude),
            format!("{:.4}", self.longitude),
        ]
    }
}

/// List every catalogued species.
pub fn list_species(format: ReportFormat) -> Result<()> {
    emit_rows(SPECIES, format, None)
}

/// Text block describing one species.
pub fn species_info_text(info: &SpeciesInfo) -> String {
    let fields = [
        ("Scientific name", info.scientific_name),
        ("Weight", info.weight_range),
        ("Height", info.height_range),
        ("Habitat", info.habitat),
        ("Diet", info.diet),
        ("Lifespan", info.lifespan),
        ("Conservation status", info.conservation_status),
    ];

    let mut text = format!("{}\n", display_name(info.common_name));
    for (label, value) in fields {
        text.push_str(&format!("  {label:<20} {value}\n"));
    }
    text.push_str(&format!("\n  {}\n", info.description));
    text
}

/// Print details for one species.
pub fn show_species(name: &str) -> Result<()> {
    let info = find_species(name).ok_or_else(|| Error::UnknownSpecies {
        name: name.to_string(),
    })?;
    write_stdout(&species_info_text(info))
}

/// List built-in and configured monitoring locations.
pub fn list_locations(configured: &BTreeMap<String, Coordinates>, format: ReportFormat) -> Result<()> {
    emit_rows(&all_locations(configured), format, None)
}

/// Print image properties and EXIF data.
pub fn show_metadata(path: &Path, json: bool) -> Result<()> {
    let metadata = extract_metadata(path)?;
    if json {
        let text = serde_json::to_string_pretty(&metadata).map_err(|e| Error::Internal {
            message: format!("failed to serialize metadata: {e}"),
        })?;
        return write_stdout(&format!("{text}\n"));
    }

    let fields = metadata.display_fields();
    let width = fields.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    let mut text = String::new();
    for (key, value) in fields {
        text.push_str(&format!("{key:<width$}  {value}\n"));
    }
    write_stdout(&text)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_species_info_text() {
        let text = species_info_text(find_species("raccoon").unwrap());
        assert!(text.starts_with("Raccoon\n"));
        assert!(text.contains("Procyon lotor"));
        assert!(text.contains("Conservation status"));
    }

    #[test]
    fn test_location_cells() {
        let location = Location::new("Everglades", 25.2866, -80.8987).unwrap();
        assert_eq!(location.cells(), vec!["Everglades", "25.2866", "-80.8987"]);
    }

    #[test]
    fn test_show_unknown_species() {
        assert!(matches!(
            show_species("dodo"),
            Err(Error::UnknownSpecies { .. })
        ));
    }
}
