//! Species catalogue and monitoring locations.

pub mod locations;
mod species;

pub use locations::{Coordinates, Location, all_locations, find_location, validate_coordinates};
pub use species::{SPECIES, SpeciesInfo, display_name, find_species};
