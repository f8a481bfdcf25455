//! Camera-trap monitoring locations.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named point where a camera trap is deployed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Display name of the site.
    #[serde(rename = "location_name")]
    pub name: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

/// Coordinates of a user-defined location in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

impl Location {
    /// Create a location after validating its coordinates.
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Result<Self> {
        validate_coordinates(latitude, longitude)?;
        Ok(Self {
            name: name.into(),
            latitude,
            longitude,
        })
    }
}

/// Check that a coordinate pair lies on the globe.
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(Error::InvalidLatitude { value: latitude });
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(Error::InvalidLongitude { value: longitude });
    }
    Ok(())
}

const BUILTIN: &[(&str, f64, f64)] = &[
    ("Yellowstone North", 44.9631, -110.5989),
    ("Yellowstone Central", 44.4280, -110.5885),
    ("Yellowstone South", 44.1350, -110.6663),
    ("Grand Teton", 43.7904, -110.6818),
    ("Olympic National Forest", 47.8021, -123.6044),
    ("Yosemite Valley", 37.7456, -119.5936),
    ("Glacier National Park", 48.7596, -113.7870),
    ("Everglades", 25.2866, -80.8987),
    ("Great Smoky Mountains", 35.6131, -83.5532),
];

/// Built-in monitoring locations.
pub fn builtin_locations() -> Vec<Location> {
    BUILTIN
        .iter()
        .map(|&(name, latitude, longitude)| Location {
            name: name.to_string(),
            latitude,
            longitude,
        })
        .collect()
}

/// Merge built-in locations with user-defined ones.
///
/// A configured location with the same name (case-insensitive) replaces the
/// built-in one; new names are appended in alphabetical order.
pub fn all_locations(configured: &BTreeMap<String, Coordinates>) -> Vec<Location> {
    let mut locations = builtin_locations();

    for (name, coords) in configured {
        let location = Location {
            name: name.clone(),
            latitude: coords.latitude,
            longitude: coords.longitude,
        };
        match locations
            .iter_mut()
            .find(|l| l.name.eq_ignore_ascii_case(name))
        {
            Some(existing) => *existing = location,
            None => locations.push(location),
        }
    }

    locations
}

/// Find a location by name (case-insensitive).
pub fn find_location(name: &str, configured: &BTreeMap<String, Coordinates>) -> Result<Location> {
    all_locations(configured)
        .into_iter()
        .find(|l| l.name.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| Error::UnknownLocation {
            name: name.to_string(),
        })
}
