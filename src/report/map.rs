//! Map markers for monitoring sites and GeoJSON rendering.

use crate::history::HistoryEntry;
use crate::output::TableRow;
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::HashSet;

/// One map marker per distinct camera position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Popup text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

impl TableRow for MapMarker {
    fn headers() -> &'static [&'static str] {
        &["Latitude", "Longitude", "Info"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.latitude.to_string(),
            self.longitude.to_string(),
            self.info.clone().unwrap_or_default(),
        ]
    }
}

struct Site<'a> {
    latitude: f64,
    longitude: f64,
    species: HashSet<&'a str>,
    detections: u64,
}

/// Build markers from entries that carry coordinates.
///
/// With `include_info` each marker carries `Species: N, Detections: M`.
pub fn markers(entries: &[HistoryEntry], include_info: bool) -> Vec<MapMarker> {
    let mut sites: Vec<Site<'_>> = Vec::new();

    for entry in entries {
        let Some((latitude, longitude)) = entry.coordinates() else {
            continue;
        };
        let idx = match sites
            .iter()
            .position(|s| s.latitude == latitude && s.longitude == longitude)
        {
            Some(idx) => idx,
            None => {
                sites.push(Site {
                    latitude,
                    longitude,
                    species: HashSet::new(),
                    detections: 0,
                });
                sites.len() - 1
            }
        };
        if !entry.is_no_detection() {
            sites[idx].species.insert(&entry.species);
            sites[idx].detections += u64::from(entry.count);
        }
    }

    sites
        .into_iter()
        .map(|site| MapMarker {
            latitude: site.latitude,
            longitude: site.longitude,
            info: include_info.then(|| {
                format!(
                    "Species: {}, Detections: {}",
                    site.species.len(),
                    site.detections
                )
            }),
        })
        .collect()
}

/// Mean position of all markers, or `None` without markers.
#[allow(clippy::cast_precision_loss)]
pub fn center(markers: &[MapMarker]) -> Option<(f64, f64)> {
    if markers.is_empty() {
        return None;
    }
    let n = markers.len() as f64;
    let lat = markers.iter().map(|m| m.latitude).sum::<f64>() / n;
    let lon = markers.iter().map(|m| m.longitude).sum::<f64>() / n;
    Some((lat, lon))
}

/// Render markers as a GeoJSON `FeatureCollection`.
///
/// The map center, when there is one, is stored in the collection's
/// `properties`.
pub fn to_geojson(markers: &[MapMarker]) -> Value {
    let features: Vec<Value> = markers
        .iter()
        .map(|m| {
            let mut properties = serde_json::Map::new();
            if let Some(info) = &m.info {
                properties.insert("info".to_string(), Value::String(info.clone()));
            }
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [m.longitude, m.latitude],
                },
                "properties": properties,
            })
        })
        .collect();

    let mut collection = json!({
        "type": "FeatureCollection",
        "features": features,
    });
    if let Some((lat, lon)) = center(markers) {
        collection["properties"] = json!({ "center": [lon, lat] });
    }
    collection
}
