//! Chart-style aggregations: distribution, trends, confidence, richness.

use crate::constants::confidence_bins::{EDGES, LABELS};
use crate::history::HistoryEntry;
use crate::output::TableRow;
use crate::report::summary::species_entries;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Summed individuals for one species.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeciesCount {
    /// Species common name.
    pub species: String,
    /// Sum of individual counts.
    pub count: u64,
}

impl TableRow for SpeciesCount {
    fn headers() -> &'static [&'static str] {
        &["Species", "Count"]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.species.clone(), self.count.to_string()]
    }
}

/// Individuals per species, most frequent first.
pub fn species_distribution(entries: &[HistoryEntry]) -> Vec<SpeciesCount> {
    let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
    for entry in species_entries(entries) {
        *totals.entry(&entry.species).or_default() += u64::from(entry.count);
    }

    let mut rows: Vec<SpeciesCount> = totals
        .into_iter()
        .map(|(species, count)| SpeciesCount {
            species: species.to_string(),
            count,
        })
        .collect();
    // Stable sort keeps ties in name order.
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows
}

/// Individuals of one species on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    /// Calendar date.
    pub date: NaiveDate,
    /// Species common name.
    pub species: String,
    /// Sum of individual counts.
    pub count: u64,
}

impl TableRow for TrendPoint {
    fn headers() -> &'static [&'static str] {
        &["Date", "Species", "Count"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.date.to_string(),
            self.species.clone(),
            self.count.to_string(),
        ]
    }
}

/// Daily individuals per species, ordered by date then species.
pub fn detection_trends(entries: &[HistoryEntry]) -> Vec<TrendPoint> {
    let mut points: BTreeMap<(NaiveDate, &str), u64> = BTreeMap::new();
    for entry in species_entries(entries) {
        let Some(ts) = entry.parsed_timestamp() else {
            continue;
        };
        *points.entry((ts.date(), entry.species.as_str())).or_default() += u64::from(entry.count);
    }

    points
        .into_iter()
        .map(|((date, species), count)| TrendPoint {
            date,
            species: species.to_string(),
            count,
        })
        .collect()
}

/// Index of the confidence bin holding `confidence`.
///
/// Bins are right inclusive and the lowest one also holds zero. Values
/// outside `[0, 1]` have no bin.
pub fn confidence_bin(confidence: f64) -> Option<usize> {
    if confidence < 0.0 {
        return None;
    }
    EDGES.iter().position(|&edge| confidence <= f64::from(edge))
}

/// Detection events of one species within one confidence bin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfidenceBinCount {
    /// Bin label, e.g. `75-100%`.
    pub confidence_bin: &'static str,
    /// Species common name.
    pub species: String,
    /// Number of history entries.
    pub count: usize,
}

impl TableRow for ConfidenceBinCount {
    fn headers() -> &'static [&'static str] {
        &["Confidence Range", "Species", "Count"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.confidence_bin.to_string(),
            self.species.clone(),
            self.count.to_string(),
        ]
    }
}

/// Count detection events per confidence bin and species.
///
/// Zero-confidence entries are left out.
pub fn confidence_distribution(entries: &[HistoryEntry]) -> Vec<ConfidenceBinCount> {
    let mut counts: BTreeMap<(usize, &str), usize> = BTreeMap::new();
    for entry in species_entries(entries).filter(|e| e.confidence > 0.0) {
        if let Some(bin) = confidence_bin(entry.confidence) {
            *counts.entry((bin, entry.species.as_str())).or_default() += 1;
        }
    }

    counts
        .into_iter()
        .map(|((bin, species), count)| ConfidenceBinCount {
            confidence_bin: LABELS[bin],
            species: species.to_string(),
            count,
        })
        .collect()
}

/// Distinct species seen at one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationRichness {
    /// Location name.
    pub location_name: String,
    /// Distinct species.
    pub species_count: usize,
}

impl TableRow for LocationRichness {
    fn headers() -> &'static [&'static str] {
        &["Location", "Unique Species"]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.location_name.clone(), self.species_count.to_string()]
    }
}

/// Species richness per location name, sorted by name.
pub fn location_richness(entries: &[HistoryEntry]) -> Vec<LocationRichness> {
    let mut sites: BTreeMap<&str, HashSet<&str>> = BTreeMap::new();
    for entry in entries {
        let species = sites.entry(&entry.location_name).or_default();
        if !entry.is_no_detection() {
            species.insert(&entry.species);
        }
    }

    sites
        .into_iter()
        .map(|(name, species)| LocationRichness {
            location_name: name.to_string(),
            species_count: species.len(),
        })
        .collect()
}
