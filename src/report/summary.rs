//! Tabular summaries over detection history.

use crate::history::HistoryEntry;
use crate::output::TableRow;
use crate::utils::format::format_confidence;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardMetrics {
    /// Distinct species detected.
    pub species_detected: usize,
    /// Sum of individual counts.
    pub total_animals: u64,
    /// Distinct images analysed, including empty ones.
    pub images_analyzed: usize,
}

impl TableRow for DashboardMetrics {
    fn headers() -> &'static [&'static str] {
        &[
            "Total Species Detected",
            "Total Animal Detections",
            "Analyzed Images",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.species_detected.to_string(),
            self.total_animals.to_string(),
            self.images_analyzed.to_string(),
        ]
    }
}

/// Compute dashboard metrics.
pub fn dashboard_metrics(entries: &[HistoryEntry]) -> DashboardMetrics {
    let species: HashSet<&str> = species_entries(entries).map(|e| e.species.as_str()).collect();
    let images: HashSet<&str> = entries.iter().map(|e| e.image_name.as_str()).collect();

    DashboardMetrics {
        species_detected: species.len(),
        total_animals: species_entries(entries).map(|e| u64::from(e.count)).sum(),
        images_analyzed: images.len(),
    }
}

/// Per-species totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeciesSummary {
    /// Species common name.
    pub species: String,
    /// Sum of individual counts.
    pub total_count: u64,
    /// Mean confidence over detection events.
    pub avg_confidence: f64,
    /// Number of history entries.
    pub detection_events: usize,
}

impl TableRow for SpeciesSummary {
    fn headers() -> &'static [&'static str] {
        &["Species", "Total Count", "Avg. Confidence", "Detection Events"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.species.clone(),
            self.total_count.to_string(),
            format_confidence(self.avg_confidence),
            self.detection_events.to_string(),
        ]
    }
}

/// Summarise detections per species, sorted by species name.
#[allow(clippy::cast_precision_loss)]
pub fn species_summary(entries: &[HistoryEntry]) -> Vec<SpeciesSummary> {
    let mut groups: BTreeMap<&str, (u64, f64, usize)> = BTreeMap::new();
    for entry in species_entries(entries) {
        let group = groups.entry(&entry.species).or_default();
        group.0 += u64::from(entry.count);
        group.1 += entry.confidence;
        group.2 += 1;
    }

    groups
        .into_iter()
        .map(|(species, (total, conf_sum, events))| SpeciesSummary {
            species: species.to_string(),
            total_count: total,
            avg_confidence: conf_sum / events as f64,
            detection_events: events,
        })
        .collect()
}

/// Per-site totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationSummary {
    /// Location name.
    pub location_name: String,
    /// Latitude, when recorded.
    pub latitude: Option<f64>,
    /// Longitude, when recorded.
    pub longitude: Option<f64>,
    /// Distinct species.
    pub unique_species: usize,
    /// Sum of individual counts.
    pub total_detections: u64,
    /// Distinct images analysed.
    pub images_analyzed: usize,
}

impl TableRow for LocationSummary {
    fn headers() -> &'static [&'static str] {
        &[
            "Location",
            "Latitude",
            "Longitude",
            "Unique Species",
            "Total Detections",
            "Images Analyzed",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.location_name.clone(),
            self.latitude.map(|v| v.to_string()).unwrap_or_default(),
            self.longitude.map(|v| v.to_string()).unwrap_or_default(),
            self.unique_species.to_string(),
            self.total_detections.to_string(),
            self.images_analyzed.to_string(),
        ]
    }
}

#[derive(Default)]
struct SiteGroup<'a> {
    species: HashSet<&'a str>,
    images: HashSet<&'a str>,
    total: u64,
}

/// Summarise detections per (location name, latitude, longitude).
///
/// Rows are sorted by location name, then by coordinates.
pub fn location_summary(entries: &[HistoryEntry]) -> Vec<LocationSummary> {
    let mut groups: Vec<((&str, Option<f64>, Option<f64>), SiteGroup<'_>)> = Vec::new();

    for entry in entries {
        let key = (entry.location_name.as_str(), entry.latitude, entry.longitude);
        let idx = match groups.iter().position(|(k, _)| *k == key) {
            Some(idx) => idx,
            None => {
                groups.push((key, SiteGroup::default()));
                groups.len() - 1
            }
        };
        let group = &mut groups[idx].1;
        group.images.insert(&entry.image_name);
        if !entry.is_no_detection() {
            group.species.insert(&entry.species);
            group.total += u64::from(entry.count);
        }
    }

    let mut rows: Vec<LocationSummary> = groups
        .into_iter()
        .map(|((name, latitude, longitude), group)| LocationSummary {
            location_name: name.to_string(),
            latitude,
            longitude,
            unique_species: group.species.len(),
            total_detections: group.total,
            images_analyzed: group.images.len(),
        })
        .collect();
    rows.sort_by(|a, b| {
        a.location_name
            .cmp(&b.location_name)
            .then(a.latitude.partial_cmp(&b.latitude).unwrap_or(std::cmp::Ordering::Equal))
            .then(a.longitude.partial_cmp(&b.longitude).unwrap_or(std::cmp::Ordering::Equal))
    });
    rows
}

/// Per-day totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineRow {
    /// Calendar date.
    pub date: NaiveDate,
    /// Distinct species.
    pub species_count: usize,
    /// Sum of individual counts.
    pub total_detections: u64,
    /// Distinct images analysed.
    pub images_analyzed: usize,
}

impl TableRow for TimelineRow {
    fn headers() -> &'static [&'static str] {
        &["Date", "Species Count", "Total Detections", "Images Analyzed"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.date.to_string(),
            self.species_count.to_string(),
            self.total_detections.to_string(),
            self.images_analyzed.to_string(),
        ]
    }
}

/// Summarise detections per calendar day, oldest first.
///
/// Entries with unreadable timestamps are left out.
pub fn timeline(entries: &[HistoryEntry]) -> Vec<TimelineRow> {
    let mut days: BTreeMap<NaiveDate, SiteGroup<'_>> = BTreeMap::new();
    for entry in entries {
        let Some(ts) = entry.parsed_timestamp() else {
            continue;
        };
        let day = days.entry(ts.date()).or_default();
        day.images.insert(&entry.image_name);
        if !entry.is_no_detection() {
            day.species.insert(&entry.species);
            day.total += u64::from(entry.count);
        }
    }

    days.into_iter()
        .map(|(date, day)| TimelineRow {
            date,
            species_count: day.species.len(),
            total_detections: day.total,
            images_analyzed: day.images.len(),
        })
        .collect()
}

/// Entries that name an actual species.
pub(crate) fn species_entries(entries: &[HistoryEntry]) -> impl Iterator<Item = &HistoryEntry> {
    entries.iter().filter(|e| !e.is_no_detection())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::constants::NO_DETECTION_LABEL;
    use crate::history::query::tests::entry;

    fn sample() -> Vec<HistoryEntry> {
        let mut a = entry("2024-06-01 08:00:00", "red fox");
        a.image_name = "cam01.jpg".to_string();
        a.count = 2;
        a.confidence = 0.9;

        let mut b = entry("2024-06-01 08:00:00", "bobcat");
        b.image_name = "cam01.jpg".to_string();
        b.confidence = 0.6;

        let mut c = entry("2024-06-02 09:00:00", "red fox");
        c.image_name = "cam02.jpg".to_string();
        c.confidence = 0.7;
        c.location_name = "Everglades".to_string();
        c.latitude = Some(25.2866);
        c.longitude = Some(-80.8987);

        let mut d = entry("2024-06-02 10:00:00", NO_DETECTION_LABEL);
        d.image_name = "cam03.jpg".to_string();
        d.confidence = 0.0;
        d.count = 0;

        vec![a, b, c, d]
    }

    #[test]
    fn test_dashboard_metrics() {
        let metrics = dashboard_metrics(&sample());
        assert_eq!(
            metrics,
            DashboardMetrics {
                species_detected: 2,
                total_animals: 4,
                images_analyzed: 3,
            }
        );
    }

    #[test]
    fn test_species_summary_sorted_and_averaged() {
        let rows = species_summary(&sample());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].species, "bobcat");
        assert_eq!(rows[1].species, "red fox");
        assert_eq!(rows[1].total_count, 3);
        assert_eq!(rows[1].detection_events, 2);
        assert!((rows[1].avg_confidence - 0.8).abs() < 1e-9);
        assert_eq!(rows[1].cells()[2], "80.0%");
    }

    #[test]
    fn test_location_summary_groups_by_site() {
        let rows = location_summary(&sample());
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].location_name, "Everglades");
        assert_eq!(rows[0].latitude, Some(25.2866));
        assert_eq!(rows[0].unique_species, 1);

        let unknown = &rows[1];
        assert_eq!(unknown.location_name, "Unknown");
        assert_eq!(unknown.unique_species, 2);
        assert_eq!(unknown.total_detections, 3);
        assert_eq!(unknown.images_analyzed, 2);
        assert_eq!(unknown.cells()[1], "");
    }

    #[test]
    fn test_zero_coordinates_are_a_site() {
        let mut e = entry("2024-06-01 08:00:00", "raccoon");
        e.latitude = Some(0.0);
        e.longitude = Some(0.0);
        let rows = location_summary(&[e, entry("2024-06-01 08:00:00", "raccoon")]);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_timeline_by_day() {
        let rows = timeline(&sample());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date.to_string(), "2024-06-01");
        assert_eq!(rows[0].species_count, 2);
        assert_eq!(rows[0].total_detections, 3);
        assert_eq!(rows[0].images_analyzed, 1);
        assert_eq!(rows[1].species_count, 1);
        assert_eq!(rows[1].images_analyzed, 2);
    }

    #[test]
    fn test_empty_history() {
        assert_eq!(dashboard_metrics(&[]).images_analyzed, 0);
        assert!(species_summary(&[]).is_empty());
        assert!(location_summary(&[]).is_empty());
        assert!(timeline(&[]).is_empty());
    }
}
