//! `report` subcommand handler.

use crate::cli::ReportKind;
use crate::error::{Error, Result};
use crate::history::{HistoryEntry, date_range};
use crate::output::{ReportFormat, emit_rows, write_json_pretty, write_stdout};
use crate::report::{
    self, confidence_distribution, dashboard_metrics, detection_trends, location_richness,
    location_summary, species_distribution, species_summary, timeline,
};
use crate::utils::date::format_timestamp;
use std::path::Path;
use tracing::info;

/// Build and emit one report over `entries`.
pub fn run_report(
    kind: ReportKind,
    entries: &[HistoryEntry],
    format: ReportFormat,
    output: Option<&Path>,
    include_info: bool,
) -> Result<()> {
    if !entries.is_empty() {
        let (first, last) = date_range(entries);
        info!(
            "Report over {} entries from {} to {}",
            entries.len(),
            format_timestamp(&first),
            format_timestamp(&last)
        );
    }

    match kind {
        ReportKind::Dashboard => emit_rows(&[dashboard_metrics(entries)], format, output),
        ReportKind::Species => emit_rows(&species_summary(entries), format, output),
        ReportKind::Locations => emit_rows(&location_summary(entries), format, output),
        ReportKind::Timeline => emit_rows(&timeline(entries), format, output),
        ReportKind::Distribution => emit_rows(&species_distribution(entries), format, output),
        ReportKind::Trends => emit_rows(&detection_trends(entries), format, output),
        ReportKind::Confidence => emit_rows(&confidence_distribution(entries), format, output),
        ReportKind::Richness => emit_rows(&location_richness(entries), format, output),
        ReportKind::Map => {
            let markers = report::map::markers(entries, include_info);
            if format != ReportFormat::Json {
                return emit_rows(&markers, format, output);
            }
            let geojson = report::map::to_geojson(&markers);
            match output {
                Some(path) => write_json_pretty(path, &geojson),
                None => {
                    let text =
                        serde_json::to_string_pretty(&geojson).map_err(|e| Error::Internal {
                            message: format!("failed to serialize map: {e}"),
                        })?;
                    write_stdout(&format!("{text}\n"))
                }
            }
        }
    }
}
