//! Aggregated reports over detection history.
//!
//! Entries recording an empty image count toward images analysed but
//! never as a species.

mod charts;
pub mod map;
mod summary;

pub use charts::{
    ConfidenceBinCount, LocationRichness, SpeciesCount, TrendPoint, confidence_bin,
    confidence_distribution, detection_trends, location_richness, species_distribution,
};
pub use map::MapMarker;
pub use summary::{
    DashboardMetrics, LocationSummary, SpeciesSummary, TimelineRow, dashboard_metrics,
    location_summary, species_summary, timeline,
};
