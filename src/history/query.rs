//! Date filtering over history entries.

use crate::history::HistoryEntry;
use crate::utils::date::{now_local, start_of_month};
use chrono::NaiveDateTime;
use tracing::warn;

/// Keep entries whose timestamp lies in `[start, end]`.
///
/// A missing bound is open. Entries with unparsable timestamps are skipped.
pub fn filter_by_date(
    entries: &[HistoryEntry],
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> Vec<HistoryEntry> {
    let mut skipped = 0usize;
    let filtered = entries
        .iter()
        .filter(|entry| {
            let Some(ts) = entry.parsed_timestamp() else {
                skipped += 1;
                return false;
            };
            start.is_none_or(|s| ts >= s) && end.is_none_or(|e| ts <= e)
        })
        .cloned()
        .collect();

    if skipped > 0 {
        warn!("Skipped {skipped} history entries with unreadable timestamps");
    }
    filtered
}

/// Earliest and latest timestamps in the history.
///
/// An empty history yields the current month so far.
pub fn date_range(entries: &[HistoryEntry]) -> (NaiveDateTime, NaiveDateTime) {
    let mut timestamps = entries.iter().filter_map(HistoryEntry::parsed_timestamp);

    match timestamps.next() {
        Some(first) => timestamps.fold((first, first), |(lo, hi), ts| (lo.min(ts), hi.max(ts))),
        None => {
            let now = now_local();
            (start_of_month(now), now)
        }
    }
}
