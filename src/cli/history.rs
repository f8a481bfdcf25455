//! `history` subcommand handlers.

#![allow(clippy::print_stdout)]

use crate::cli::{DateRangeArgs, HistoryAction};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::history::{HistoryEntry, HistoryStore, export, export_file_name, filter_by_date};
use crate::output::{TableRow, emit_rows};
use crate::utils::date::now_local;
use crate::utils::format::format_confidence;
use std::io::Write;
use tracing::warn;

impl TableRow for HistoryEntry {
    fn headers() -> &'static [&'static str] {
        &["Timestamp", "Image", "Species", "Confidence", "Count", "Location"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.timestamp.clone(),
            self.image_name.clone(),
            self.species.clone(),
            format_confidence(self.confidence),
            self.count.to_string(),
            self.location_name.clone(),
        ]
    }
}

/// Load history entries inside the requested date range.
pub fn load_filtered(store: &HistoryStore, range: DateRangeArgs) -> Result<Vec<HistoryEntry>> {
    let entries = store.load()?;
    if range.from.is_none() && range.to.is_none() {
        return Ok(entries);
    }
    Ok(filter_by_date(&entries, range.from, range.to))
}

/// Run a `history` action.
pub fn handle_history_command(
    action: HistoryAction,
    store: &HistoryStore,
    config: &Config,
) -> Result<()> {
    match action {
        HistoryAction::List {
            range,
            format,
            limit,
        } => {
            let mut entries = load_filtered(store, range)?;
            if let Some(limit) = limit {
                let skip = entries.len().saturating_sub(limit);
                entries.drain(..skip);
            }
            emit_rows(&entries, format, None)
        }
        HistoryAction::Clear { yes } => {
            let count = match store.load() {
                Ok(entries) => Some(entries.len()),
                Err(Error::HistoryParse { path, source }) => {
                    warn!("Detection history {} is unreadable: {source}", path.display());
                    None
                }
                Err(e) => return Err(e),
            };
            if count == Some(0) {
                println!("Detection history is already empty.");
                return Ok(());
            }

            let question = count.map_or_else(
                || "Detection history is unreadable. Discard it?".to_string(),
                |n| format!("Delete {n} history entries?"),
            );
            if !yes && !confirm(&question)? {
                println!("Cancelled.");
                return Ok(());
            }
            store.clear()?;
            match count {
                Some(n) => println!("Cleared {n} history entries."),
                None => println!("Cleared unreadable detection history."),
            }
            Ok(())
        }
        HistoryAction::Export {
            range,
            format,
            output,
        } => {
            let entries = load_filtered(store, range)?;
            let path = output
                .unwrap_or_else(|| store.dir().join(export_file_name(format, now_local())));
            export(&entries, format, &path, config.output.csv_bom)?;
            println!("Exported {} entries to {}", entries.len(), path.display());
            Ok(())
        }
    }
}

fn confirm(question: &str) -> Result<bool> {
    print!("{question} [y/N]: ");
    std::io::stdout().flush()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::history::query::tests::entry;
    use crate::utils::date::{DayBound, parse_date_arg};
    use tempfile::TempDir;

    #[test]
    fn test_history_entry_cells() {
        let e = entry("2024-06-01 10:00:00", "red fox");
        let cells = e.cells();
        assert_eq!(cells.len(), HistoryEntry::headers().len());
        assert_eq!(cells[3], "80.0%");
        assert_eq!(cells[5], "Unknown");
    }

    #[test]
    fn test_load_filtered() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::open(dir.path()).unwrap();
        store
            .append_entries(vec![
                entry("2024-06-01 10:00:00", "red fox"),
                entry("2024-06-05 10:00:00", "bobcat"),
            ])
            .unwrap();

        assert_eq!(load_filtered(&store, DateRangeArgs::default()).unwrap().len(), 2);

        let range = DateRangeArgs {
            from: Some(parse_date_arg("2024-06-02", DayBound::Start).unwrap()),
            to: None,
        };
        let kept = load_filtered(&store, range).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].species, "bobcat");
    }

    #[test]
    fn test_export_to_explicit_path() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::open(dir.path()).unwrap();
        store
            .append_entries(vec![entry("2024-06-01 10:00:00", "red fox")])
            .unwrap();
        let out = dir.path().join("export.json");

        handle_history_command(
            HistoryAction::Export {
                range: DateRangeArgs::default(),
                format: crate::config::OutputFormat::Json,
                output: Some(out.clone()),
            },
            &store,
            &Config::default(),
        )
        .unwrap();

        let back: Vec<HistoryEntry> =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(back.len(), 1);
    }

    #[test]
    fn test_export_defaults_to_data_dir() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::open(dir.path()).unwrap();
        store
            .append_entries(vec![entry("2024-06-01 10:00:00", "red fox")])
            .unwrap();

        handle_history_command(
            HistoryAction::Export {
                range: DateRangeArgs::default(),
                format: crate::config::OutputFormat::Csv,
                output: None,
            },
            &store,
            &Config::default(),
        )
        .unwrap();

        let exported: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with("detection_export_") && name.ends_with(".csv"))
            .collect();
        assert_eq!(exported.len(), 1);
    }

    #[test]
    fn test_clear_discards_corrupt_history() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::open(dir.path()).unwrap();
        std::fs::write(store.path(), "{not json").unwrap();

        handle_history_command(HistoryAction::Clear { yes: true }, &store, &Config::default())
            .unwrap();

        assert!(store.load().unwrap().is_empty());
    }
}
