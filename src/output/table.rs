//! Report tables: terminal rendering, CSV and JSON emission.

use crate::error::{Error, Result};
use crate::output::csv::write_csv_table;
use crate::output::json::write_json_pretty;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// How a report is emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    /// Aligned text table.
    #[default]
    Table,
    /// CSV with display headers.
    Csv,
    /// JSON array of records.
    Json,
}

/// A report row with display column headers.
pub trait TableRow: Serialize {
    /// Column headers, in display order.
    fn headers() -> &'static [&'static str];

    /// Cell values, in header order.
    fn cells(&self) -> Vec<String>;
}

fn format_line(cells: &[&str], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(c, w)| format!("{c:<w$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// Render rows as an aligned text table.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let rule: Vec<&str> = rule.iter().map(String::as_str).collect();

    let mut out = String::new();
    out.push_str(&format_line(headers, &widths));
    out.push('\n');
    out.push_str(&format_line(&rule, &widths));
    out.push('\n');
    for row in rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push_str(&format_line(&cells, &widths));
        out.push('\n');
    }
    out
}

/// Emit a report in the requested format to a file or stdout.
pub fn emit_rows<R: TableRow>(rows: &[R], format: ReportFormat, output: Option<&Path>) -> Result<()> {
    let headers = R::headers();
    let cells: Vec<Vec<String>> = rows.iter().map(TableRow::cells).collect();

    match (format, output) {
        (ReportFormat::Json, Some(path)) => write_json_pretty(path, rows),
        (ReportFormat::Json, None) => {
            let json = serde_json::to_string_pretty(rows).map_err(|e| Error::Internal {
                message: format!("failed to serialize report: {e}"),
            })?;
            write_stdout(&format!("{json}\n"))
        }
        (ReportFormat::Csv, Some(path)) => {
            let file = std::fs::File::create(path)?;
            write_csv_table(file, headers, &cells).map_err(|e| Error::CsvWrite {
                path: path.to_path_buf(),
                source: e,
            })
        }
        (ReportFormat::Csv, None) => {
            let mut buf = Vec::new();
            write_csv_table(&mut buf, headers, &cells).map_err(|e| Error::CsvWrite {
                path: "<stdout>".into(),
                source: e,
            })?;
            write_stdout(&String::from_utf8_lossy(&buf))
        }
        (ReportFormat::Table, Some(path)) => {
            std::fs::write(path, render_table(headers, &cells))?;
            Ok(())
        }
        (ReportFormat::Table, None) => {
            if rows.is_empty() {
                write_stdout("No records.\n")
            } else {
                write_stdout(&render_table(headers, &cells))
            }
        }
    }
}

/// Write text to stdout, tolerating a closed pipe.
pub fn write_stdout(text: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    match stdout.write_all(text.as_bytes()).and_then(|()| stdout.flush()) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[derive(Serialize)]
    struct Row {
        species: String,
        total: u32,
    }

    impl TableRow for Row {
        fn headers() -> &'static [&'static str] {
            &["Species", "Total Count"]
        }

        fn cells(&self) -> Vec<String> {
            vec![self.species.clone(), self.total.to_string()]
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                species: "red fox".to_string(),
                total: 3,
            },
            Row {
                species: "eastern gray squirrel".to_string(),
                total: 12,
            },
        ]
    }

    #[test]
    fn test_render_table_aligns_columns() {
        let cells: Vec<Vec<String>> = rows().iter().map(TableRow::cells).collect();
        let text = render_table(Row::headers(), &cells);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Species "));
        assert!(lines[1].starts_with("-----"));
        assert_eq!(lines[2].find('3'), lines[0].find("Total"));
    }

    #[test]
    fn test_emit_csv_and_json_files() {
        let dir = TempDir::new().unwrap();
        let csv_path = dir.path().join("r.csv");
        let json_path = dir.path().join("r.json");

        emit_rows(&rows(), ReportFormat::Csv, Some(&csv_path)).unwrap();
        emit_rows(&rows(), ReportFormat::Json, Some(&json_path)).unwrap();

        let csv = std::fs::read_to_string(&csv_path).unwrap();
        assert!(csv.starts_with("Species,Total Count\nred fox,3\n"));

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(json[1]["total"], 12);
    }
}
