//! Output format writers.

pub mod csv;
mod json;
pub mod progress;
mod table;
mod writer;

pub use csv::{CsvWriter, write_csv_records};
pub use json::{
    JsonDetection, JsonResultFile, JsonResultWriter, JsonSettings, JsonSummary, write_json_pretty,
};
pub use table::{ReportFormat, TableRow, emit_rows, render_table, write_stdout};
pub use writer::OutputWriter;
