//! CLI argument parsing and command handling.

mod args;
pub mod help;
pub mod history;
pub mod report;
pub mod species;
mod validators;

pub use args::{
    AnalyzeArgs, Cli, Command, ConfigAction, DateRangeArgs, HistoryAction, ReportKind,
    SpeciesAction,
};
