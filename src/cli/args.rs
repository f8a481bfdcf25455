//! CLI argument definitions.

use crate::cli::validators::{
    parse_confidence, parse_from_date, parse_latitude, parse_longitude, parse_max_dimension,
    parse_to_date,
};
use crate::config::{DetectorBackend, OutputFormat};
use crate::output::ReportFormat;
use chrono::NaiveDateTime;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Camera-trap species detection and biodiversity reporting.
#[derive(Debug, Parser)]
#[command(name = "biowatch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Images or directories to analyze.
    pub inputs: Vec<PathBuf>,

    /// Common options for analysis.
    #[command(flatten)]
    pub analyze: AnalyzeArgs,

    /// Configuration file (default: platform config directory).
    #[arg(long, global = true, env = "BIOWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the detection history.
    #[arg(long, global = true, env = "BIOWATCH_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Suppress progress and informational output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase verbosity (-v: debug, -vv: trace+ORT info, -vvv: full trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inspect, clear or export the detection history.
    History {
        /// History action to perform.
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Aggregate the detection history into a report.
    Report {
        /// Report to build.
        #[arg(value_enum)]
        kind: ReportKind,
        /// Date filter.
        #[command(flatten)]
        range: DateRangeArgs,
        /// Output format.
        #[arg(short, long, value_enum, default_value_t)]
        format: ReportFormat,
        /// Write to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Leave popup text off map markers.
        #[arg(long)]
        no_info: bool,
    },
    /// List monitoring locations.
    Locations {
        /// Output format.
        #[arg(short, long, value_enum, default_value_t)]
        format: ReportFormat,
    },
    /// Browse the species catalogue.
    Species {
        /// Species action to perform.
        #[command(subcommand)]
        action: SpeciesAction,
    },
    /// Show image properties and EXIF data.
    Metadata {
        /// Image file.
        image: PathBuf,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Manage configuration.
    Config {
        /// Configuration action to perform.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Inclusive date filter shared by history and report commands.
#[derive(Debug, Clone, Copy, Default, Args)]
pub struct DateRangeArgs {
    /// First day to include (YYYY-MM-DD or YYYY-MM-DD HH:MM:SS).
    #[arg(long, value_parser = parse_from_date)]
    pub from: Option<NaiveDateTime>,

    /// Last day to include (YYYY-MM-DD or YYYY-MM-DD HH:MM:SS).
    #[arg(long, value_parser = parse_to_date)]
    pub to: Option<NaiveDateTime>,
}

/// History subcommand actions.
#[derive(Debug, Subcommand)]
pub enum HistoryAction {
    /// Print history entries.
    List {
        /// Date filter.
        #[command(flatten)]
        range: DateRangeArgs,
        /// Output format.
        #[arg(short, long, value_enum, default_value_t)]
        format: ReportFormat,
        /// Show only the newest N entries.
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Remove every history entry.
    Clear {
        /// Do not ask for confirmation.
        #[arg(short, long)]
        yes: bool,
    },
    /// Export history entries to CSV or JSON.
    Export {
        /// Date filter.
        #[command(flatten)]
        range: DateRangeArgs,
        /// Export format.
        #[arg(short, long, value_enum, default_value = "csv")]
        format: OutputFormat,
        /// Output file (default: detection_export_<timestamp>.<ext>).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Report kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
    /// Species, animal and image totals.
    Dashboard,
    /// Per-species totals and mean confidence.
    Species,
    /// Per-site totals.
    Locations,
    /// Per-day totals.
    Timeline,
    /// Individuals per species.
    Distribution,
    /// Daily individuals per species.
    Trends,
    /// Detection events per confidence range.
    Confidence,
    /// Distinct species per location.
    Richness,
    /// Site markers (GeoJSON with --format json).
    Map,
}

/// Species subcommand actions.
#[derive(Debug, Subcommand)]
pub enum SpeciesAction {
    /// List catalogued species.
    List {
        /// Output format.
        #[arg(short, long, value_enum, default_value_t)]
        format: ReportFormat,
    },
    /// Show details for one species.
    Info {
        /// Common or scientific name.
        name: String,
    },
}

/// Config subcommand actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Create default configuration file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Display current configuration.
    Show,
    /// Print configuration file path.
    Path,
}

/// Arguments for analyzing images.
#[derive(Debug, Args)]
#[allow(clippy::struct_excessive_bools)]
pub struct AnalyzeArgs {
    /// Named monitoring location (see `biowatch locations`).
    #[arg(short, long, env = "BIOWATCH_LOCATION", conflicts_with_all = ["lat", "lon"])]
    pub location: Option<String>,

    /// Camera latitude (-90.0 to 90.0).
    #[arg(long, value_parser = parse_latitude, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Camera longitude (-180.0 to 180.0).
    #[arg(long, value_parser = parse_longitude, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Name recorded with --lat/--lon (default: "Custom").
    #[arg(long)]
    pub location_name: Option<String>,

    /// Minimum confidence threshold (0.0-1.0).
    #[arg(short = 'c', long, value_parser = parse_confidence, env = "BIOWATCH_MIN_CONFIDENCE")]
    pub min_confidence: Option<f32>,

    /// Result formats (comma-separated: csv,json).
    #[arg(short, long, value_enum, value_delimiter = ',', env = "BIOWATCH_FORMAT")]
    pub format: Option<Vec<OutputFormat>>,

    /// Output directory (default: same as input).
    #[arg(short, long, env = "BIOWATCH_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Largest image side kept after preprocessing.
    #[arg(long, value_parser = parse_max_dimension)]
    pub max_dimension: Option<u32>,

    /// Enhance contrast before detection.
    #[arg(long)]
    pub enhance: bool,

    /// Write thumbnails next to the results.
    #[arg(long)]
    pub thumbnails: bool,

    /// Do not write annotated images.
    #[arg(long)]
    pub no_annotate: bool,

    /// Detector backend (overrides config).
    #[arg(long, value_enum, env = "BIOWATCH_BACKEND")]
    pub backend: Option<DetectorBackend>,

    /// Seed for the simulated detector.
    #[arg(long, env = "BIOWATCH_SEED")]
    pub seed: Option<u64>,

    /// Species allow-list file, one species per line.
    #[arg(long, env = "BIOWATCH_SPECIES_LIST")]
    pub slist: Option<PathBuf>,

    /// Reprocess images even if outputs exist.
    #[arg(long)]
    pub force: bool,

    /// Stop on first error.
    #[arg(long)]
    pub fail_fast: bool,

    /// Hide the progress bar.
    #[arg(long)]
    pub no_progress: bool,

    /// Write CSV files without the UTF-8 byte order mark.
    #[arg(long)]
    pub no_csv_bom: bool,
}
