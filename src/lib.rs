//! BioWatch - camera-trap species detection CLI tool.
//!
//! This crate analyzes camera-trap images, keeps a detection history and
//! turns it into biodiversity reports.

#![warn(missing_docs)]

pub mod catalog;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod history;
pub mod imaging;
pub mod inference;
pub mod locking;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod utils;

use catalog::{Location, find_location};
use clap::Parser;
use cli::{AnalyzeArgs, Cli, Command, SpeciesAction};
use config::{
    Config, load_config, resolve_config_path, resolve_data_dir, save_config, validate_config,
};
use constants::CUSTOM_LOCATION_NAME;
use history::HistoryStore;
use inference::{SpeciesFilter, build_detector};
use pipeline::{
    ProcessCheck, ProcessOptions, ProcessResult, collect_input_files, output_dir_for,
    process_file, should_process,
};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use utils::format::format_confidence;

pub use error::{Error, Result};

/// Main entry point for biowatch CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    // Remove lock files of in-flight images on Ctrl+C
    if let Err(e) = ctrlc::set_handler(|| {
        locking::cleanup_all_locks();
        std::process::exit(130); // 128 + SIGINT(2)
    }) {
        warn!("Failed to install Ctrl+C handler: {e}");
    }

    let config = load_config(cli.config.as_deref())?;
    validate_config(&config)?;

    if let Some(command) = cli.command {
        return handle_command(command, &config, cli.config.as_deref(), cli.data_dir.as_deref());
    }

    if cli.inputs.is_empty() {
        let config_exists = resolve_config_path(cli.config.as_deref()).is_ok_and(|p| p.exists());
        cli::help::print_smart_help(&config, config_exists);
        return Ok(());
    }

    let data_dir = resolve_data_dir(cli.data_dir.as_deref(), config.storage.data_dir.as_deref())?;
    analyze_files(&cli.inputs, &cli.analyze, &config, &data_dir, cli.quiet)
}

/// Location given on the command line, if any.
fn explicit_location(args: &AnalyzeArgs, config: &Config) -> Result<Option<Location>> {
    if let (Some(lat), Some(lon)) = (args.lat, args.lon) {
        let name = args
            .location_name
            .clone()
            .unwrap_or_else(|| CUSTOM_LOCATION_NAME.to_string());
        return Location::new(name, lat, lon).map(Some);
    }
    args.location
        .as_deref()
        .map(|name| find_location(name, &config.locations))
        .transpose()
}

/// Merge command-line arguments over configured defaults.
fn build_process_options(args: &AnalyzeArgs, config: &Config) -> Result<ProcessOptions> {
    let defaults = &config.defaults;

    let species_filter = match args.slist.as_ref().or(defaults.species_list_file.as_ref()) {
        Some(path) => {
            info!("Loading species list: {}", path.display());
            let filter = SpeciesFilter::new(utils::species_list::read_species_list(path)?);
            info!("Species list filter enabled: {} species loaded", filter.len());
            Some(filter)
        }
        None => None,
    };

    let default_location = defaults
        .location
        .as_deref()
        .map(|name| find_location(name, &config.locations))
        .transpose()?;

    Ok(ProcessOptions {
        output_dir: args.output_dir.clone(),
        formats: args
            .format
            .clone()
            .unwrap_or_else(|| defaults.formats.clone()),
        force: args.force,
        min_confidence: args.min_confidence.unwrap_or(defaults.min_confidence),
        max_dimension: args.max_dimension.unwrap_or(defaults.max_dimension),
        enhance: args.enhance || defaults.enhance,
        annotate: defaults.annotate && !args.no_annotate,
        thumbnails: args.thumbnails || defaults.thumbnails,
        csv_bom: config.output.csv_bom && !args.no_csv_bom,
        species_filter,
        location: explicit_location(args, config)?,
        default_location,
    })
}

/// One stdout line summarising an analysed image.
fn summary_line(file: &Path, result: &ProcessResult) -> String {
    let name = file
        .file_name()
        .map_or_else(|| file.display().to_string(), |n| n.to_string_lossy().into_owned());
    let found: Vec<String> = result
        .detections
        .iter()
        .map(|d| {
            if d.is_no_detection() {
                d.species.clone()
            } else {
                format!("{} ({})", d.species, format_confidence(d.confidence))
            }
        })
        .collect();
    format!("{name}: {}", found.join(", "))
}

/// Analyze input images with the given options.
fn analyze_files(
    inputs: &[PathBuf],
    args: &AnalyzeArgs,
    config: &Config,
    data_dir: &Path,
    quiet: bool,
) -> Result<()> {
    use crate::output::progress;
    use std::time::Instant;

    let total_start = Instant::now();

    let files = collect_input_files(inputs)?;
    if files.is_empty() {
        return Err(Error::NoValidImageFiles);
    }

    info!("Found {} image(s) to process", files.len());

    let options = build_process_options(args, config)?;
    if let Some(location) = &options.location {
        info!(
            "Location: {} ({:.4}, {:.4})",
            location.name, location.latitude, location.longitude
        );
    }

    let mut detector_config = config.detector.clone();
    if let Some(backend) = args.backend {
        detector_config.backend = backend;
    }
    if args.seed.is_some() {
        detector_config.seed = args.seed;
    }
    let detector = build_detector(&detector_config)?;

    let history = HistoryStore::open(data_dir)?;
    info!("Detection history: {}", history.path().display());
    let existing = history.load()?;
    debug!("Detection history holds {} entries", existing.len());

    let progress_enabled = !quiet && !args.no_progress;
    let file_progress = progress::create_file_progress(files.len(), progress_enabled);

    let mut processed = 0;
    let mut skipped = 0;
    let mut errors = 0;
    let mut total_detections = 0;
    let mut summaries = Vec::new();

    for file in &files {
        let file_output_dir = output_dir_for(file, options.output_dir.as_deref());

        match should_process(file, &file_output_dir, &options) {
            ProcessCheck::SkipExists => {
                info!("Skipping (output exists): {}", file.display());
                skipped += 1;
                progress::inc_progress(file_progress.as_ref());
                continue;
            }
            ProcessCheck::SkipLocked => {
                info!("Skipping (locked): {}", file.display());
                skipped += 1;
                progress::inc_progress(file_progress.as_ref());
                continue;
            }
            ProcessCheck::Process => {}
        }

        progress::set_progress_message(
            file_progress.as_ref(),
            &file.file_name().unwrap_or_default().to_string_lossy(),
        );

        match process_file(file, &file_output_dir, detector.as_ref(), &history, &options) {
            Ok(result) => {
                processed += 1;
                total_detections += result.species_detections();
                summaries.push(summary_line(file, &result));
            }
            Err(e) => {
                error!("Failed to process {}: {}", file.display(), e);
                errors += 1;
                if args.fail_fast {
                    progress::finish_progress(file_progress, "Failed");
                    return Err(e);
                }
            }
        }
        progress::inc_progress(file_progress.as_ref());
    }

    progress::finish_progress(file_progress, "Complete");

    if !quiet && !summaries.is_empty() {
        output::write_stdout(&format!("{}\n", summaries.join("\n")))?;
    }

    let total_duration = total_start.elapsed().as_secs_f64();
    info!(
        "Complete: {} processed, {} skipped, {} errors, {} total detections in {:.2}s",
        processed, skipped, errors, total_detections, total_duration
    );

    if errors > 0 {
        warn!("{} image(s) had errors", errors);
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    // ORT logging stays off unless asked for with -v.
    let filter_str = if quiet {
        "warn,ort=off".to_string()
    } else {
        match verbose {
            0 => "info,ort=off".to_string(),
            1 => "debug,ort=warn".to_string(),
            2 => "trace,ort=info".to_string(),
            _ => "trace".to_string(),
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_command(
    command: Command,
    config: &Config,
    config_path: Option<&Path>,
    data_dir: Option<&Path>,
) -> Result<()> {
    let open_history = || -> Result<HistoryStore> {
        let dir = resolve_data_dir(data_dir, config.storage.data_dir.as_deref())?;
        HistoryStore::open(&dir)
    };

    match command {
        Command::History { action } => {
            cli::history::handle_history_command(action, &open_history()?, config)
        }
        Command::Report {
            kind,
            range,
            format,
            output,
            no_info,
        } => {
            let entries = cli::history::load_filtered(&open_history()?, range)?;
            cli::report::run_report(kind, &entries, format, output.as_deref(), !no_info)
        }
        Command::Locations { format } => cli::species::list_locations(&config.locations, format),
        Command::Species { action } => match action {
            SpeciesAction::List { format } => cli::species::list_species(format),
            SpeciesAction::Info { name } => cli::species::show_species(&name),
        },
        Command::Metadata { image, json } => cli::species::show_metadata(&image, json),
        Command::Config { action } => handle_config_command(action, config, config_path),
    }
}

#[allow(clippy::print_stdout)]
fn handle_config_command(
    action: cli::ConfigAction,
    config: &Config,
    config_path: Option<&Path>,
) -> Result<()> {
    use cli::ConfigAction;

    let path = resolve_config_path(config_path)?;
    match action {
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                println!("Configuration file already exists: {}", path.display());
                println!("Use --force to overwrite it with defaults.");
            } else {
                save_config(&Config::default(), &path)?;
                println!("Created configuration file: {}", path.display());
            }
            Ok(())
        }
        ConfigAction::Show => {
            let text =
                toml::to_string_pretty(config).map_err(|e| Error::ConfigSerialize { source: e })?;
            output::write_stdout(&text)
        }
        ConfigAction::Path => {
            println!("{}", path.display());
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> AnalyzeArgs {
        let mut argv = vec!["biowatch", "a.jpg"];
        argv.extend_from_slice(extra);
        Cli::try_parse_from(argv).unwrap().analyze
    }

    #[test]
    fn test_explicit_location_from_coordinates() {
        let location =
            explicit_location(&args(&["--lat", "44.1", "--lon", "-110.6"]), &Config::default())
                .unwrap()
                .unwrap();
        assert_eq!(location.name, CUSTOM_LOCATION_NAME);

        let named = explicit_location(
            &args(&["--lat", "44.1", "--lon", "-110.6", "--location-name", "Ridge"]),
            &Config::default(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(named.name, "Ridge");
    }

    #[test]
    fn test_explicit_location_by_name() {
        let location = explicit_location(&args(&["--location", "everglades"]), &Config::default())
            .unwrap()
            .unwrap();
        assert_eq!(location.name, "Everglades");

        assert!(matches!(
            explicit_location(&args(&["--location", "Atlantis"]), &Config::default()),
            Err(Error::UnknownLocation { .. })
        ));
        assert!(explicit_location(&args(&[]), &Config::default()).unwrap().is_none());
    }

    #[test]
    fn test_build_process_options_merges_defaults() {
        let mut config = Config::default();
        config.defaults.thumbnails = true;
        config.defaults.location = Some("Grand Teton".to_string());

        let options =
            build_process_options(&args(&["-c", "0.7", "--no-annotate"]), &config).unwrap();
        assert!((options.min_confidence - 0.7).abs() < f32::EPSILON);
        assert!(!options.annotate);
        assert!(options.thumbnails);
        assert_eq!(options.default_location.unwrap().name, "Grand Teton");
        assert!(options.location.is_none());
    }
}
