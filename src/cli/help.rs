//! Help message display for CLI.

#![allow(clippy::print_stdout)]

use crate::config::{Config, DetectorBackend};

/// Print help message based on configuration state.
pub fn print_smart_help(config: &Config, config_exists: bool) {
    if config_exists {
        print_configured_help(config);
    } else {
        print_first_time_help();
    }
}

/// Print a getting-started guide for first-time users.
pub fn print_first_time_help() {
    println!("No configuration found. Get started with BioWatch:");
    println!();
    println!("1. Initialize configuration (optional):");
    println!("   biowatch config init");
    println!();
    println!("2. Analyze camera-trap images:");
    println!("   biowatch traps/ --location \"Grand Teton\"");
    println!("   biowatch IMG_0042.jpg --lat 44.43 --lon -110.59 --enhance");
    println!();
    println!("3. Review what was seen:");
    println!("   biowatch report dashboard");
    println!("   biowatch report species --format csv -o species.csv");
    println!("   biowatch history export --from 2024-06-01");
    println!();
    println!("The default detector is simulated. To use a real classifier set");
    println!("[detector] backend = \"onnx\" with model and labels paths in the config.");
    println!();
    println!("Run 'biowatch -h' for all options.");
}

/// Print brief usage reminder for configured users.
pub fn print_configured_help(config: &Config) {
    println!("Usage: biowatch [IMAGES]... [OPTIONS]");
    println!();
    println!("Example: biowatch traps/ --location Everglades -c 0.6");
    println!();
    if config.detector.backend == DetectorBackend::Simulated {
        println!("Detector: simulated (set [detector] backend = \"onnx\" for a real model)");
    } else {
        println!("Detector: {}", config.detector.backend);
    }
    println!();
    println!("Run 'biowatch -h' for all options or 'biowatch locations' to see monitoring sites.");
}
