//! Integration tests for catalogue, metadata and config commands.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use image::{ImageFormat, Rgb, RgbImage};
use predicates::prelude::*;
use tempfile::TempDir;

fn biowatch(dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("biowatch");
    cmd.arg("--config")
        .arg(dir.path().join("config.toml"))
        .arg("--data-dir")
        .arg(dir.path().join("data"))
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_locations_lists_builtins_and_configured() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(
        dir.path().join("config.toml"),
        "[locations.\"Back Forty\"]\nlatitude = 51.5\nlongitude = -0.12\n",
    )
    .expect("write config");

    biowatch(&dir)
        .args(["locations", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Location,Latitude,Longitude\n"))
        .stdout(predicate::str::contains("Yellowstone North,44.9631,-110.5989"))
        .stdout(predicate::str::contains("Back Forty,51.5000,-0.1200"));
}

#[test]
fn test_species_list_and_info() {
    let dir = TempDir::new().expect("temp dir");

    biowatch(&dir)
        .args(["species", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("White-tailed Deer"))
        .stdout(predicate::str::contains("Vulpes vulpes"));

    biowatch(&dir)
        .args(["species", "info", "Lynx rufus"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Bobcat"))
        .stdout(predicate::str::contains("Conservation status"));
}

#[test]
fn test_species_info_unknown() {
    let dir = TempDir::new().expect("temp dir");
    biowatch(&dir)
        .args(["species", "info", "dodo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown species: dodo"));
}

#[test]
fn test_metadata_text_and_json() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("frame.png");
    RgbImage::from_pixel(64, 48, Rgb([10, 20, 30]))
        .save_with_format(&path, ImageFormat::Png)
        .expect("write image");

    biowatch(&dir)
        .arg("metadata")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("frame.png"))
        .stdout(predicate::str::contains("64"));

    let output = biowatch(&dir)
        .arg("metadata")
        .arg(&path)
        .arg("--json")
        .output()
        .expect("run");
    assert!(output.status.success());
    let meta: serde_json::Value = serde_json::from_slice(&output.stdout).expect("parse json");
    assert_eq!(meta["width"], 64);
    assert_eq!(meta["height"], 48);
    assert_eq!(meta["format"], "PNG");
}

#[test]
fn test_metadata_missing_file() {
    let dir = TempDir::new().expect("temp dir");
    biowatch(&dir)
        .args(["metadata", "nope.jpg"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("error:"));
}

#[test]
fn test_config_init_show_path() {
    let dir = TempDir::new().expect("temp dir");
    let config = dir.path().join("config.toml");

    biowatch(&dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));

    biowatch(&dir)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));
    assert!(config.exists());

    biowatch(&dir)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    biowatch(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[detector]"))
        .stdout(predicate::str::contains("backend = \"simulated\""));
}

#[test]
fn test_invalid_config_is_rejected() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(
        dir.path().join("config.toml"),
        "[defaults]\nmin_confidence = 1.5\n",
    )
    .expect("write config");

    biowatch(&dir)
        .args(["locations"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("min_confidence must be between"));
}

#[test]
fn test_no_arguments_prints_help() {
    let dir = TempDir::new().expect("temp dir");
    biowatch(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("biowatch"));
}
