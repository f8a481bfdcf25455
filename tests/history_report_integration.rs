//! Integration tests for history and report commands.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

const HISTORY: &str = r#"[
  {
    "detection_id": "a1",
    "timestamp": "2024-06-01 08:15:00",
    "image_name": "cam01.jpg",
    "species": "red fox",
    "confidence": 0.91,
    "count": 2,
    "latitude": 43.7904,
    "longitude": -110.6818,
    "location_name": "Grand Teton"
  },
  {
    "detection_id": "a1",
    "timestamp": "2024-06-01 08:15:00",
    "image_name": "cam01.jpg",
    "species": "bobcat",
    "confidence": 0.62,
    "count": 1,
    "latitude": 43.7904,
    "longitude": -110.6818,
    "location_name": "Grand Teton"
  },
  {
    "detection_id": "b2",
    "timestamp": "2024-06-03 21:40:00",
    "image_name": "cam02.jpg",
    "species": "red fox",
    "confidence": 0.71,
    "count": 1,
    "latitude": 25.2866,
    "longitude": -80.8987,
    "location_name": "Everglades"
  },
  {
    "detection_id": "c3",
    "timestamp": "2024-06-04 02:00:00",
    "image_name": "cam03.jpg",
    "species": "No wildlife detected",
    "confidence": 0.0,
    "count": 0,
    "latitude": null,
    "longitude": null,
    "location_name": "Unknown"
  }
]"#;

fn seeded() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    let data = dir.path().join("data");
    std::fs::create_dir_all(&data).expect("mkdir");
    std::fs::write(data.join("detection_history.json"), HISTORY).expect("write history");
    dir
}

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
fn test_history_list_table() {
    let dir = seeded();
    biowatch(&dir)
        .args(["history", "list"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Timestamp"))
        .stdout(predicate::str::contains("Grand Teton"))
        .stdout(predicate::str::contains("91.0%"));
}

#[test]
fn test_history_list_date_filter_and_limit() {
    let dir = seeded();
    biowatch(&dir)
        .args(["history", "list", "--from", "2024-06-02", "--to", "2024-06-03", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cam02.jpg"))
        .stdout(predicate::str::contains("cam01.jpg").not())
        .stdout(predicate::str::contains("cam03.jpg").not());

    biowatch(&dir)
        .args(["history", "list", "-n", "1", "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cam03.jpg"))
        .stdout(predicate::str::contains("cam02.jpg").not());
}

#[test]
fn test_history_export_csv() {
    let dir = seeded();
    let out = dir.path().join("export.csv");
    biowatch(&dir)
        .args(["history", "export", "-o"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 4 entries"));

    let text = std::fs::read_to_string(&out).expect("read export");
    let text = text.trim_start_matches('\u{feff}');
    assert!(text.starts_with("detection_id,timestamp,image_name,species"));
    assert_eq!(text.lines().count(), 5);
}

#[test]
fn test_history_export_default_name() {
    let dir = seeded();
    let data_dir = dir.path().join("data");
    biowatch(&dir)
        .current_dir(dir.path())
        .args(["history", "export", "--format", "json", "--from", "2024-06-03"])
        .assert()
        .success();

    let exported: Vec<_> = std::fs::read_dir(&data_dir)
        .expect("read dir")
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.starts_with("detection_export_") && n.ends_with(".json"))
        .collect();
    assert_eq!(exported.len(), 1);

    let entries: Vec<serde_json::Value> = serde_json::from_str(
        &std::fs::read_to_string(data_dir.join(&exported[0])).expect("read export"),
    )
    .expect("parse export");
    assert_eq!(entries.len(), 2);
}

#[test]
fn test_history_clear() {
    let dir = seeded();
    biowatch(&dir)
        .args(["history", "clear", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared 4 history entries"));

    let text = std::fs::read_to_string(dir.path().join("data/detection_history.json"))
        .expect("read history");
    assert_eq!(text.trim(), "[]");
}

#[test]
fn test_corrupt_history_is_reported() {
    let dir = TempDir::new().expect("temp dir");
    let data = dir.path().join("data");
    std::fs::create_dir_all(&data).expect("mkdir");
    std::fs::write(data.join("detection_history.json"), "{oops").expect("write");

    biowatch(&dir)
        .args(["report", "dashboard"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is corrupt"));

    let text = std::fs::read_to_string(data.join("detection_history.json")).expect("read");
    assert_eq!(text, "{oops");
}

#[test]
fn test_report_dashboard_json() {
    let dir = seeded();
    let output = biowatch(&dir)
        .args(["report", "dashboard", "--format", "json"])
        .output()
        .expect("run");
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).expect("parse json");
    assert_eq!(rows[0]["species_detected"], 2);
    assert_eq!(rows[0]["total_animals"], 4);
    assert_eq!(rows[0]["images_analyzed"], 3);
}

#[test]
fn test_report_species_csv_file() {
    let dir = seeded();
    let out = dir.path().join("species.csv");
    biowatch(&dir)
        .args(["report", "species", "-f", "csv", "-o"])
        .arg(&out)
        .assert()
        .success();

    let text = std::fs::read_to_string(&out).expect("read report");
    assert_eq!(
        text,
        "Species,Total Count,Avg. Confidence,Detection Events\n\
         bobcat,1,62.0%,1\n\
         red fox,3,81.0%,2\n"
    );
}

#[test]
fn test_report_timeline_and_locations() {
    let dir = seeded();
    biowatch(&dir)
        .args(["report", "timeline", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-06-01,2,3,1"))
        .stdout(predicate::str::contains("2024-06-04,0,0,1"));

    biowatch(&dir)
        .args(["report", "locations", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Grand Teton,43.7904,-110.6818,2,3,1"))
        .stdout(predicate::str::contains("Unknown,,,0,0,1"));
}

#[test]
fn test_report_confidence_bins() {
    let dir = seeded();
    biowatch(&dir)
        .args(["report", "confidence", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("50-75%,bobcat,1"))
        .stdout(predicate::str::contains("50-75%,red fox,1"))
        .stdout(predicate::str::contains("75-100%,red fox,1"))
        .stdout(predicate::str::contains("No wildlife").not());
}

#[test]
fn test_report_map_geojson() {
    let dir = seeded();
    let output = biowatch(&dir)
        .args(["report", "map", "--format", "json"])
        .output()
        .expect("run");
    assert!(output.status.success());

    let geo: serde_json::Value = serde_json::from_slice(&output.stdout).expect("parse geojson");
    assert_eq!(geo["type"], "FeatureCollection");
    let features = geo["features"].as_array().expect("features");
    assert_eq!(features.len(), 2);
    assert_eq!(
        features[0]["properties"]["info"],
        "Species: 2, Detections: 3"
    );
}

#[test]
fn test_report_on_empty_history() {
    let dir = TempDir::new().expect("temp dir");
    biowatch(&dir)
        .args(["report", "species"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No records."));
    assert!(dir.path().join("data/detection_history.json").exists());
}

#[test]
fn test_report_rejects_bad_date() {
    let dir = seeded();
    biowatch(&dir)
        .args(["report", "trends", "--from", "yesterday"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid date"));
}
