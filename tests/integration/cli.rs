//! Tests for the `menu-monitor` binary

use std::path::PathBuf;

use assert_cmd::Command;
use menu_monitor::bus::read_event_log;
use menu_monitor::Topic;
use predicates::prelude::*;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Binary with an isolated data directory
fn menu_monitor(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("menu-monitor").expect("binary builds");
    cmd.arg("--data-dir").arg(data_dir.path());
    cmd
}

/// Playing a scenario prints every published event as a JSON line
#[test]
fn test_play_prints_events() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let output = menu_monitor(&dir)
        .arg("play")
        .arg(fixture("hover_replay.json"))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let stdout = String::from_utf8(output).expect("utf8 stdout");
    let topics: Vec<String> = stdout
        .lines()
        .map(|line| {
            let value: serde_json::Value = serde_json::from_str(line).expect("JSON line");
            value["topic"].as_str().unwrap_or_default().to_string()
        })
        .collect();
    assert_eq!(
        topics,
        vec!["menu-open", "menu-close-required", "hide-close-menu"]
    );
}

/// A longer hover override keeps the 3000ms advance from committing
#[test]
fn test_hover_override() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    menu_monitor(&dir)
        .args(["play", "--hover-ms", "5000"])
        .arg(fixture("hover_replay.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("menu-open").not())
        .stdout(predicate::str::contains("hide-close-menu"));
}

/// Events can be mirrored into a JSONL event log
#[test]
fn test_events_out_writes_log() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let log_path = dir.path().join("events.jsonl");
    menu_monitor(&dir)
        .arg("play")
        .arg(fixture("hover_replay.json"))
        .arg("--events-out")
        .arg(&log_path)
        .assert()
        .success();

    let entries = read_event_log(&log_path).expect("log reads back");
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].event.topic, Topic::MenuOpen);
    assert_eq!(entries[0].seq, 1);
    assert_eq!(entries[2].event.topic, Topic::HideCloseMenu);
}

/// Missing scenario files fail with a useful message
#[test]
fn test_missing_scenario_fails() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    menu_monitor(&dir)
        .args(["play", "does-not-exist.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load scenario"));
}

/// The config subcommand writes the default file and prints effective values
#[test]
fn test_config_prints_defaults() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    menu_monitor(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("[monitor]"))
        .stdout(predicate::str::contains("hover_duration_ms = 3000"));

    assert!(dir.path().join("config.toml").exists());
}

/// Values from the config file override defaults
#[test]
fn test_config_file_overrides() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    std::fs::write(
        dir.path().join("config.toml"),
        "[monitor]\nhover_duration_ms = 1200\nfallback_label = \"menu\"\n",
    )
    .expect("write config");

    menu_monitor(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("hover_duration_ms = 1200"))
        .stdout(predicate::str::contains("fallback_label = \"menu\""));
}
