//! Integration tests for Assay CLI commands.
//!
//! Uses tempfile for config and keyword-table files.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use assay::cli::{
    Cli, CliError, SourceKind, build_engine, build_source, cmd_ask, cmd_check, load_config,
};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// A config limiting the engine to two hypotheses.
fn create_config(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("assay.json");
    let content = r#"{
        "max_hypotheses": 2,
        "confidence_threshold": 0.7,
        "elimination": { "min_confidence": 0.3, "max_cost": 10.0 }
    }"#;
    std::fs::write(&path, content).unwrap();
    path
}

/// A keyword table answering every query about entropy.
fn create_source_table(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("sources.json");
    let content = r#"{
        "entropy": [
            {
                "content": "Entropy measures the number of microscopic configurations that correspond to the macroscopic state of a thermodynamic system.",
                "source": "https://physics.example.org/entropy",
                "metadata": { "verified": "true" }
            },
            {
                "content": "In an isolated system entropy tends to increase over time, which is the content of the second law of thermodynamics.",
                "source": "https://thermo.example.org/notes",
                "metadata": { "verified": "true" }
            }
        ]
    }"#;
    std::fs::write(&path, content).unwrap();
    path
}

fn parse(args: &[&str]) -> Cli {
    let mut argv = vec!["assay"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

// =============================================================================
// CONFIG
// =============================================================================

#[test]
fn test_load_config_from_file() {
    let dir = create_temp_dir();
    let path = create_config(&dir);

    let config = load_config(Some(&path), None, None).unwrap();
    assert_eq!(config.max_hypotheses, 2);
    assert_eq!(config.max_iterations, 10);
}

#[test]
fn test_flags_override_config_file() {
    let dir = create_temp_dir();
    let path = create_config(&dir);

    let config = load_config(Some(&path), Some(4), Some(0.8)).unwrap();
    assert_eq!(config.max_hypotheses, 4);
    assert!((config.confidence_threshold - 0.8).abs() < 1e-9);
}

#[test]
fn test_missing_config_file_fails() {
    let dir = create_temp_dir();
    let path = dir.path().join("missing.json");

    assert!(matches!(
        load_config(Some(&path), None, None),
        Err(CliError::Config(_))
    ));
}

#[test]
fn test_invalid_config_is_rejected() {
    let dir = create_temp_dir();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, r#"{ "confidence_threshold": 1.5 }"#).unwrap();

    assert!(load_config(Some(&path), None, None).is_err());
}

#[test]
fn test_malformed_source_table_fails() {
    let dir = create_temp_dir();
    let path = dir.path().join("sources.json");
    std::fs::write(&path, "[not a table").unwrap();

    let result = build_source(SourceKind::Static, Some(&path), Duration::from_secs(1));
    assert!(matches!(result, Err(CliError::Source(_))));
}

// =============================================================================
// ASK
// =============================================================================

#[tokio::test]
async fn test_ask_json_with_static_source() {
    let dir = create_temp_dir();
    let config = create_config(&dir);
    let table = create_source_table(&dir);
    let cli = parse(&[
        "--config",
        config.to_str().unwrap(),
        "--source",
        "static",
        "--source-file",
        table.to_str().unwrap(),
        "ask",
        "What is entropy?",
    ]);
    let engine = build_engine(&cli).unwrap();

    let output = cmd_ask(&engine, "What is entropy?", true).await.unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();

    assert_eq!(value["hypotheses"]["total"], 2);
    assert_eq!(value["hypotheses"]["surviving"], 2);
    assert!(value["confidence"].as_f64().unwrap() > 0.7);
    assert_eq!(value["intent"]["category"], "factual");
    assert!(value["decision"].as_str().unwrap().contains("Sources:"));
}

#[tokio::test]
async fn test_ask_text_output() {
    let dir = create_temp_dir();
    let table = create_source_table(&dir);
    let cli = parse(&[
        "--source",
        "static",
        "--source-file",
        table.to_str().unwrap(),
        "ask",
        "What is entropy?",
    ]);
    let engine = build_engine(&cli).unwrap();

    let output = cmd_ask(&engine, "What is entropy?", false).await.unwrap();
    assert!(output.contains("DECISION"));
    assert!(output.contains("physics.example.org"));
    assert!(output.contains("3 total, 3 surviving, 0 eliminated"));
}

#[tokio::test]
async fn test_ask_unknown_topic_eliminates_everything() {
    let dir = create_temp_dir();
    let table = create_source_table(&dir);
    let cli = parse(&["--source", "static", "--source-file", table.to_str().unwrap(), "ask", "x"]);
    let engine = build_engine(&cli).unwrap();

    let output = cmd_ask(&engine, "What is gravity?", false).await.unwrap();
    assert!(output.contains("Unable to reach decision"));
    assert!(output.contains("reason: all_hypotheses_eliminated"));
}

#[tokio::test]
async fn test_ask_rejects_blank_query() {
    let cli = parse(&["ask", "   "]);
    let engine = build_engine(&cli).unwrap();

    assert!(matches!(
        cmd_ask(&engine, "   ", false).await,
        Err(CliError::EmptyQuery)
    ));
}

// =============================================================================
// CHECK
// =============================================================================

#[test]
fn test_check_factual_query() {
    let cli = parse(&["check", "What is entropy?"]);
    let engine = build_engine(&cli).unwrap();

    let output = cmd_check(&engine, "What is entropy?", false).unwrap();
    assert!(output.contains("answerable: yes"));
    assert!(output.contains("encyclopedic"));
}

#[test]
fn test_check_json() {
    let cli = parse(&["check", "hi", "--json"]);
    let engine = build_engine(&cli).unwrap();

    let output = cmd_check(&engine, "hi", true).unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["answerable"], false);
    assert_eq!(value["reason"], "No suitable information sources found");
}
