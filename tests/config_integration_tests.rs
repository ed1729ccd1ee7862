//! Integration tests for config loading from fixture files.
//!
//! These tests verify that the config module can parse the sample config file correctly.

use std::fs;
use std::path::{Path, PathBuf};

use cfdi_extract::config::CfdixConfig;

/// Read the sample config file content.
fn read_sample_config() -> String {
    let config_path = Path::new("tests/fixtures/sample_config.toml");
    fs::read_to_string(config_path).expect("Failed to read sample config file")
}

#[test]
fn sample_config_file_exists() {
    let config_path = Path::new("tests/fixtures/sample_config.toml");
    assert!(config_path.exists(), "Sample config file should exist");
}

#[test]
fn sample_config_is_valid_toml() {
    let config_content = read_sample_config();
    let result: Result<toml::Value, _> = toml::from_str(&config_content);
    assert!(result.is_ok(), "Sample config should be valid TOML: {:?}", result.err());
}

#[test]
fn sample_config_has_cfdix_section() {
    let config_content = read_sample_config();
    let value: toml::Value = toml::from_str(&config_content).expect("should parse");

    let table = value.as_table().expect("should be a table");
    assert!(table.contains_key("cfdix"), "Config should have [cfdix] section");

    let cfdix = value.get("cfdix").expect("should have cfdix section");
    assert!(cfdix.get("working_directory").is_some());
    assert!(cfdix.get("verbose").is_some());
}

#[test]
fn sample_config_parses_into_cfdix_config() {
    let config = CfdixConfig::from_toml_str(&read_sample_config()).expect("should parse sample config");

    assert_eq!(
        config.working_directory,
        Some(PathBuf::from("/home/user/Documentos/facturas"))
    );
    assert!(!config.verbose);
}
