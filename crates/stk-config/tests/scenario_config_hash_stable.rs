//! Scenario: config hash stability
//!
//! # Invariants under test
//! - Same inputs give the same hash and canonical JSON.
//! - Key order inside a document does not affect the hash.
//! - A changed value changes the hash.
//! - Loading from files equals loading the same text from strings.

use std::io::Write;

use stk_config::{load_layered_yaml, load_layered_yaml_from_strings};

const BASE_YAML: &str = r#"
cluster:
  name: "mainnet-beta"
matcher:
  batch_size: 100
accounts:
  seed_scan_range: 20
  sort: "seed"
feeds:
  scores:
    token_env: "VALIDATORS_APP_TOKEN"
"#;

const BASE_YAML_REORDERED: &str = r#"
feeds:
  scores:
    token_env: "VALIDATORS_APP_TOKEN"
accounts:
  sort: "seed"
  seed_scan_range: 20
matcher:
  batch_size: 100
cluster:
  name: "mainnet-beta"
"#;

const OVERLAY_YAML: &str = r#"
cluster:
  name: "devnet"
accounts:
  sort: "balance"
"#;

#[test]
fn same_input_produces_identical_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    assert_eq!(a.config_hash, b.config_hash);
    assert_eq!(a.canonical_json, b.canonical_json);
    assert_eq!(a.config_hash.len(), 64, "sha256 hex");
}

#[test]
fn key_order_does_not_change_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML_REORDERED]).unwrap();
    assert_eq!(a.config_hash, b.config_hash);
}

#[test]
fn overlay_changes_hash_and_typed_view() {
    let base = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let layered = load_layered_yaml_from_strings(&[BASE_YAML, OVERLAY_YAML]).unwrap();
    assert_ne!(base.config_hash, layered.config_hash);

    let cfg = layered.stake().unwrap();
    assert_eq!(cfg.cluster.name.as_str(), "devnet");
    assert_eq!(cfg.accounts.sort, stk_config::SortKey::Balance);
    assert_eq!(cfg.accounts.seed_scan_range, 20);
}

#[test]
fn file_layers_match_string_layers() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("base.yaml");
    let overlay = dir.path().join("overlay.yaml");
    std::fs::File::create(&base)
        .unwrap()
        .write_all(BASE_YAML.as_bytes())
        .unwrap();
    std::fs::File::create(&overlay)
        .unwrap()
        .write_all(OVERLAY_YAML.as_bytes())
        .unwrap();

    let from_files = load_layered_yaml(&[&base, &overlay]).unwrap();
    let from_strings = load_layered_yaml_from_strings(&[BASE_YAML, OVERLAY_YAML]).unwrap();
    assert_eq!(from_files.config_hash, from_strings.config_hash);

    let missing = dir.path().join("missing.yaml");
    let err = load_layered_yaml(&[&missing]).unwrap_err();
    assert!(err.to_string().contains("failed to read yaml path"));
}
