//! Integration tests for Settings config loading with layered merge semantics.
//!
//! These tests run without a global config (temp directories only), so the
//! local `.fleettree.toml` is merged directly onto the compiled defaults.

use std::fs;

use tempfile::TempDir;

use fleettree::application::PickerSession;
use fleettree::config::{local_config_path, Settings};
use fleettree::domain::{EntityKind, OrphanPolicy};

#[test]
fn given_local_config_when_load_then_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    let config = r#"
default_kind = "vehicle"

[tree]
orphans = "promote"
"#;
    fs::write(local_config_path(dir.path()), config).unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert_eq!(settings.default_kind, EntityKind::Vehicle);
    assert_eq!(settings.tree.orphans, OrphanPolicy::Promote);
    assert!(settings.tree.expand_roots, "unspecified values inherit defaults");
}

#[test]
fn given_directory_without_config_when_load_then_returns_defaults() {
    let dir = TempDir::new().unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert_eq!(settings.tree.orphans, OrphanPolicy::Drop);
}

#[test]
fn given_invalid_toml_when_load_then_returns_config_error() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "default_kind = [").unwrap();

    let result = Settings::load(Some(dir.path()));

    assert!(result.is_err());
}

#[test]
fn given_unknown_kind_when_from_file_then_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fleettree.toml");
    fs::write(&path, "default_kind = \"trailer\"\n").unwrap();

    assert!(Settings::from_file(&path).is_err());
}

#[test]
fn given_records_path_with_tilde_when_from_file_then_home_is_expanded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fleettree.toml");
    fs::write(&path, "records_file = \"~/fleet/records.json\"\n").unwrap();

    let settings = Settings::from_file(&path).expect("from_file");

    let records = settings.records_file.expect("records_file");
    assert!(!records.to_string_lossy().starts_with('~'));
    assert!(records.ends_with("fleet/records.json"));
}

#[test]
fn given_settings_when_session_created_then_tree_options_are_applied() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fleettree.toml");
    fs::write(&path, "default_kind = \"driver\"\n\n[tree]\nexpand_roots = false\n").unwrap();
    let settings = Settings::from_file(&path).expect("from_file");

    let session = PickerSession::from_settings(&settings);

    assert_eq!(session.active_kind(), EntityKind::Driver);
    assert!(session.expansion().is_empty());
}

#[test]
fn given_effective_settings_when_rendered_then_toml_reloads_identically() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fleettree.toml");
    let original = Settings {
        records_file: Some(dir.path().join("records.json")),
        default_kind: EntityKind::Vehicle,
        ..Settings::default()
    };
    fs::write(&path, original.to_toml().expect("to_toml")).unwrap();

    let reloaded = Settings::from_file(&path).expect("from_file");

    assert_eq!(reloaded, original);
}
