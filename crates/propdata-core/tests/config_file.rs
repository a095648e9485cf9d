//! Loading configuration from disk

use propdata_core::builtin::keys::HAS_GRAVITY;
use propdata_core::{ConfigError, DataConfig, DataService};
use propdata_test_utils::plain_entity;
use std::fs;

#[test]
fn service_built_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("propdata.toml");
    fs::write(
        &path,
        "memoize_resolution = false\nintern_immutables = false\nlog_filter = \"debug\"\n",
    )
    .unwrap();

    let config = DataConfig::from_path(&path).unwrap();
    assert_eq!(config.log_filter, "debug");

    let service = DataService::builtin(config).unwrap();
    let entity = plain_entity();
    assert_eq!(service.get(&entity, &HAS_GRAVITY), Some(true));
    assert!(!service.processors().is_memoized());
    assert_eq!(service.cache().table_count(), 0);
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = DataConfig::from_path(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn malformed_file_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "memoize_resolution = \"yes\"\n").unwrap();

    let err = DataConfig::from_path(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}
