//! Integration tests for loading the engine configuration from disk

use std::fs;

use muban::util::config::EngineConfig;
use muban::util::logger::LogLevel;
use tempfile::TempDir;

#[test]
fn test_compilation_from_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("muban.toml");
    fs::write(
        &path,
        "[symbols]\neager_constraint_resolution = true\n\n[logging]\nlevel = \"warn\"\n",
    )
    .unwrap();

    let c = muban::compilation_from_config_file(&path).unwrap();
    assert!(c.config().symbols.eager_constraint_resolution);
    assert_eq!(c.config().logging.level, LogLevel::Warn);
}

#[test]
fn test_missing_config_file_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let c = muban::compilation_from_config_file(&temp_dir.path().join("absent.toml")).unwrap();
    assert_eq!(*c.config(), EngineConfig::default());
}

#[test]
fn test_invalid_config_file_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.toml");
    fs::write(&path, "[symbols]\neager_constraint_resolution = \"sometimes\"\n").unwrap();

    let err = muban::compilation_from_config_file(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("broken.toml"));
}

#[test]
fn test_config_round_trips_through_toml() {
    let config = EngineConfig::from_toml_str("[logging]\nlevel = \"trace\"").unwrap();
    assert!(!config.symbols.eager_constraint_resolution);
    let text = config.to_toml_string().unwrap();
    assert_eq!(EngineConfig::from_toml_str(&text).unwrap(), config);
}
