//! Unit tests for configuration and graceful degradation
//!
//! Tests:
//! - Root folder priority order (CLI → ENV → TOML → default)
//! - Missing default config file → defaults
//! - Explicitly requested config file must exist
//! - Config source reported for logging after subscriber setup
//! - Derived paths below the root folder
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate FPC_ROOT_FOLDER or FPC_CONFIG are marked with #[serial]
//! to ensure they run sequentially, not in parallel.

use fpc_common::config::{
    find_toml_config, get_default_root_folder, load_toml_config, resolve_root_folder, LoggingConfig, MediaConfig,
    RootFolder, TomlConfig, CONFIG_FILE_ENV, ROOT_FOLDER_ENV,
};
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[test]
fn test_default_root_folder_non_empty() {
    let root = get_default_root_folder();
    assert!(!root.as_os_str().is_empty());
    assert!(root.to_string_lossy().contains("fpc"));
}

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let root = resolve_root_folder(None, ROOT_FOLDER_ENV, &TomlConfig::default());
    assert_eq!(root, get_default_root_folder());
}

#[test]
#[serial]
fn test_resolver_cli_takes_precedence() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/fpc-env-root");
    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/fpc-toml-root")),
        ..Default::default()
    };

    let root = resolve_root_folder(Some(Path::new("/tmp/fpc-cli-root")), ROOT_FOLDER_ENV, &config);
    assert_eq!(root, PathBuf::from("/tmp/fpc-cli-root"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_resolver_env_over_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/fpc-env-root");
    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/fpc-toml-root")),
        ..Default::default()
    };

    let root = resolve_root_folder(None, ROOT_FOLDER_ENV, &config);
    assert_eq!(root, PathBuf::from("/tmp/fpc-env-root"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_resolver_toml_over_default() {
    env::remove_var(ROOT_FOLDER_ENV);
    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/fpc-toml-root")),
        ..Default::default()
    };

    let root = resolve_root_folder(None, ROOT_FOLDER_ENV, &config);
    assert_eq!(root, PathBuf::from("/tmp/fpc-toml-root"));
}

#[test]
fn test_root_folder_layout() {
    let root = RootFolder::new("/data/fpc");

    assert_eq!(root.pointsystem_path(), PathBuf::from("/data/fpc/Pointsystem/pointsystem.json"));
    assert_eq!(root.results_path(), PathBuf::from("/data/fpc/results/analysis_results.json"));
    assert_eq!(root.fingerprints_dir(), PathBuf::from("/data/fpc/Fingerprints"));
}

#[test]
fn test_toml_overrides_layout() {
    let root = RootFolder::new("/data/fpc");
    let config = TomlConfig {
        pointsystem: Some(PathBuf::from("/etc/fpc/weights.json")),
        ..Default::default()
    };

    assert_eq!(config.pointsystem_path(&root), PathBuf::from("/etc/fpc/weights.json"));
    assert_eq!(config.results_path(&root), root.results_path());
    assert_eq!(config.statistics_output(&root), root.results_dir());
}

#[test]
#[serial]
fn test_explicit_missing_config_is_error() {
    env::remove_var(CONFIG_FILE_ENV);
    let temp_dir = TempDir::new().unwrap();

    let err = load_toml_config(Some(&temp_dir.path().join("missing.toml"))).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
}

#[test]
#[serial]
fn test_config_from_env_var() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
root_folder = "/srv/fpc"

[logging]
level = "debug"

[media]
excluded_fields = ["kind"]
"#,
    )
    .unwrap();
    env::set_var(CONFIG_FILE_ENV, &path);

    let config = load_toml_config(None).unwrap();

    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/fpc")));
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.media.excluded_fields, vec!["kind".to_string()]);
    // Unspecified fields keep defaults
    assert_eq!(config.media.attribute, "Media Devices");
    assert_eq!(config.media.tracked_fields, MediaConfig::default().tracked_fields);

    env::remove_var(CONFIG_FILE_ENV);
}

#[test]
#[serial]
fn test_find_config_reports_source() {
    env::remove_var(CONFIG_FILE_ENV);
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "[logging]\nlevel = \"warn\"\n").unwrap();

    let loaded = find_toml_config(Some(&path)).unwrap();

    assert_eq!(loaded.source.as_deref(), Some(path.as_path()));
    assert_eq!(loaded.config.logging.level, "warn");
}

#[test]
#[serial]
fn test_find_config_env_var_source() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("env.toml");
    std::fs::write(&path, "root_folder = \"/srv/fpc\"\n").unwrap();
    env::set_var(CONFIG_FILE_ENV, &path);

    let loaded = find_toml_config(None).unwrap();

    assert_eq!(loaded.source, Some(path));
    assert_eq!(loaded.config.root_folder, Some(PathBuf::from("/srv/fpc")));

    env::remove_var(CONFIG_FILE_ENV);
}

#[test]
#[serial]
fn test_malformed_config_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "root_folder = [not toml").unwrap();

    let err = load_toml_config(Some(&path)).unwrap_err();
    assert!(err.to_string().contains("Parse TOML failed"));
}

#[test]
fn test_logging_defaults() {
    let logging = LoggingConfig::default();
    assert_eq!(logging.level, "info");
    assert!(logging.file.is_none());
}

#[test]
fn test_media_defaults() {
    let media = MediaConfig::default();
    assert_eq!(media.attribute, "Media Devices");
    assert_eq!(media.tracked_fields, vec!["label", "deviceId"]);
    assert_eq!(media.excluded_fields, vec!["kind", "groupId"]);
}
