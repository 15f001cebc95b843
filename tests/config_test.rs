//! Integration tests for loading configuration from the environment.

use serial_test::serial;
use tempfile::TempDir;
use vk_wall_archiver::config::{Config, ConfigError, ACCESS_TOKEN_ENV, CONFIG_PATH_ENV};

const CONFIG_JSON: &str = r#"{
    "access_token": "from-file",
    "domain": "apiclub",
    "post_filter": {"restricted_words": [], "ad_allowed": true, "repost_allowed": false},
    "download_attachments": false,
    "post_number": 0,
    "output_dir": "/tmp/archive"
}"#;

fn write_config(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("config.json");
    std::fs::write(&path, CONFIG_JSON).expect("Failed to write config");
    path
}

#[test]
#[serial]
fn test_load_from_configured_path() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir);
    std::env::set_var(CONFIG_PATH_ENV, &path);
    std::env::remove_var(ACCESS_TOKEN_ENV);

    let config = Config::load().expect("Failed to load config");

    assert_eq!(config.access_token, "from-file");
    assert_eq!(config.domain, "apiclub");
    assert!(!config.post_filter.repost_allowed);
    assert_eq!(config.output_dir, std::path::PathBuf::from("/tmp/archive"));
    assert!(config.validate().is_ok());

    std::env::remove_var(CONFIG_PATH_ENV);
}

#[test]
#[serial]
fn test_access_token_env_override() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir);
    std::env::set_var(CONFIG_PATH_ENV, &path);
    std::env::set_var(ACCESS_TOKEN_ENV, "from-env");

    let config = Config::load().expect("Failed to load config");
    assert_eq!(config.access_token, "from-env");

    std::env::remove_var(CONFIG_PATH_ENV);
    std::env::remove_var(ACCESS_TOKEN_ENV);
}

#[test]
#[serial]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    std::env::set_var(CONFIG_PATH_ENV, dir.path().join("absent.json"));

    let err = Config::load().unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));

    std::env::remove_var(CONFIG_PATH_ENV);
}
