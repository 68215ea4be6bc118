use super::common::env_guard;
use clap::Parser;
use dupfind::cli::Cli;
use dupfind::config::{Config, ConfigError};
use dupfind::duplicates::DetectionMode;
use dupfind::scanner::DigestAlgorithm;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_config_load_from_toml() {
    let _env = env_guard();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
mode = "sha1"
display_limit = 25
io_threads = 8
skip_hidden = true
exclude_paths = ["/var/cache"]
ignore_patterns = ["*.tmp", "node_modules/"]
"#,
    )
    .unwrap();

    let config = Config::load_from_path(&path).unwrap();
    assert_eq!(config.mode, DetectionMode::Hash(DigestAlgorithm::Sha1));
    assert_eq!(config.display_limit, 25);
    assert_eq!(config.io_threads, 8);
    assert!(config.skip_hidden);
    assert!(!config.follow_symlinks);
    assert_eq!(config.exclude_paths, vec![PathBuf::from("/var/cache")]);
    assert_eq!(config.ignore_patterns, vec!["*.tmp", "node_modules/"]);
}

#[test]
fn test_config_missing_default_file_uses_defaults() {
    let _env = env_guard();
    let dir = tempdir().unwrap();
    let config = Config::load_from_path(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_config_explicit_missing_file_is_error() {
    let _env = env_guard();
    let dir = tempdir().unwrap();
    let result = Config::load(Some(&dir.path().join("absent.toml")));
    assert!(matches!(result, Err(ConfigError::NotFound(_))));
}

#[test]
fn test_config_hierarchy_defaults_file_env_cli() {
    let _env = env_guard();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "mode = \"md5\"\nio_threads = 8\ndisplay_limit = 5\n").unwrap();

    std::env::set_var("DUPFIND_MODE", "blake3");
    let loaded = Config::load_from_path(&path);
    std::env::remove_var("DUPFIND_MODE");

    let mut config = loaded.unwrap();
    assert_eq!(config.mode, DetectionMode::Hash(DigestAlgorithm::Blake3));
    assert_eq!(config.io_threads, 8);
    assert_eq!(config.display_limit, 5);

    let cli = Cli::try_parse_from(["dupfind", "/p", "--mode", "fast", "--io-threads", "2"]).unwrap();
    config.merge_cli(&cli);
    assert_eq!(config.mode, DetectionMode::NameSize);
    assert_eq!(config.io_threads, 2);
    assert_eq!(config.display_limit, 5);
}

#[test]
fn test_config_invalid_value() {
    let _env = env_guard();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "io_threads = \"many\"\n").unwrap();

    assert!(matches!(
        Config::load_from_path(&path),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn test_config_zero_threads_rejected_after_merge() {
    let _env = env_guard();
    let cli = Cli::try_parse_from(["dupfind", "/p", "--io-threads", "0"]).unwrap();
    let mut config = Config::default();
    config.merge_cli(&cli);
    assert!(matches!(config.validate(), Err(ConfigError::ZeroIoThreads)));
}
