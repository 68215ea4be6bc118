use super::common::{env_guard, write_file};
use clap::Parser;
use dupfind::cli::Cli;
use dupfind::config::ConfigError;
use dupfind::error::ExitCode;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

/// A data directory plus an empty config file, so the user's own
/// configuration never leaks into a test run.
struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("data")).unwrap();
        fs::write(dir.path().join("config.toml"), "").unwrap();
        Self { dir }
    }

    fn data(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    fn config(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    fn csv(&self) -> PathBuf {
        self.dir.path().join("pairs.csv")
    }

    fn run(&self, extra: &[&str]) -> anyhow::Result<ExitCode> {
        let mut args: Vec<String> = vec![
            "dupfind".into(),
            "-q".into(),
            "--no-color".into(),
            "--config".into(),
            path_arg(&self.config()),
            "--csv".into(),
            path_arg(&self.csv()),
        ];
        args.extend(extra.iter().map(|s| s.to_string()));
        args.push(path_arg(&self.data()));
        dupfind::run_app(Cli::try_parse_from(args).unwrap())
    }

    fn csv_rows(&self) -> usize {
        csv::Reader::from_path(self.csv()).unwrap().records().count()
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[test]
fn test_run_fast_mode_finds_duplicates() {
    let _env = env_guard();
    let fx = Fixture::new();
    write_file(&fx.data(), "a/x.txt", b"AAAAAAAAAA");
    write_file(&fx.data(), "b/x.txt", b"AAAAAAAAAA");
    write_file(&fx.data(), "c/y.txt", b"BBBBBBBBBB");

    let code = fx.run(&[]).unwrap();
    assert_eq!(code, ExitCode::Success);
    assert_eq!(fx.csv_rows(), 1);
}

#[test]
fn test_run_no_duplicates() {
    let _env = env_guard();
    let fx = Fixture::new();
    write_file(&fx.data(), "a.txt", b"one");
    write_file(&fx.data(), "b.txt", b"four");

    let code = fx.run(&["--mode", "md5"]).unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);
    assert_eq!(fx.csv_rows(), 0);
}

#[test]
fn test_run_empty_directory() {
    let _env = env_guard();
    let fx = Fixture::new();

    let code = fx.run(&["--mode", "sha1"]).unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);
}

#[test]
fn test_run_limit_samples_export() {
    let _env = env_guard();
    let fx = Fixture::new();
    for i in 0..5 {
        write_file(&fx.data(), &format!("f{}.bin", i), b"payload");
    }

    fx.run(&["--mode", "blake3", "--limit", "10"]).unwrap();
    assert_eq!(fx.csv_rows(), 10);

    fx.run(&["--mode", "blake3", "--limit", "3"]).unwrap();
    assert_eq!(fx.csv_rows(), 2);
}

#[test]
fn test_run_config_file_sets_mode() {
    let _env = env_guard();
    let fx = Fixture::new();
    write_file(&fx.data(), "a/x.txt", b"AAAAAAAAAA");
    write_file(&fx.data(), "b/x.txt", b"BBBBBBBBBB");

    assert_eq!(fx.run(&[]).unwrap(), ExitCode::Success);

    fs::write(fx.config(), "mode = \"sha256\"\n").unwrap();
    assert_eq!(fx.run(&[]).unwrap(), ExitCode::NoDuplicates);

    // CLI beats the file
    assert_eq!(fx.run(&["--mode", "fast"]).unwrap(), ExitCode::Success);
}

#[test]
fn test_run_env_overrides_file() {
    let _env = env_guard();
    let fx = Fixture::new();
    for i in 0..4 {
        write_file(&fx.data(), &format!("f{}.bin", i), b"payload");
    }
    fs::write(fx.config(), "mode = \"md5\"\ndisplay_limit = 10\n").unwrap();

    std::env::set_var("DUPFIND_DISPLAY_LIMIT", "2");
    let result = fx.run(&[]);
    std::env::remove_var("DUPFIND_DISPLAY_LIMIT");

    assert_eq!(result.unwrap(), ExitCode::Success);
    assert_eq!(fx.csv_rows(), 2);
}

#[test]
fn test_run_zero_limit_is_config_error() {
    let _env = env_guard();
    let fx = Fixture::new();

    let err = fx.run(&["--limit", "0"]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::ZeroDisplayLimit)
    ));
    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
}

#[test]
fn test_run_invalid_mode_in_config_file() {
    let _env = env_guard();
    let fx = Fixture::new();
    fs::write(fx.config(), "mode = \"crc32\"\n").unwrap();

    let err = fx.run(&[]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::Invalid(_))
    ));
}

#[test]
fn test_run_missing_config_file() {
    let _env = env_guard();
    let fx = Fixture::new();
    fs::remove_file(fx.config()).unwrap();

    let err = fx.run(&[]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::NotFound(_))
    ));
}

#[test]
fn test_run_missing_root_is_partial_success() {
    let _env = env_guard();
    let fx = Fixture::new();
    write_file(&fx.data(), "a/x.txt", b"AAAAAAAAAA");
    write_file(&fx.data(), "b/x.txt", b"AAAAAAAAAA");
    let missing = fx.dir.path().join("missing");

    let code = fx.run(&[path_arg(&missing).as_str()]).unwrap();
    assert_eq!(code, ExitCode::PartialSuccess);
    assert_eq!(fx.csv_rows(), 1);
}

#[test]
fn test_run_json_output() {
    let _env = env_guard();
    let fx = Fixture::new();
    write_file(&fx.data(), "one.bin", b"same");
    write_file(&fx.data(), "two.bin", b"same");

    let code = fx.run(&["--mode", "sha256", "--output", "json"]).unwrap();
    assert_eq!(code, ExitCode::Success);
}
