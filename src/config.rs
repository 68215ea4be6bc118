//! Application configuration management.
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. [`Config::default()`]
//! 2. `config.toml` in the platform config directory, or the file passed
//!    with `--config`
//! 3. `DUPFIND_*` environment variables (`DUPFIND_IO_THREADS=8`)
//! 4. Command-line flags ([`Config::merge_cli`])
//!
//! [`Config::validate`] runs last and rejects values the pipeline cannot
//! work with.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::duplicates::{DetectionMode, FinderConfig};
use crate::scanner::WalkerConfig;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "DUPFIND_";

/// Errors raised while assembling or validating configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested configuration file does not exist.
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    /// The configuration file or environment holds invalid values.
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),

    /// The display limit was zero.
    #[error("Display limit must be at least 1")]
    ZeroDisplayLimit,

    /// The I/O thread count was zero.
    #[error("I/O thread count must be at least 1")]
    ZeroIoThreads,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Detection mode (`fast`, `md5`, `sha1`, `sha256`, `blake3`).
    pub mode: DetectionMode,
    /// Maximum members listed per group before truncating.
    pub display_limit: usize,
    /// Number of hashing threads.
    pub io_threads: usize,
    /// Leave zero-byte files out of the comparison.
    pub skip_empty: bool,
    /// Follow symbolic links while walking.
    pub follow_symlinks: bool,
    /// Skip dot-files and dot-directories.
    pub skip_hidden: bool,
    /// Paths excluded from the walk.
    pub exclude_paths: Vec<PathBuf>,
    /// Gitignore-style patterns excluded from the walk.
    pub ignore_patterns: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: DetectionMode::NameSize,
            display_limit: 10,
            io_threads: 4,
            skip_empty: false,
            follow_symlinks: false,
            skip_hidden: false,
            exclude_paths: Vec::new(),
            ignore_patterns: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from an explicit file, or from the platform
    /// default location if `explicit` is `None`.
    ///
    /// A missing default file is not an error; a missing explicit file is.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the explicit file is missing or any layer
    /// holds invalid values.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) if !path.is_file() => Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => Self::load_from_path(path),
            None => match Self::config_path() {
                Some(path) => Self::load_from_path(&path),
                None => {
                    log::debug!("No platform config directory, using defaults");
                    Self::figment().extract().map_err(|e| Box::new(e).into())
                }
            },
        }
    }

    /// Load configuration from `path`, layered over defaults and under the
    /// environment. A missing file contributes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the file or environment holds
    /// values that do not deserialize.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        log::debug!("Loading configuration from {}", path.display());
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| Box::new(e).into())
    }

    fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Get the default platform-specific configuration path.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dupfind").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Apply command-line overrides.
    ///
    /// Boolean flags can only switch a setting on; list flags extend the
    /// configured lists.
    pub fn merge_cli(&mut self, cli: &Cli) {
        if let Some(mode) = cli.mode {
            self.mode = mode;
        }
        if let Some(limit) = cli.display_limit {
            self.display_limit = limit;
        }
        if let Some(threads) = cli.io_threads {
            self.io_threads = threads;
        }
        self.skip_empty |= cli.skip_empty;
        self.follow_symlinks |= cli.follow_symlinks;
        self.skip_hidden |= cli.skip_hidden;
        self.exclude_paths.extend(cli.exclude_paths.iter().cloned());
        self.ignore_patterns
            .extend(cli.ignore_patterns.iter().cloned());
    }

    /// Check the values the pipeline depends on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a zero display limit or thread count.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.display_limit == 0 {
            return Err(ConfigError::ZeroDisplayLimit);
        }
        if self.io_threads == 0 {
            return Err(ConfigError::ZeroIoThreads);
        }
        Ok(())
    }

    /// Walker settings derived from this configuration.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig {
            follow_symlinks: self.follow_symlinks,
            skip_hidden: self.skip_hidden,
            exclude_paths: self.exclude_paths.clone(),
            ignore_patterns: self.ignore_patterns.clone(),
        }
    }

    /// Finder settings derived from this configuration.
    #[must_use]
    pub fn finder_config(&self) -> FinderConfig {
        FinderConfig::default()
            .with_mode(self.mode)
            .with_io_threads(self.io_threads)
            .with_skip_empty(self.skip_empty)
    }
}
