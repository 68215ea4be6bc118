//! Command-line interface definitions for dupfind.
//!
//! This module defines all CLI arguments using the clap derive API. Every
//! option that also exists in the configuration file is optional here, so
//! an absent flag leaves the file/env value alone.
//!
//! # Example
//!
//! ```bash
//! # Fast name+size pass over two trees
//! dupfind ~/Downloads ~/Documents
//!
//! # Content comparison with SHA-256, exporting pairs to CSV
//! dupfind --mode sha256 --csv pairs.csv ~/Photos
//!
//! # JSON report for scripting
//! dupfind --mode blake3 --output json ~/Music
//!
//! # Verbose mode for debugging
//! dupfind -v --mode md5 ~/Downloads
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::duplicates::DetectionMode;

/// Duplicate file finder.
///
/// Groups files by name and size (fast mode) or by content digest (md5,
/// sha1, sha256, blake3) and reports or exports the groups.
#[derive(Debug, Parser)]
#[command(name = "dupfind")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directories or files to scan
    #[arg(value_name = "PATH", required = true, num_args = 1..)]
    pub paths: Vec<PathBuf>,

    /// Detection mode: fast (name+size), md5, sha1, sha256 or blake3
    #[arg(short, long, value_name = "MODE", value_parser = parse_mode)]
    pub mode: Option<DetectionMode>,

    /// Maximum members listed per group; larger groups export two sample pairs
    #[arg(short, long = "limit", value_name = "N")]
    pub display_limit: Option<usize>,

    /// Write duplicate pairs to a CSV file
    #[arg(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,

    /// Report format on stdout
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Paths to exclude from the scan (can be specified multiple times)
    #[arg(short = 'x', long = "exclude", value_name = "PATH")]
    pub exclude_paths: Vec<PathBuf>,

    /// Glob patterns to ignore (can be specified multiple times)
    ///
    /// Patterns use gitignore syntax.
    #[arg(short, long = "ignore", value_name = "PATTERN")]
    pub ignore_patterns: Vec<String>,

    /// Number of I/O threads for hashing (default: 4)
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(long, value_name = "N")]
    pub io_threads: Option<usize>,

    /// Leave zero-byte files out of the comparison
    #[arg(long)]
    pub skip_empty: bool,

    /// Follow symbolic links during scan
    ///
    /// Warning: May cause infinite loops if symlinks form cycles.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Configuration file to use instead of the platform default
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Report errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report
    #[default]
    Text,
    /// JSON output for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Parse a detection mode name.
///
/// # Examples
///
/// ```
/// use dupfind::cli::parse_mode;
/// use dupfind::duplicates::DetectionMode;
/// use dupfind::scanner::DigestAlgorithm;
///
/// assert_eq!(parse_mode("fast").unwrap(), DetectionMode::NameSize);
/// assert_eq!(parse_mode("SHA256").unwrap(), DetectionMode::Hash(DigestAlgorithm::Sha256));
/// assert!(parse_mode("crc32").is_err());
/// ```
///
/// # Errors
///
/// Returns the error message if the name is not a known mode.
pub fn parse_mode(s: &str) -> Result<DetectionMode, String> {
    s.parse().map_err(|e: crate::duplicates::UnknownMode| e.to_string())
}
