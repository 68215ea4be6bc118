//! dupfind - duplicate file finder
//!
//! Finds duplicate files across one or more directory trees, either with a
//! fast name+size heuristic or by comparing content digests (MD5, SHA-1,
//! SHA-256, BLAKE3), and reports or exports the resulting groups.
//!
//! The library side is the detection engine in [`duplicates`]; [`run_app`]
//! wires it to the walker, configuration, signal handling and output.

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, FinderError, ScanSummary, SkippedFile};
use crate::error::ExitCode;
use crate::output::{CsvOutput, JsonOutput, TextReport};
use crate::progress::{Progress, ProgressCallback};
use crate::scanner::{ScanError, SkipReason, Walker};

/// Run the application for parsed command-line arguments.
///
/// # Errors
///
/// Returns an error for invalid configuration, an interrupted scan,
/// resource exhaustion, or failure to write the report or CSV file.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    if cli.no_color {
        yansi::disable();
    }

    let mut config = Config::load(cli.config.as_deref())?;
    config.merge_cli(&cli);
    config.validate()?;
    log::debug!("Effective configuration: {:?}", config);

    let handler = signal::install_handler()?;
    let shutdown_flag = handler.get_flag();

    let hide_progress = cli.quiet || cli.output == OutputFormat::Json;
    let progress = Arc::new(Progress::new(hide_progress));

    let (files, walk_skips) = enumerate(&cli.paths, &config, &handler, &*progress)?;

    let (groups, mut summary) = if files.is_empty() {
        log::info!("No files found under the given paths");
        (Vec::new(), ScanSummary::default())
    } else {
        let finder_config = config
            .finder_config()
            .with_shutdown_flag(shutdown_flag)
            .with_progress_callback(progress.clone());
        DuplicateFinder::new(finder_config).find_duplicates(files)?
    };
    summary.skipped.extend(walk_skips);

    for skipped in &summary.skipped {
        log::warn!("Skipped {}: {}", skipped.path.display(), skipped.reason);
    }

    let exit_code = ExitCode::for_outcome(groups.len(), summary.skipped.len());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.output {
        OutputFormat::Text => {
            TextReport::new(&groups, &summary, config.mode, config.display_limit)
                .write_to(&mut out)
                .context("Failed to write report")?;
        }
        OutputFormat::Json => {
            JsonOutput::new(&groups, &summary, config.mode, exit_code)
                .write_to(&mut out, true)
                .context("Failed to write JSON report")?;
        }
    }
    out.flush()?;

    if let Some(path) = &cli.csv {
        let file = File::create(path)
            .with_context(|| format!("Failed to create CSV file {}", path.display()))?;
        let rows = CsvOutput::new(&groups, config.display_limit)
            .write_to(BufWriter::new(file))
            .with_context(|| format!("Failed to write CSV file {}", path.display()))?;
        log::info!("Exported {} pairs to {}", rows, path.display());
    }

    Ok(exit_code)
}

/// Walk the roots and collect file paths in discovery order.
///
/// Roots that cannot be walked and unreadable directories become skips.
fn enumerate(
    roots: &[PathBuf],
    config: &Config,
    handler: &signal::ShutdownHandler,
    progress: &dyn ProgressCallback,
) -> Result<(Vec<PathBuf>, Vec<SkippedFile>), FinderError> {
    let walker = Walker::new(roots.to_vec(), config.walker_config())
        .with_shutdown_flag(handler.get_flag());

    progress.on_phase_start("walking", 0);
    let mut files = Vec::new();
    let mut skipped = Vec::new();
    for entry in walker.walk() {
        match entry {
            Ok(path) => {
                files.push(path);
                if files.len() % 256 == 0 {
                    if let Some(path) = files.last() {
                        progress.on_progress(files.len(), path.to_string_lossy().as_ref());
                    }
                }
            }
            Err(e) => skipped.push(skip_from_scan_error(e)),
        }
    }
    progress.on_phase_end("walking");

    if handler.is_shutdown_requested() {
        return Err(FinderError::Interrupted);
    }
    log::info!(
        "Found {} files under {} roots ({} unreadable)",
        files.len(),
        roots.len(),
        skipped.len()
    );
    Ok((files, skipped))
}

fn skip_from_scan_error(err: ScanError) -> SkippedFile {
    match err {
        ScanError::NotFound(path) => SkippedFile {
            path,
            reason: SkipReason::NotFound,
        },
        ScanError::PermissionDenied(path) => SkippedFile {
            path,
            reason: SkipReason::PermissionDenied,
        },
        ScanError::Io { path, source } => SkippedFile {
            reason: SkipReason::from(&source),
            path,
        },
    }
}
