//! Duplicate finder implementation.
//!
//! # Overview
//!
//! This module orchestrates the detection pipeline:
//! 1. **Classify**: stat every enumerated path once, bucket by name+size
//!    (fast mode) or by size (hash modes)
//! 2. **Candidate filter**: drop singleton buckets
//! 3. **Verify** (hash modes only): digest every candidate on a bounded
//!    worker pool, re-bucket by digest
//! 4. **Group**: drop singletons again and sort the survivors
//!
//! Per-file failures never abort a run; they are reported as
//! [`SkippedFile`]s in the [`ScanSummary`]. Running out of file descriptors
//! or memory does abort it, as does a shutdown request.
//!
//! # Example
//!
//! ```no_run
//! use dupfind::duplicates::{DetectionMode, DuplicateFinder, FinderConfig};
//! use dupfind::scanner::DigestAlgorithm;
//! use std::path::PathBuf;
//!
//! let config = FinderConfig::default()
//!     .with_mode(DetectionMode::Hash(DigestAlgorithm::Sha256))
//!     .with_io_threads(4);
//! let finder = DuplicateFinder::new(config);
//!
//! let paths = vec![PathBuf::from("/data/a.bin"), PathBuf::from("/data/b.bin")];
//! let (groups, summary) = finder.find_duplicates(paths).unwrap();
//!
//! println!("Found {} duplicate groups", summary.duplicate_groups);
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::groups::{bucket, build_groups, retain_candidates, Buckets, DuplicateGroup, KeyKind};
use crate::progress::ProgressCallback;
use crate::scanner::{
    DigestAlgorithm, FileOutcome, FileRecord, HashError, Hasher, SkipReason,
};

/// Threshold for logging large files.
const LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024; // 100MB

/// How duplicates are recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum DetectionMode {
    /// Same lowercase file name and same size. No content is read.
    NameSize,
    /// Same content digest under the given algorithm.
    ///
    /// Equal digests are taken as equal content; files are not compared
    /// byte for byte afterwards.
    Hash(DigestAlgorithm),
}

impl Default for DetectionMode {
    fn default() -> Self {
        Self::NameSize
    }
}

impl fmt::Display for DetectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NameSize => f.write_str("fast"),
            Self::Hash(algorithm) => write!(f, "{}", algorithm),
        }
    }
}

/// Error for a mode name that is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown detection mode '{0}' (expected fast, md5, sha1, sha256 or blake3)")]
pub struct UnknownMode(pub String);

impl FromStr for DetectionMode {
    type Err = UnknownMode;

    /// Accepts `fast`, `name`, `name+size`, an algorithm name, or
    /// `hash:<algorithm>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "fast" | "name" | "name+size" => return Ok(Self::NameSize),
            _ => {}
        }
        let algorithm = lower.strip_prefix("hash:").unwrap_or(&lower);
        algorithm
            .parse::<DigestAlgorithm>()
            .map(Self::Hash)
            .map_err(|_| UnknownMode(s.to_string()))
    }
}

impl From<DetectionMode> for String {
    fn from(mode: DetectionMode) -> Self {
        mode.to_string()
    }
}

impl TryFrom<String> for DetectionMode {
    type Error = UnknownMode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Detection mode.
    pub mode: DetectionMode,
    /// Number of I/O threads for parallel hashing.
    /// Default is 4 to prevent disk thrashing.
    pub io_threads: usize,
    /// Drop zero-byte files before bucketing.
    pub skip_empty: bool,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FinderConfig")
            .field("mode", &self.mode)
            .field("io_threads", &self.io_threads)
            .field("skip_empty", &self.skip_empty)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            mode: DetectionMode::NameSize,
            io_threads: 4,
            skip_empty: false,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the detection mode.
    #[must_use]
    pub fn with_mode(mut self, mode: DetectionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Create a new configuration with custom I/O thread count.
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Drop zero-byte files before bucketing.
    #[must_use]
    pub fn with_skip_empty(mut self, skip: bool) -> Self {
        self.skip_empty = skip;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// A file dropped from the run, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    /// Path of the dropped file
    pub path: PathBuf,
    /// Why it was dropped
    pub reason: SkipReason,
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Number of paths handed to the finder
    pub total_files: usize,
    /// Number of regular files stat'ed successfully
    pub classified_files: usize,
    /// Total size of the classified files in bytes
    pub total_size: u64,
    /// Number of files left after the candidate filter
    pub candidates: usize,
    /// Number of files eliminated by the candidate filter
    pub eliminated_by_key: usize,
    /// Number of candidates digested successfully
    pub hashed_files: usize,
    /// Total bytes digested
    pub bytes_hashed: u64,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding originals)
    pub duplicate_files: usize,
    /// Total space taken by redundant copies
    pub reclaimable_space: u64,
    /// Files dropped because they could not be stat'ed or read
    pub skipped: Vec<SkippedFile>,
    /// Duration of the entire scan
    pub scan_duration: Duration,
}

impl ScanSummary {
    /// Percentage of the classified bytes taken by redundant copies.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        bytesize::ByteSize::b(self.reclaimable_space).to_string()
    }

    /// Whether any file was dropped along the way.
    #[must_use]
    pub fn has_skips(&self) -> bool {
        !self.skipped.is_empty()
    }
}

/// Errors that end a duplicate scan.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// No paths were supplied.
    #[error("No paths to scan")]
    NoPaths,

    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// Too many open files or out of memory.
    #[error(transparent)]
    ResourceExhausted(HashError),

    /// The hashing worker pool could not be created.
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Output of the classify stage.
#[derive(Debug, Default)]
pub struct Classification {
    /// Records bucketed by the mode's first key
    pub buckets: Buckets,
    /// Paths that could not be stat'ed or were not regular files
    pub skipped: Vec<SkippedFile>,
}

/// Output of the content verification stage.
#[derive(Debug, Default)]
pub struct Verification {
    /// Digested records, in discovery order
    pub records: Vec<FileRecord>,
    /// Candidates whose content could not be read
    pub skipped: Vec<SkippedFile>,
}

/// Duplicate finder that runs the detection pipeline.
///
/// # Example
///
/// ```no_run
/// use dupfind::duplicates::{DuplicateFinder, FinderConfig};
/// use std::path::PathBuf;
///
/// let finder = DuplicateFinder::new(FinderConfig::default());
/// match finder.find_duplicates(vec![PathBuf::from("a.txt"), PathBuf::from("b/a.txt")]) {
///     Ok((groups, summary)) => {
///         println!("Found {} duplicate groups", groups.len());
///         println!("Skipped {} files", summary.skipped.len());
///     }
///     Err(e) => eprintln!("Scan failed: {}", e),
/// }
/// ```
pub struct DuplicateFinder {
    config: FinderConfig,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self { config }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// The configuration this finder runs with.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Find duplicates among `paths`.
    ///
    /// `paths` is taken in discovery order; that order is kept inside every
    /// group. Groups come back sorted by size, then label.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - `paths` is empty
    /// - the scan is interrupted by shutdown signal
    /// - the process runs out of file descriptors or memory while hashing
    pub fn find_duplicates(
        &self,
        paths: Vec<PathBuf>,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let start_time = Instant::now();
        if paths.is_empty() {
            return Err(FinderError::NoPaths);
        }

        let mut summary = ScanSummary {
            total_files: paths.len(),
            ..Default::default()
        };
        log::info!(
            "Starting {} scan of {} files",
            self.config.mode,
            summary.total_files
        );

        let key_kind = match self.config.mode {
            DetectionMode::NameSize => KeyKind::NameSize,
            DetectionMode::Hash(_) => KeyKind::Size,
        };
        let classification = self.classify(paths, key_kind)?;
        summary.classified_files = classification.buckets.values().map(Vec::len).sum();
        summary.total_size = classification
            .buckets
            .values()
            .flatten()
            .map(|f| f.size)
            .sum();
        summary.skipped = classification.skipped;

        let (candidates, stats) = retain_candidates(classification.buckets);
        summary.candidates = stats.potential_duplicates;
        summary.eliminated_by_key = stats.eliminated_unique;
        log::info!(
            "Candidate filter: {} files → {} candidates ({:.1}% eliminated)",
            stats.total_files,
            stats.potential_duplicates,
            stats.elimination_rate()
        );

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let groups = match self.config.mode {
            DetectionMode::NameSize => build_groups(candidates),
            DetectionMode::Hash(algorithm) => {
                let verification = self.verify_candidates(candidates, algorithm)?;
                summary.hashed_files = verification.records.len();
                summary.bytes_hashed = verification.records.iter().map(|f| f.size).sum();
                summary.skipped.extend(verification.skipped);
                build_groups(bucket(verification.records, KeyKind::Digest))
            }
        };

        summary.duplicate_groups = groups.len();
        summary.duplicate_files = groups.iter().map(DuplicateGroup::duplicate_count).sum();
        summary.reclaimable_space = groups.iter().map(DuplicateGroup::wasted_space).sum();
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} duplicate groups, {} duplicate files, {} reclaimable, {} skipped",
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.reclaimable_display(),
            summary.skipped.len()
        );

        Ok((groups, summary))
    }

    /// Stat every path and bucket the resulting records by `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Interrupted`] if shutdown is requested.
    pub fn classify(
        &self,
        paths: Vec<PathBuf>,
        kind: KeyKind,
    ) -> Result<Classification, FinderError> {
        let callback = self.config.progress_callback.as_ref();
        if let Some(callback) = callback {
            callback.on_phase_start("classify", paths.len());
        }

        let mut records = Vec::with_capacity(paths.len());
        let mut skipped = Vec::new();
        for (seq, path) in paths.into_iter().enumerate() {
            if self.config.is_shutdown_requested() {
                log::debug!("Classify: Shutdown requested");
                return Err(FinderError::Interrupted);
            }
            if let Some(callback) = callback {
                callback.on_progress(seq + 1, path.to_string_lossy().as_ref());
            }

            match FileRecord::probe(path, seq) {
                FileOutcome::Record(record) if self.config.skip_empty && record.size == 0 => {
                    log::debug!("Skipping empty file: {}", record.path.display());
                }
                FileOutcome::Record(record) => records.push(record),
                FileOutcome::Skipped { path, reason } => {
                    log::debug!("Skipping {}: {}", path.display(), reason);
                    skipped.push(SkippedFile { path, reason });
                }
            }
        }

        if let Some(callback) = callback {
            callback.on_phase_end("classify");
        }
        log::info!(
            "Classified {} files ({} skipped)",
            records.len(),
            skipped.len()
        );

        Ok(Classification {
            buckets: bucket(records, kind),
            skipped,
        })
    }

    /// Digest every candidate with `algorithm`.
    ///
    /// Digests run on a dedicated pool of `io_threads` workers. Each worker
    /// only reads its own file; results are gathered by rayon's ordered
    /// collect and then put back in discovery order, so completion order
    /// never leaks into the output.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` on shutdown, resource exhaustion, or if the
    /// pool cannot be built. Other read failures are reported as skips.
    pub fn verify_candidates(
        &self,
        candidates: Buckets,
        algorithm: DigestAlgorithm,
    ) -> Result<Verification, FinderError> {
        let mut files: Vec<FileRecord> = candidates.into_values().flatten().collect();
        files.sort_by_key(FileRecord::seq);

        if files.is_empty() {
            log::debug!("Verify: No files to process");
            return Ok(Verification::default());
        }

        let callback = self.config.progress_callback.as_ref();
        if let Some(callback) = callback {
            callback.on_phase_start("verify", files.len());
        }
        log::info!(
            "Computing {} digests for {} candidates on {} threads",
            algorithm,
            files.len(),
            self.config.io_threads
        );

        let mut hasher = Hasher::new(algorithm);
        if let Some(ref flag) = self.config.shutdown_flag {
            hasher = hasher.with_shutdown_flag(flag.clone());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.io_threads.max(1))
            .build()?;

        let completed = AtomicUsize::new(0);
        let results: Vec<(FileRecord, Result<String, HashError>)> = pool.install(|| {
            files
                .into_par_iter()
                .map(|file| {
                    if self.config.is_shutdown_requested() {
                        let err = HashError::Interrupted(file.path.clone());
                        return (file, Err(err));
                    }
                    if file.size > LARGE_FILE_THRESHOLD {
                        log::debug!(
                            "Hashing large file ({} MB): {}",
                            file.size / (1024 * 1024),
                            file.path.display()
                        );
                    }

                    let result = hasher.digest_file(&file.path);
                    match &result {
                        Ok(_) => log::trace!("Digest computed: {}", file.path.display()),
                        Err(e) if e.is_fatal() => {
                            log::warn!("Failed to hash {}: {}", file.path.display(), e);
                        }
                        Err(e) => {
                            log::warn!("Failed to hash {}: {}", file.path.display(), e);
                            if let Some(callback) = callback {
                                callback.on_message(&format!(
                                    "Skipped {}: {}",
                                    file.path.display(),
                                    e.skip_reason()
                                ));
                            }
                        }
                    }

                    if let Some(callback) = callback {
                        let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                        callback.on_progress(done, file.path.to_string_lossy().as_ref());
                        callback.on_item_completed(file.size);
                    }
                    (file, result)
                })
                .collect()
        });

        if let Some(callback) = callback {
            callback.on_phase_end("verify");
        }

        if self.config.is_shutdown_requested() {
            log::info!("Verify: Interrupted by shutdown signal");
            return Err(FinderError::Interrupted);
        }

        let mut verification = Verification::default();
        for (file, result) in results {
            match result {
                Ok(digest) => verification.records.push(file.with_digest(digest)),
                Err(HashError::Interrupted(_)) => return Err(FinderError::Interrupted),
                Err(e) if e.is_fatal() => return Err(FinderError::ResourceExhausted(e)),
                Err(e) => verification.skipped.push(SkippedFile {
                    path: file.path,
                    reason: e.skip_reason(),
                }),
            }
        }

        log::info!(
            "Verified {} candidates ({} unreadable)",
            verification.records.len(),
            verification.skipped.len()
        );
        Ok(verification)
    }
}

/// Find duplicates among `paths` with default settings for everything but
/// the mode.
///
/// # Errors
///
/// See [`DuplicateFinder::find_duplicates`].
pub fn detect_duplicates(
    paths: Vec<PathBuf>,
    mode: DetectionMode,
) -> Result<Vec<DuplicateGroup>, FinderError> {
    let finder = DuplicateFinder::new(FinderConfig::default().with_mode(mode));
    finder.find_duplicates(paths).map(|(groups, _)| groups)
}
