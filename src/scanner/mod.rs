//! Scanner module for file discovery and content digests.
//!
//! This module provides functionality for:
//! - Directory enumeration with exclusion rules
//! - Streaming content digests (MD5, SHA-1, SHA-256, BLAKE3)
//! - The [`FileRecord`] model that flows through the detection pipeline
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and path discovery
//! - [`hasher`]: Pluggable digest algorithms (streaming)
//!
//! # Example
//!
//! ```no_run
//! use dupfind::scanner::{Walker, WalkerConfig};
//! use std::path::PathBuf;
//!
//! let walker = Walker::new(vec![PathBuf::from(".")], WalkerConfig::default());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(path) => println!("{}", path.display()),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod hasher;
pub mod walker;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

// Re-export main types
pub use hasher::{DigestAlgorithm, Hasher};
pub use walker::Walker;

/// A regular file taking part in duplicate detection.
///
/// Records are immutable: a digest is attached by consuming the record
/// with [`FileRecord::with_digest`], which returns a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    /// Path as handed over by the enumerator
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Hex content digest, present only after content verification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    /// Position in the enumeration order
    #[serde(skip)]
    seq: usize,
}

impl FileRecord {
    /// Create a record without a digest.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the file
    /// * `size` - File size in bytes
    /// * `seq` - Discovery position, used to keep output in enumeration order
    #[must_use]
    pub fn new(path: PathBuf, size: u64, seq: usize) -> Self {
        Self {
            path,
            size,
            digest: None,
            seq,
        }
    }

    /// Consume the record and return it with a digest attached.
    #[must_use]
    pub fn with_digest(self, digest: String) -> Self {
        Self {
            digest: Some(digest),
            ..self
        }
    }

    /// Discovery position of this record.
    #[must_use]
    pub fn seq(&self) -> usize {
        self.seq
    }

    /// Final path component, lossily converted.
    #[must_use]
    pub fn file_name(&self) -> String {
        file_name_of(&self.path)
    }

    /// Stat `path` and build a record, or explain why it was skipped.
    ///
    /// Follows symlinks. Anything that is not a regular file is skipped.
    pub fn probe(path: PathBuf, seq: usize) -> FileOutcome {
        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => FileOutcome::Record(Self::new(path, meta.len(), seq)),
            Ok(_) => FileOutcome::Skipped {
                path,
                reason: SkipReason::NotAFile,
            },
            Err(e) => {
                let reason = SkipReason::from(&e);
                FileOutcome::Skipped { path, reason }
            }
        }
    }
}

/// Basename of a path, or the whole path when it has none.
#[must_use]
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Result of handling one file in a pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// The file was processed successfully.
    Record(FileRecord),
    /// The file was dropped from further consideration.
    Skipped {
        /// Path of the dropped file
        path: PathBuf,
        /// Why it was dropped
        reason: SkipReason,
    },
}

/// Why a file was skipped. Never fatal to a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum SkipReason {
    /// The file vanished before it could be processed.
    #[error("not found")]
    NotFound,
    /// Access to the file was denied.
    #[error("permission denied")]
    PermissionDenied,
    /// The path exists but is not a regular file.
    #[error("not a regular file")]
    NotAFile,
    /// Any other I/O failure.
    #[error("{0}")]
    Io(String),
}

impl From<&io::Error> for SkipReason {
    fn from(e: &io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            _ => Self::Io(e.to_string()),
        }
    }
}

/// Configuration for directory walking.
///
/// Controls exclusion rules and symlink handling.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Follow symbolic links during traversal.
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,

    /// Directories (or files) whose whole subtree is left out.
    pub exclude_paths: Vec<PathBuf>,

    /// Glob patterns to ignore (gitignore-style), matched relative to each root.
    pub ignore_patterns: Vec<String>,
}

/// Errors that can occur during directory enumeration.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Errors that can occur while computing a digest.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The process ran out of file descriptors or memory.
    #[error("Resource exhausted while reading {path}: {source}")]
    ResourceExhausted {
        /// Path being read when the limit was hit
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Hashing stopped because shutdown was requested.
    #[error("Interrupted while reading {0}")]
    Interrupted(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl HashError {
    /// Classify an I/O error raised while reading `path`.
    #[must_use]
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        if is_resource_exhaustion(&source) {
            return Self::ResourceExhausted {
                path: path.to_path_buf(),
                source,
            };
        }
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }

    /// Whether this error must end the run instead of skipping the file.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ResourceExhausted { .. } | Self::Interrupted(_))
    }

    /// Per-file skip reason for recoverable errors.
    #[must_use]
    pub fn skip_reason(&self) -> SkipReason {
        match self {
            Self::NotFound(_) => SkipReason::NotFound,
            Self::PermissionDenied(_) => SkipReason::PermissionDenied,
            Self::ResourceExhausted { source, .. } | Self::Io { source, .. } => {
                SkipReason::Io(source.to_string())
            }
            Self::Interrupted(_) => SkipReason::Io("interrupted".to_string()),
        }
    }
}

/// Too many open files, or out of memory.
fn is_resource_exhaustion(e: &io::Error) -> bool {
    if e.kind() == io::ErrorKind::OutOfMemory {
        return true;
    }
    // EMFILE / ENFILE
    #[cfg(unix)]
    {
        matches!(e.raw_os_error(), Some(23) | Some(24))
    }
    // ERROR_TOO_MANY_OPEN_FILES
    #[cfg(windows)]
    {
        matches!(e.raw_os_error(), Some(4))
    }
    #[cfg(not(any(unix, windows)))]
    {
        false
    }
}
