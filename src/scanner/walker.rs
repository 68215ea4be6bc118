//! Directory walker that feeds the detection pipeline.
//!
//! # Overview
//!
//! The [`Walker`] enumerates regular-file paths under one or more roots,
//! in a deterministic order (roots in the order given, entries sorted by
//! file name within each directory). It does not stat files for size;
//! that is the classifier's job.
//!
//! # Features
//!
//! - Multiple roots; a root inside another root, or a repeated root, is skipped
//! - Excluded subtrees (`exclude_paths`)
//! - Gitignore-style patterns via the `ignore` crate
//! - Hidden file filtering and optional symlink following
//! - Graceful shutdown via atomic flag
//!
//! # Example
//!
//! ```no_run
//! use dupfind::scanner::{Walker, WalkerConfig};
//! use std::path::PathBuf;
//!
//! let config = WalkerConfig {
//!     exclude_paths: vec![PathBuf::from("/home/user/Downloads/cache")],
//!     skip_hidden: true,
//!     ..Default::default()
//! };
//!
//! let walker = Walker::new(vec![PathBuf::from("/home/user/Downloads")], config);
//! let paths: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("Found {} files", paths.len());
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use walkdir::{DirEntry, WalkDir};

use super::{ScanError, WalkerConfig};

/// Directory walker for file discovery.
#[derive(Debug)]
pub struct Walker {
    /// Roots to walk, in order
    roots: Vec<PathBuf>,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker over `roots`.
    #[must_use]
    pub fn new(roots: Vec<PathBuf>, config: WalkerConfig) -> Self {
        Self {
            roots,
            config,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set, iteration stops at the next entry.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Walk every root, yielding file paths.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration. Paths are absolute.
    pub fn walk(&self) -> impl Iterator<Item = Result<PathBuf, ScanError>> + '_ {
        let excludes: Vec<PathBuf> = self
            .config
            .exclude_paths
            .iter()
            .map(|p| absolutize(p))
            .collect();

        let resolved: Vec<Result<PathBuf, ScanError>> = self
            .roots
            .iter()
            .map(|root| std::fs::canonicalize(root).map_err(|e| io_to_scan_error(root, e)))
            .collect();

        let covered: Vec<bool> = resolved
            .iter()
            .enumerate()
            .map(|(i, root)| match root {
                Ok(root) => is_covered(i, root, &resolved),
                Err(_) => false,
            })
            .collect();

        let mut plan: Vec<Result<PathBuf, ScanError>> = Vec::new();
        for (root, covered) in resolved.into_iter().zip(covered) {
            match root {
                Ok(root) if covered => {
                    log::warn!(
                        "Skipping {}: already covered by another root",
                        root.display()
                    );
                }
                other => plan.push(other),
            }
        }

        plan.into_iter().flat_map(move |root| {
            let paths: Box<dyn Iterator<Item = Result<PathBuf, ScanError>> + '_> = match root {
                Ok(root) => Box::new(self.walk_root(root, excludes.clone())),
                Err(e) => Box::new(std::iter::once(Err(e))),
            };
            paths
        })
    }

    fn walk_root(
        &self,
        root: PathBuf,
        excludes: Vec<PathBuf>,
    ) -> impl Iterator<Item = Result<PathBuf, ScanError>> + '_ {
        let gitignore = build_gitignore(&root, &self.config.ignore_patterns);
        let skip_hidden = self.config.skip_hidden;
        let prune_root = root.clone();

        let walk = WalkDir::new(&root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| {
                if entry.depth() == 0 {
                    return true;
                }
                if skip_hidden && is_hidden(entry) {
                    log::trace!("Skipping hidden: {}", entry.path().display());
                    return false;
                }
                if excludes.iter().any(|ex| entry.path().starts_with(ex)) {
                    log::trace!("Excluded: {}", entry.path().display());
                    return false;
                }
                if let Some(gi) = &gitignore {
                    let relative = entry.path().strip_prefix(&prune_root).unwrap_or(entry.path());
                    if gi.matched(relative, entry.file_type().is_dir()).is_ignore() {
                        log::trace!("Ignored by pattern: {}", entry.path().display());
                        return false;
                    }
                }
                true
            });

        walk.map_while(move |entry| {
            if self.is_shutdown_requested() {
                log::debug!("Walker: Shutdown requested, stopping iteration");
                return None;
            }
            Some(entry)
        })
        .filter_map(move |entry| match entry {
            Ok(entry) => {
                let file_type = entry.file_type();
                if file_type.is_dir() {
                    return None;
                }
                if file_type.is_symlink() {
                    // Only reached when not following links
                    log::trace!("Skipping symlink: {}", entry.path().display());
                    return None;
                }
                Some(Ok(entry.into_path()))
            }
            Err(e) => {
                let path = e.path().map_or_else(|| root.clone(), Path::to_path_buf);
                log::warn!("Walker error for {}: {}", path.display(), e);
                Some(Err(match e.into_io_error() {
                    Some(io_err) => io_to_scan_error(&path, io_err),
                    None => ScanError::Io {
                        path,
                        source: io::Error::other("filesystem loop detected"),
                    },
                }))
            }
        })
    }
}

/// Whether root `i` lies under another root, or repeats an earlier one.
fn is_covered(i: usize, root: &Path, resolved: &[Result<PathBuf, ScanError>]) -> bool {
    resolved.iter().enumerate().any(|(j, other)| match other {
        Ok(other) if j != i => {
            if root == other.as_path() {
                j < i
            } else {
                root.starts_with(other)
            }
        }
        _ => false,
    })
}

/// Build the gitignore matcher for one root, if any pattern applies.
fn build_gitignore(root: &Path, patterns: &[String]) -> Option<Gitignore> {
    if patterns.is_empty() {
        return None;
    }
    let mut builder = GitignoreBuilder::new(root);
    for pattern in patterns {
        if let Err(e) = builder.add_line(None, pattern) {
            log::warn!("Invalid ignore pattern '{}': {}", pattern, e);
        }
    }
    match builder.build() {
        Ok(gi) if !gi.is_empty() => Some(gi),
        Ok(_) => None,
        Err(e) => {
            log::warn!("Failed to build ignore patterns: {}", e);
            None
        }
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

/// Canonical form when the path exists, absolute form otherwise.
fn absolutize(path: &Path) -> PathBuf {
    std::fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

fn io_to_scan_error(path: &Path, error: io::Error) -> ScanError {
    match error.kind() {
        io::ErrorKind::PermissionDenied => ScanError::PermissionDenied(path.to_path_buf()),
        io::ErrorKind::NotFound => ScanError::NotFound(path.to_path_buf()),
        _ => ScanError::Io {
            path: path.to_path_buf(),
            source: error,
        },
    }
}
