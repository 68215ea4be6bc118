//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Bucketing file records by name+size, size, or digest
//! - Dropping buckets that cannot hold duplicates
//! - Content verification on a bounded worker pool
//! - Duplicate group management and ordering

pub mod finder;
pub mod groups;

pub use finder::{
    detect_duplicates, Classification, DetectionMode, DuplicateFinder, FinderConfig, FinderError,
    ScanSummary, SkippedFile, UnknownMode, Verification,
};
pub use groups::{
    bucket, build_groups, retain_candidates, sort_groups, BucketKey, Buckets, DuplicateGroup,
    GroupingStats, KeyKind,
};
