//! Bucketing, candidate filtering and the duplicate group model.
//!
//! # Overview
//!
//! Every stage of the pipeline buckets [`FileRecord`]s under a
//! [`BucketKey`] and then keeps only buckets with two or more members:
//!
//! | Stage | Key |
//! |---|---|
//! | fast mode | lowercase file name + size |
//! | hash modes, pre-filter | size |
//! | hash modes, final | digest |
//!
//! Members of a bucket keep the order in which records were handed in,
//! which is discovery order. Final groups are sorted explicitly (see
//! [`sort_groups`]) so output never depends on hash map iteration.
//!
//! # Example
//!
//! ```
//! use dupfind::duplicates::{bucket, retain_candidates, KeyKind};
//! use dupfind::scanner::FileRecord;
//! use std::path::PathBuf;
//!
//! let records = vec![
//!     FileRecord::new(PathBuf::from("/a/file1.txt"), 1024, 0),
//!     FileRecord::new(PathBuf::from("/b/file2.txt"), 1024, 1),
//!     FileRecord::new(PathBuf::from("/c/file3.txt"), 2048, 2),
//! ];
//!
//! let buckets = bucket(records, KeyKind::Size);
//! let (candidates, stats) = retain_candidates(buckets);
//!
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.potential_duplicates, 2);
//! assert_eq!(candidates.len(), 1);
//! ```

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::scanner::FileRecord;

/// Which key a bucketing pass uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// Lowercased basename plus size (fast mode)
    NameSize,
    /// Size alone (hash-mode pre-filter)
    Size,
    /// Content digest alone (hash-mode final grouping)
    Digest,
}

/// Key shared by every member of a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BucketKey {
    /// Lowercased basename and size in bytes
    NameSize {
        /// Lowercased file name
        name: String,
        /// File size in bytes
        size: u64,
    },
    /// File size in bytes
    Size(u64),
    /// Hex content digest
    Digest(String),
}

impl BucketKey {
    /// Key of `record` under `kind`.
    ///
    /// Returns `None` for [`KeyKind::Digest`] when the record has not been
    /// verified yet.
    #[must_use]
    pub fn of(record: &FileRecord, kind: KeyKind) -> Option<Self> {
        match kind {
            KeyKind::NameSize => Some(Self::NameSize {
                name: record.file_name().to_lowercase(),
                size: record.size,
            }),
            KeyKind::Size => Some(Self::Size(record.size)),
            KeyKind::Digest => record.digest.clone().map(Self::Digest),
        }
    }
}

/// Records grouped by key, before or after the candidate filter.
pub type Buckets = HashMap<BucketKey, Vec<FileRecord>>;

/// Bucket records by `kind`, preserving input order inside each bucket.
///
/// Records without a key (an unverified record under
/// [`KeyKind::Digest`]) are dropped with a debug log.
#[must_use]
pub fn bucket(records: impl IntoIterator<Item = FileRecord>, kind: KeyKind) -> Buckets {
    let mut buckets = Buckets::new();
    for record in records {
        match BucketKey::of(&record, kind) {
            Some(key) => buckets.entry(key).or_default().push(record),
            None => log::debug!("No {:?} key for {}", kind, record.path.display()),
        }
    }
    buckets
}

/// Statistics from one candidate filter pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of records that entered the pass
    pub total_files: usize,
    /// Number of distinct keys
    pub buckets: usize,
    /// Number of records eliminated as unique (singleton buckets)
    pub eliminated_unique: usize,
    /// Number of records that could still be duplicates
    pub potential_duplicates: usize,
    /// Number of buckets with 2+ records
    pub duplicate_groups: usize,
}

impl GroupingStats {
    /// Percentage of records eliminated by this pass.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Drop singleton buckets; they cannot hold duplicates.
#[must_use]
pub fn retain_candidates(buckets: Buckets) -> (Buckets, GroupingStats) {
    let mut stats = GroupingStats {
        total_files: buckets.values().map(Vec::len).sum(),
        buckets: buckets.len(),
        ..Default::default()
    };

    let retained: Buckets = buckets
        .into_iter()
        .filter(|(key, files)| {
            if files.len() < 2 {
                stats.eliminated_unique += files.len();
                log::trace!("Eliminated unique {:?}: {}", key, files[0].path.display());
                false
            } else {
                stats.potential_duplicates += files.len();
                stats.duplicate_groups += 1;
                true
            }
        })
        .collect();

    (retained, stats)
}

/// A confirmed group of two or more files sharing a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    /// File name of the first member (fast mode) or hex digest (hash modes)
    pub label: String,
    /// Size in bytes shared by the members
    pub size: u64,
    /// Members in discovery order
    pub members: Vec<FileRecord>,
}

impl DuplicateGroup {
    /// Promote a bucket to a group.
    ///
    /// Returns `None` when the bucket has fewer than two members. Members
    /// are put back in discovery order.
    #[must_use]
    pub fn from_bucket(key: BucketKey, mut members: Vec<FileRecord>) -> Option<Self> {
        if members.len() < 2 {
            return None;
        }
        members.sort_by_key(FileRecord::seq);
        let first = &members[0];
        let (label, size) = match key {
            BucketKey::NameSize { size, .. } => (first.file_name(), size),
            BucketKey::Size(size) => (first.file_name(), size),
            BucketKey::Digest(digest) => (digest, first.size),
        };
        Some(Self {
            label,
            size,
            members,
        })
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always false for groups built by the pipeline.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Number of redundant copies (total - 1 original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.members.len().saturating_sub(1)
    }

    /// Space taken by the redundant copies.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Paths of the members, in group order.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.members.iter().map(|f| f.path.clone()).collect()
    }

    /// Basename of the first member.
    #[must_use]
    pub fn first_name(&self) -> String {
        self.members.first().map(FileRecord::file_name).unwrap_or_default()
    }

    /// Basename of the last member.
    #[must_use]
    pub fn last_name(&self) -> String {
        self.members.last().map(FileRecord::file_name).unwrap_or_default()
    }
}

/// Ascending size, then label, then first member path.
fn group_order(a: &DuplicateGroup, b: &DuplicateGroup) -> Ordering {
    a.size
        .cmp(&b.size)
        .then_with(|| a.label.cmp(&b.label))
        .then_with(|| {
            let pa = a.members.first().map(|f| &f.path);
            let pb = b.members.first().map(|f| &f.path);
            pa.cmp(&pb)
        })
}

/// Sort groups into their reporting order.
pub fn sort_groups(groups: &mut [DuplicateGroup]) {
    groups.sort_by(group_order);
}

/// Turn filtered buckets into sorted duplicate groups.
///
/// Buckets with fewer than two members are discarded here as well, which
/// matters for digest buckets split off a larger size bucket.
#[must_use]
pub fn build_groups(buckets: Buckets) -> Vec<DuplicateGroup> {
    let mut groups: Vec<DuplicateGroup> = buckets
        .into_iter()
        .filter_map(|(key, members)| DuplicateGroup::from_bucket(key, members))
        .collect();
    sort_groups(&mut groups);

    for group in &groups {
        log::debug!(
            "Duplicate group {}: {} files, {} bytes each",
            group.label,
            group.len(),
            group.size
        );
    }
    groups
}
