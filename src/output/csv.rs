//! CSV export of duplicate pairs.
//!
//! Each duplicate group is exported as rows of pairs:
//!
//! - a group with at most `display_limit` members yields every unordered
//!   pair `(i, j)` with `i < j`, numbered from 1 in nested ascending order
//! - a larger group yields two rows only: the first two members numbered
//!   `1` and the last two numbered with the group's member count
//!
//! The second rule keeps exports bounded for very large groups; a group of
//! 10,000 copies would otherwise produce ~50 million rows.
//!
//! # Columns
//!
//! - `name`: basename of the group's first member
//! - `pair`: pair number within the group
//! - `size_bytes`: file size in bytes
//! - `path_a`, `path_b`: the two paths of the pair
//!
//! # Example
//!
//! ```no_run
//! use dupfind::duplicates::{detect_duplicates, DetectionMode};
//! use dupfind::output::csv::CsvOutput;
//! use std::path::PathBuf;
//!
//! let groups = detect_duplicates(vec![PathBuf::from("a"), PathBuf::from("b")], DetectionMode::NameSize).unwrap();
//! let output = CsvOutput::new(&groups, 10);
//! output.write_to(std::io::stdout()).unwrap();
//! ```

use std::io;

use serde::Serialize;
use thiserror::Error;

use crate::duplicates::DuplicateGroup;

/// Errors that can occur during CSV output generation.
#[derive(Debug, Error)]
pub enum CsvOutputError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error during CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// One exported pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    /// Basename of the group's first member
    pub name: String,
    /// Pair number within the group
    pub pair: usize,
    /// File size in bytes
    pub size_bytes: u64,
    /// First path of the pair
    pub path_a: String,
    /// Second path of the pair
    pub path_b: String,
}

/// Rows to export for `group` under `display_limit`.
///
/// ```
/// use dupfind::duplicates::DuplicateGroup;
/// use dupfind::output::csv::export_rows;
/// use dupfind::scanner::FileRecord;
/// use std::path::PathBuf;
///
/// let members = (0..4)
///     .map(|i| FileRecord::new(PathBuf::from(format!("/d{}/x.txt", i)), 10, i))
///     .collect();
/// let group = DuplicateGroup { label: "x.txt".into(), size: 10, members };
///
/// let rows = export_rows(&group, 10);
/// assert_eq!(rows.len(), 6);
/// assert_eq!(rows.last().unwrap().pair, 6);
/// ```
#[must_use]
pub fn export_rows(group: &DuplicateGroup, display_limit: usize) -> Vec<ExportRow> {
    let members = &group.members;
    let count = members.len();
    if count < 2 {
        return Vec::new();
    }

    let name = group.first_name();
    let row = |pair: usize, a: usize, b: usize| ExportRow {
        name: name.clone(),
        pair,
        size_bytes: group.size,
        path_a: members[a].path.to_string_lossy().into_owned(),
        path_b: members[b].path.to_string_lossy().into_owned(),
    };

    if count > display_limit {
        return vec![row(1, 0, 1), row(count, count - 2, count - 1)];
    }

    let mut rows = Vec::with_capacity(count * (count - 1) / 2);
    for i in 0..count {
        for j in (i + 1)..count {
            rows.push(row(rows.len() + 1, i, j));
        }
    }
    rows
}

/// CSV output formatter.
pub struct CsvOutput<'a> {
    groups: &'a [DuplicateGroup],
    display_limit: usize,
}

impl<'a> CsvOutput<'a> {
    /// Create a new CSV output formatter.
    #[must_use]
    pub fn new(groups: &'a [DuplicateGroup], display_limit: usize) -> Self {
        Self {
            groups,
            display_limit,
        }
    }

    /// Write the CSV output to the given writer.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<usize, CsvOutputError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        let mut written = 0;

        for group in self.groups {
            for row in export_rows(group, self.display_limit) {
                csv_writer.serialize(row)?;
                written += 1;
            }
        }

        if written == 0 {
            csv_writer.write_record(["name", "pair", "size_bytes", "path_a", "path_b"])?;
        }
        csv_writer.flush()?;
        log::debug!("Wrote {} CSV rows", written);
        Ok(written)
    }

    /// Generate CSV output as a string.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if serialization fails.
    pub fn to_csv_string(&self) -> Result<String, CsvOutputError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
