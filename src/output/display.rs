//! Text report for duplicate groups.
//!
//! [`GroupView`] applies the display limit to one group: at most `limit`
//! member paths are listed, and a larger group also carries the number of
//! hidden members plus the first and last basenames so the reader can tell
//! what was cut. [`TextReport`] renders a whole run with `yansi` colours and
//! `bytesize` sizes.
//!
//! # Example
//!
//! ```
//! use dupfind::duplicates::DuplicateGroup;
//! use dupfind::output::display::GroupView;
//!
//! # fn show(group: &DuplicateGroup) {
//! let view = GroupView::new(group, 10);
//! for path in &view.shown {
//!     println!("{}", path.display());
//! }
//! if let Some(hidden) = &view.hidden {
//!     println!("... {} more ({} .. {})", hidden.count, hidden.first_name, hidden.last_name);
//! }
//! # }
//! ```

use std::io::{self, Write};
use std::path::PathBuf;

use bytesize::ByteSize;
use yansi::Paint;

use crate::duplicates::{DetectionMode, DuplicateGroup, ScanSummary};

/// Members left out of a truncated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiddenMembers {
    /// How many members were not listed
    pub count: usize,
    /// Basename of the group's first member
    pub first_name: String,
    /// Basename of the group's last member
    pub last_name: String,
}

/// What to show for one group under a display limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupView {
    /// Group label (file name or digest)
    pub label: String,
    /// Size of each member in bytes
    pub size: u64,
    /// Total number of members
    pub count: usize,
    /// The first `limit` member paths, in group order
    pub shown: Vec<PathBuf>,
    /// Set when `count > limit`
    pub hidden: Option<HiddenMembers>,
}

impl GroupView {
    /// Build the view of `group` under `limit`.
    ///
    /// A `limit` of zero is treated as one; configuration rejects zero
    /// before a run starts.
    #[must_use]
    pub fn new(group: &DuplicateGroup, limit: usize) -> Self {
        let limit = limit.max(1);
        let count = group.len();
        let shown = group
            .members
            .iter()
            .take(limit)
            .map(|f| f.path.clone())
            .collect();
        let hidden = (count > limit).then(|| HiddenMembers {
            count: count - limit,
            first_name: group.first_name(),
            last_name: group.last_name(),
        });

        Self {
            label: group.label.clone(),
            size: group.size,
            count,
            shown,
            hidden,
        }
    }

    /// Whether the listing was cut.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.hidden.is_some()
    }
}

/// Human-readable report of a finished scan.
pub struct TextReport<'a> {
    groups: &'a [DuplicateGroup],
    summary: &'a ScanSummary,
    mode: DetectionMode,
    limit: usize,
}

impl<'a> TextReport<'a> {
    /// Create a report over `groups`.
    #[must_use]
    pub fn new(
        groups: &'a [DuplicateGroup],
        summary: &'a ScanSummary,
        mode: DetectionMode,
        limit: usize,
    ) -> Self {
        Self {
            groups,
            summary,
            mode,
            limit,
        }
    }

    /// Write the report.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from `writer`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for (idx, group) in self.groups.iter().enumerate() {
            let view = GroupView::new(group, self.limit);
            let heading = match self.mode {
                DetectionMode::NameSize => view.label.clone(),
                DetectionMode::Hash(_) => short_digest(&view.label),
            };
            writeln!(
                writer,
                "{} {} ({} files, {} each)",
                format!("[{}]", idx + 1).bold(),
                heading.cyan(),
                view.count,
                ByteSize::b(view.size)
            )?;
            for path in &view.shown {
                writeln!(writer, "    {}", path.display())?;
            }
            if let Some(hidden) = &view.hidden {
                writeln!(
                    writer,
                    "    {}",
                    format!(
                        "... and {} more ({} .. {})",
                        hidden.count, hidden.first_name, hidden.last_name
                    )
                    .dim()
                )?;
            }
        }

        if !self.groups.is_empty() {
            writeln!(writer)?;
        }
        self.write_summary(writer)
    }

    fn write_summary<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let s = self.summary;
        if s.duplicate_groups == 0 {
            writeln!(writer, "{}", "No duplicates found.".green())?;
        } else {
            writeln!(
                writer,
                "{} duplicate groups, {} redundant files, {} reclaimable ({:.1}% of scanned)",
                s.duplicate_groups.to_string().yellow().bold(),
                s.duplicate_files,
                ByteSize::b(s.reclaimable_space).to_string().yellow(),
                s.wasted_percentage()
            )?;
        }
        writeln!(
            writer,
            "Scanned {} files ({}) in {:.2}s using {} mode",
            s.total_files,
            ByteSize::b(s.total_size),
            s.scan_duration.as_secs_f64(),
            self.mode
        )?;
        if s.has_skips() {
            writeln!(
                writer,
                "{}",
                format!("{} files skipped (run with -v for details)", s.skipped.len()).red()
            )?;
        }
        Ok(())
    }
}

/// First 16 hex characters of a digest.
fn short_digest(digest: &str) -> String {
    digest.chars().take(16).collect()
}
