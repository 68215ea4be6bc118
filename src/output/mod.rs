//! Output formatters for duplicate scan results.
//!
//! This module provides different output formats for scan results:
//! - Text report with truncated member listings
//! - JSON for automation and scripting
//! - CSV pair export for spreadsheet import
//!
//! # Example
//!
//! ```no_run
//! use dupfind::duplicates::{DuplicateFinder, FinderConfig};
//! use dupfind::error::ExitCode;
//! use dupfind::output::json::JsonOutput;
//! use std::path::PathBuf;
//!
//! let config = FinderConfig::default();
//! let mode = config.mode;
//! let finder = DuplicateFinder::new(config);
//! let (groups, summary) = finder.find_duplicates(vec![PathBuf::from("a"), PathBuf::from("b")]).unwrap();
//!
//! let output = JsonOutput::new(&groups, &summary, mode, ExitCode::Success);
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

pub mod csv;
pub mod display;
pub mod json;

pub use csv::{export_rows, CsvOutput, ExportRow};
pub use display::{GroupView, HiddenMembers, TextReport};
pub use json::JsonOutput;
