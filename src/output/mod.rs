//! Output formatters for detected duplicate pairs.
//!
//! This module provides different output formats for scan results:
//! - Plain text (optionally colored) for terminals
//! - JSON for automation and scripting
//! - CSV for spreadsheet import
//!
//! All of them render [`PairRecord`]s, a flat snapshot of a
//! [`crate::duplicates::PairEntry`] taken at output time.
//!
//! # Example
//!
//! ```no_run
//! use dupdirs::config::Config;
//! use dupdirs::output::{records, text::TextOutput};
//! use dupdirs::session::Session;
//!
//! let mut session = Session::open(Config::default(), None);
//! session.add_roots(["/mnt/old", "/mnt/new"]);
//! session.scan().unwrap();
//!
//! let rows = records(session.pairs());
//! TextOutput::new(&rows).write_to(std::io::stdout(), false).unwrap();
//! ```

pub mod csv;
pub mod json;
pub mod text;

use serde::Serialize;

use crate::duplicates::{DuplicatePairSet, PairEntry};
use crate::scanner::{DirectoryRef, SizeObservable};

pub use self::csv::CsvOutput;
pub use self::json::JsonOutput;
pub use self::text::TextOutput;

/// One side of a pair, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SideRecord {
    /// Canonical path
    pub path: String,
    /// Size in bytes, when computed
    pub size: Option<u64>,
    /// Size as shown to the user (empty while pending or untracked)
    pub size_display: String,
    /// Last modification time, local, or empty
    pub modified: String,
}

impl SideRecord {
    fn new(dir: &DirectoryRef, size: Option<&SizeObservable>) -> Self {
        let state = size.map(SizeObservable::state);
        Self {
            path: dir.path().to_string_lossy().into_owned(),
            size: state.as_ref().and_then(|s| s.bytes()),
            size_display: state
                .as_ref()
                .map(|s| s.display().trim().to_string())
                .unwrap_or_default(),
            modified: dir.times().modified_display(),
        }
    }
}

/// A duplicate pair, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairRecord {
    /// Shared directory name
    pub name: String,
    /// The first-seen directory
    pub first: SideRecord,
    /// The directory that collided with it
    pub second: SideRecord,
}

impl PairRecord {
    /// Snapshot one entry.
    #[must_use]
    pub fn from_entry(entry: &PairEntry) -> Self {
        let pair = entry.pair();
        Self {
            name: pair.name().into_owned(),
            first: SideRecord::new(pair.first(), entry.first_size()),
            second: SideRecord::new(pair.second(), entry.second_size()),
        }
    }
}

/// Snapshot every entry of `pairs`, in order.
#[must_use]
pub fn records(pairs: &DuplicatePairSet) -> Vec<PairRecord> {
    pairs.iter().map(PairRecord::from_entry).collect()
}
