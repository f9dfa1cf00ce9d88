//! Directory references and background size accounting.
//!
//! This module provides:
//! - [`DirectoryRef`]: a canonical, cheaply cloned handle on one directory
//! - [`size`]: recursive byte counting and human-readable formatting
//! - [`observable`]: a size computation running on the rayon pool that
//!   notifies subscribers once it completes
//!
//! # Example
//!
//! ```no_run
//! use dupdirs::scanner::{DirectoryRef, SizeFormat, SizeObservable};
//! use std::time::Duration;
//!
//! let dir = DirectoryRef::new("/home/user/Downloads");
//! let size = SizeObservable::spawn(dir.path(), SizeFormat::Human);
//! size.subscribe(|event| println!("{} is {}", event.path.display(), event.state.display()));
//! size.wait_timeout(Duration::from_secs(5));
//! ```

pub mod observable;
pub mod size;

use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::paths::lexical_canonical;

pub use observable::{SizeEvent, SizeObservable, SizeState};
pub use size::{directory_size, format_size, measure, SizeFormat, SIZE_PLACEHOLDER};

/// Display format for directory timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A handle on one filesystem directory.
///
/// The path is made absolute and lexically canonical on construction; the
/// directory itself does not have to exist. Existence and timestamps are
/// re-read from the filesystem every time they are asked for.
///
/// `DirectoryRef` deliberately has no `PartialEq`/`Hash`: compare through a
/// [`crate::paths::PathIdentity`] policy instead.
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryRef {
    path: PathBuf,
}

impl DirectoryRef {
    /// Create a reference to `path`, canonicalized lexically.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: lexical_canonical(path.as_ref()),
        }
    }

    /// Canonical absolute path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Final path component, lossily converted for display.
    #[must_use]
    pub fn name(&self) -> Cow<'_, str> {
        self.path
            .file_name()
            .map_or(Cow::Borrowed(""), |name| name.to_string_lossy())
    }

    /// Whether the path currently exists and is a directory.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_dir()
    }

    /// Read the directory's timestamps.
    #[must_use]
    pub fn times(&self) -> DirectoryTimes {
        match fs::metadata(&self.path) {
            Ok(metadata) => DirectoryTimes {
                modified: metadata.modified().ok().map(local_time),
                created: metadata.created().ok().map(local_time),
            },
            Err(e) => {
                log::trace!("No metadata for {}: {}", self.path.display(), e);
                DirectoryTimes::default()
            }
        }
    }

    /// Consume the reference, returning its canonical path.
    #[must_use]
    pub fn into_path(self) -> PathBuf {
        self.path
    }
}

impl fmt::Display for DirectoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

impl From<PathBuf> for DirectoryRef {
    fn from(path: PathBuf) -> Self {
        Self::new(path)
    }
}

impl From<&Path> for DirectoryRef {
    fn from(path: &Path) -> Self {
        Self::new(path)
    }
}

/// Last-modified and creation times of a directory, when the platform has them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectoryTimes {
    /// Last modification time
    pub modified: Option<DateTime<Local>>,
    /// Creation time (not available on every filesystem)
    pub created: Option<DateTime<Local>>,
}

impl DirectoryTimes {
    /// Modification time formatted with [`TIMESTAMP_FORMAT`], or empty.
    #[must_use]
    pub fn modified_display(&self) -> String {
        format_time(self.modified)
    }

    /// Creation time formatted with [`TIMESTAMP_FORMAT`], or empty.
    #[must_use]
    pub fn created_display(&self) -> String {
        format_time(self.created)
    }
}

fn format_time(time: Option<DateTime<Local>>) -> String {
    time.map(|t| t.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_default()
}

/// Convert a `SystemTime` to local time.
#[must_use]
pub fn local_time(time: SystemTime) -> DateTime<Local> {
    DateTime::<Local>::from(time)
}
