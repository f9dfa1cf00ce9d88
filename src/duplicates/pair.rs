//! A detected pair of same-named directories.

use std::borrow::Cow;
use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::paths::same_path;
use crate::scanner::DirectoryRef;

/// Two same-named directories found under different roots.
///
/// `first` is the child that was seen first during detection; the pair is
/// immutable once created.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicatePair {
    first: DirectoryRef,
    second: DirectoryRef,
}

impl DuplicatePair {
    /// Create a pair.
    #[must_use]
    pub fn new(first: DirectoryRef, second: DirectoryRef) -> Self {
        Self { first, second }
    }

    /// The first-seen directory.
    #[must_use]
    pub fn first(&self) -> &DirectoryRef {
        &self.first
    }

    /// The directory that collided with `first`.
    #[must_use]
    pub fn second(&self) -> &DirectoryRef {
        &self.second
    }

    /// The shared leaf name.
    #[must_use]
    pub fn name(&self) -> Cow<'_, str> {
        self.first.name()
    }

    /// Whether this pair is `(first, second)` in that order.
    #[must_use]
    pub fn matches(&self, first: &Path, second: &Path) -> bool {
        same_path(self.first.path(), first) && same_path(self.second.path(), second)
    }

    /// Whether either side is `path`.
    #[must_use]
    pub fn involves(&self, path: &Path) -> bool {
        same_path(self.first.path(), path) || same_path(self.second.path(), path)
    }
}

impl fmt::Display for DuplicatePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <-> {}", self.first, self.second)
    }
}
