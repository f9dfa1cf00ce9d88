//! One member of the root directory set.

use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::scanner::{DirectoryRef, SizeObservable};

static NEXT_ENTRY_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`RootEntry`].
///
/// Two entries for the same path created at different times have different
/// ids, which lets [`crate::roots::RootDirectorySet::remove_exact`] tell them
/// apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

impl EntryId {
    pub(crate) fn next() -> Self {
        Self(NEXT_ENTRY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A root directory plus its optional background size.
#[derive(Debug, Clone)]
pub struct RootEntry {
    id: EntryId,
    dir: DirectoryRef,
    size: Option<SizeObservable>,
}

impl RootEntry {
    pub(crate) fn new(dir: DirectoryRef, size: Option<SizeObservable>) -> Self {
        Self {
            id: EntryId::next(),
            dir,
            size,
        }
    }

    /// Identity of this entry.
    #[must_use]
    pub fn id(&self) -> EntryId {
        self.id
    }

    /// The directory.
    #[must_use]
    pub fn dir(&self) -> &DirectoryRef {
        &self.dir
    }

    /// Canonical path of the directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Background size, if the owning set tracks sizes.
    #[must_use]
    pub fn size(&self) -> Option<&SizeObservable> {
        self.size.as_ref()
    }

    pub(crate) fn release(&self) {
        if let Some(size) = &self.size {
            size.detach();
        }
    }
}
