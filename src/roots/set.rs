//! The deduplicated, change-notifying collection of root directories.

use std::path::Path;

use crate::notify::{SubscriptionId, Subscribers};
use crate::paths::{FullPathIdentity, IdentityMap, PathIdentity};
use crate::scanner::{DirectoryRef, SizeFormat, SizeObservable};

use super::entry::{EntryId, RootEntry};

/// What happened to a [`RootDirectorySet`].
#[derive(Debug, Clone)]
pub enum ChangeKind {
    /// A directory was appended
    Added(DirectoryRef),
    /// A directory was removed
    Removed(DirectoryRef),
    /// Every entry was removed
    Cleared,
    /// The set was folded through path identity
    Deduplicated {
        /// Entries dropped by the fold
        collapsed: usize,
    },
}

/// Change notification delivered to root set subscribers.
#[derive(Debug, Clone)]
pub struct RootSetChange {
    /// What changed
    pub kind: ChangeKind,
    /// Number of entries after the change
    pub len: usize,
}

/// Ordered set of root directories, unique under [`FullPathIdentity`].
///
/// Only directories that exist at the time they are added are accepted.
/// Every membership change is committed before subscribers are notified, so
/// the `len` they receive is already current.
///
/// # Example
///
/// ```no_run
/// use dupdirs::roots::RootDirectorySet;
///
/// let mut roots = RootDirectorySet::new();
/// roots.subscribe(|change| println!("{} roots", change.len));
/// roots.add("/mnt/backup");
/// roots.add("/mnt/backup/.");
/// assert_eq!(roots.len(), 1);
/// ```
#[derive(Debug)]
pub struct RootDirectorySet {
    entries: Vec<RootEntry>,
    index: IdentityMap<FullPathIdentity, EntryId>,
    size_format: Option<SizeFormat>,
    subscribers: Subscribers<RootSetChange>,
}

impl RootDirectorySet {
    /// Create an empty set that does not compute sizes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: IdentityMap::new(FullPathIdentity),
            size_format: None,
            subscribers: Subscribers::new(),
        }
    }

    /// Create an empty set that measures every added root in the background.
    #[must_use]
    pub fn with_size_tracking(format: SizeFormat) -> Self {
        Self {
            entries: Vec::new(),
            index: IdentityMap::new(FullPathIdentity),
            size_format: Some(format),
            subscribers: Subscribers::new(),
        }
    }

    /// Add the directory at `path`.
    ///
    /// Returns `false`, without notifying, if the directory does not exist or
    /// an equal path is already present.
    pub fn add(&mut self, path: impl AsRef<Path>) -> bool {
        self.add_dir(DirectoryRef::new(path))
    }

    /// Add an already constructed [`DirectoryRef`].
    pub fn add_dir(&mut self, dir: DirectoryRef) -> bool {
        if !dir.exists() {
            log::debug!("Skipping root {}: not an existing directory", dir);
            return false;
        }
        if self.index.contains(dir.path()) {
            log::trace!("Root {} already present", dir);
            return false;
        }

        let size = self
            .size_format
            .map(|format| SizeObservable::pending(dir.path(), format));
        let entry = RootEntry::new(dir.clone(), size);
        self.index.insert(entry.path(), entry.id());
        self.entries.push(entry);
        log::debug!("Added root {}", dir);

        self.notify(ChangeKind::Added(dir));

        if let Some(size) = self.entries.last().and_then(RootEntry::size) {
            size.start();
        }
        true
    }

    /// Add each path in order. Returns how many were added.
    pub fn add_all<I, P>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        paths
            .into_iter()
            .map(|path| self.add(path))
            .filter(|added| *added)
            .count()
    }

    /// Remove the first entry whose canonical path equals `path`.
    pub fn remove(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        match self.position_of(path) {
            Some(position) => {
                let removed = self.take_at(position);
                self.notify(ChangeKind::Removed(removed.dir().clone()));
                true
            }
            None => false,
        }
    }

    /// Remove every entry whose canonical path equals `path`, notifying once.
    ///
    /// Returns the number of entries removed.
    pub fn remove_all(&mut self, path: impl AsRef<Path>) -> usize {
        let path = path.as_ref();
        let mut first_removed = None;
        let mut count = 0;
        while let Some(position) = self.position_of(path) {
            let removed = self.take_at(position);
            if first_removed.is_none() {
                first_removed = Some(removed);
            }
            count += 1;
        }
        if let Some(removed) = first_removed {
            self.notify(ChangeKind::Removed(removed.dir().clone()));
        }
        count
    }

    /// Remove this exact entry, matched by [`EntryId`].
    ///
    /// Falls back to removal by path when no entry carries the id (for
    /// example a stale clone of an entry that was removed and re-added).
    pub fn remove_exact(&mut self, entry: &RootEntry) -> bool {
        match self.entries.iter().position(|e| e.id() == entry.id()) {
            Some(position) => {
                let removed = self.take_at(position);
                self.notify(ChangeKind::Removed(removed.dir().clone()));
                true
            }
            None => self.remove(entry.path()),
        }
    }

    /// Rebuild the set by folding every entry through path identity, keeping
    /// the first of each group in order.
    ///
    /// Always notifies. Returns whether any entries were collapsed.
    pub fn dedupe(&mut self) -> bool {
        let before = self.entries.len();
        let mut index = IdentityMap::new(FullPathIdentity);
        let mut kept = Vec::with_capacity(before);

        for entry in std::mem::take(&mut self.entries) {
            if index.contains(entry.path()) {
                entry.release();
                continue;
            }
            index.insert(entry.path(), entry.id());
            kept.push(entry);
        }

        self.entries = kept;
        self.index = index;

        let collapsed = before - self.entries.len();
        if collapsed > 0 {
            log::debug!("Collapsed {} duplicate roots", collapsed);
        }
        self.notify(ChangeKind::Deduplicated { collapsed });
        collapsed > 0
    }

    /// Remove every entry. Notifies only if the set was non-empty.
    pub fn clear(&mut self) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        for entry in self.entries.drain(..) {
            entry.release();
        }
        self.index.clear();
        self.notify(ChangeKind::Cleared);
        true
    }

    /// Whether an entry equal to `path` is present.
    #[must_use]
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.index.contains(path.as_ref())
    }

    /// Whether every path in `paths` is present.
    pub fn contains_all<I, P>(&self, paths: I) -> bool
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        paths.into_iter().all(|path| self.contains(path))
    }

    /// Entry at `index`, in insertion order.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&RootEntry> {
        self.entries.get(index)
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &RootEntry> {
        self.entries.iter()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of the directories, in order, for the detector.
    #[must_use]
    pub fn snapshot(&self) -> Vec<DirectoryRef> {
        self.entries.iter().map(|e| e.dir().clone()).collect()
    }

    /// Canonical paths in order, keeping at most `max` of them.
    #[must_use]
    pub fn to_persisted(&self, max: Option<usize>) -> Vec<String> {
        self.entries
            .iter()
            .take(max.unwrap_or(usize::MAX))
            .map(|e| e.path().to_string_lossy().into_owned())
            .collect()
    }

    /// Seed the set from persisted path strings.
    ///
    /// Empty strings and paths that no longer exist are dropped. Returns how
    /// many entries were added.
    pub fn extend_from_persisted<I, S>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut added = 0;
        for path in paths {
            let path = path.as_ref().trim();
            if path.is_empty() {
                continue;
            }
            if self.add(path) {
                added += 1;
            }
        }
        added
    }

    /// Register a change callback.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&RootSetChange) + Send + Sync + 'static,
    {
        self.subscribers.subscribe(callback)
    }

    /// Remove a change callback.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    fn position_of(&self, path: &Path) -> Option<usize> {
        let policy = self.index.policy();
        let key = policy.key(path);
        self.entries.iter().position(|e| policy.key(e.path()) == key)
    }

    fn take_at(&mut self, position: usize) -> RootEntry {
        let entry = self.entries.remove(position);
        if self.index.get(entry.path()) == Some(&entry.id()) {
            self.index.remove(entry.path());
        }
        entry.release();
        log::debug!("Removed root {}", entry.dir());
        entry
    }

    fn notify(&self, kind: ChangeKind) {
        self.subscribers.notify(&RootSetChange {
            kind,
            len: self.entries.len(),
        });
    }
}

impl Default for RootDirectorySet {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RootDirectorySet {
    fn drop(&mut self) {
        for entry in &self.entries {
            entry.release();
        }
    }
}

impl<'a> IntoIterator for &'a RootDirectorySet {
    type Item = &'a RootEntry;
    type IntoIter = std::slice::Iter<'a, RootEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
