//! Collection of detected pairs that follows its members' size computations.
//!
//! Membership changes are reported per pair. Size completions are reported
//! with the coarse [`PairSetChange::Reset`] signal: a front end re-reads the
//! whole collection instead of patching one row.
//!
//! A directory appearing in several pairs is measured once: entries share
//! one [`SizeObservable`] per canonical path for as long as any of them
//! holds it.

use std::path::Path;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use crate::notify::{SubscriptionId, Subscribers};
use crate::paths::{FullPathIdentity, IdentityMap};
use crate::scanner::{SizeFormat, SizeObservable};

use super::pair::DuplicatePair;

/// Change notification delivered to pair set subscribers.
#[derive(Debug, Clone)]
pub enum PairSetChange {
    /// A pair was appended
    Added(DuplicatePair),
    /// A pair was removed
    Removed(DuplicatePair),
    /// Every pair was removed
    Cleared,
    /// A member's size became available; re-read everything
    Reset,
}

/// A pair plus the background sizes of both sides.
#[derive(Debug)]
pub struct PairEntry {
    pair: DuplicatePair,
    sizes: Option<[SizeObservable; 2]>,
}

/// One measurement and the number of entries holding it.
#[derive(Debug)]
struct SharedSize {
    size: SizeObservable,
    subscription: SubscriptionId,
    holders: usize,
}

impl PairEntry {
    /// The pair.
    #[must_use]
    pub fn pair(&self) -> &DuplicatePair {
        &self.pair
    }

    /// Size of the first directory, if sizes are tracked.
    #[must_use]
    pub fn first_size(&self) -> Option<&SizeObservable> {
        self.sizes.as_ref().map(|[first, _]| first)
    }

    /// Size of the second directory, if sizes are tracked.
    #[must_use]
    pub fn second_size(&self) -> Option<&SizeObservable> {
        self.sizes.as_ref().map(|[_, second]| second)
    }
}

/// Ordered collection of [`DuplicatePair`]s, unique by ordered path pair.
#[derive(Debug)]
pub struct DuplicatePairSet {
    entries: Vec<PairEntry>,
    size_format: Option<SizeFormat>,
    shared_sizes: IdentityMap<FullPathIdentity, SharedSize>,
    subscribers: Arc<Subscribers<PairSetChange>>,
}

impl DuplicatePairSet {
    /// Create an empty set that measures both sides of every pair.
    #[must_use]
    pub fn new() -> Self {
        Self::with_size_format(SizeFormat::default())
    }

    /// Create an empty set that renders sizes with `format`.
    #[must_use]
    pub fn with_size_format(format: SizeFormat) -> Self {
        Self {
            entries: Vec::new(),
            size_format: Some(format),
            shared_sizes: IdentityMap::new(FullPathIdentity),
            subscribers: Arc::new(Subscribers::new()),
        }
    }

    /// Create an empty set that never computes sizes.
    #[must_use]
    pub fn without_sizes() -> Self {
        Self {
            entries: Vec::new(),
            size_format: None,
            shared_sizes: IdentityMap::new(FullPathIdentity),
            subscribers: Arc::new(Subscribers::new()),
        }
    }

    /// Add `pair` unless the same ordered pair is already present.
    pub fn add(&mut self, pair: DuplicatePair) -> bool {
        if self.contains(pair.first().path(), pair.second().path()) {
            log::trace!("Pair {} already present", pair);
            return false;
        }

        let mut fresh = Vec::new();
        let sizes = self.size_format.map(|format| {
            [pair.first().path(), pair.second().path()].map(|path| {
                let (size, created) = self.acquire(path, format);
                if created {
                    fresh.push(size.clone());
                }
                size
            })
        });
        self.entries.push(PairEntry {
            pair: pair.clone(),
            sizes,
        });
        self.subscribers.notify(&PairSetChange::Added(pair));

        for size in fresh {
            size.start();
        }
        true
    }

    /// Add each pair in order. Returns how many were added.
    pub fn add_all<I>(&mut self, pairs: I) -> usize
    where
        I: IntoIterator<Item = DuplicatePair>,
    {
        pairs
            .into_iter()
            .map(|pair| self.add(pair))
            .filter(|added| *added)
            .count()
    }

    /// Remove the first pair with `path` on either side.
    pub fn remove(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        match self.entries.iter().position(|e| e.pair.involves(path)) {
            Some(position) => {
                self.take_at(position);
                true
            }
            None => false,
        }
    }

    /// Remove every pair with `path` on either side.
    ///
    /// Each removed pair is reported separately. Returns how many were
    /// removed.
    pub fn remove_all(&mut self, path: impl AsRef<Path>) -> usize {
        let path = path.as_ref();
        let mut removed = 0;
        while let Some(position) = self.entries.iter().position(|e| e.pair.involves(path)) {
            self.take_at(position);
            removed += 1;
        }
        removed
    }

    /// Remove the pair with exactly `pair`'s ordered paths.
    pub fn remove_exact(&mut self, pair: &DuplicatePair) -> bool {
        let (first, second) = (pair.first().path(), pair.second().path());
        match self.entries.iter().position(|e| e.pair.matches(first, second)) {
            Some(position) => {
                self.take_at(position);
                true
            }
            None => false,
        }
    }

    /// Remove every pair. Notifies only if the set was non-empty.
    pub fn clear(&mut self) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        for entry in std::mem::take(&mut self.entries) {
            self.release(&entry);
        }
        self.subscribers.notify(&PairSetChange::Cleared);
        true
    }

    /// Whether the ordered pair `(first, second)` is present.
    #[must_use]
    pub fn contains(&self, first: impl AsRef<Path>, second: impl AsRef<Path>) -> bool {
        let (first, second) = (first.as_ref(), second.as_ref());
        self.entries.iter().any(|e| e.pair.matches(first, second))
    }

    /// Entry at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&PairEntry> {
        self.entries.get(index)
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &PairEntry> {
        self.entries.iter()
    }

    /// Copy of the pairs, in order.
    #[must_use]
    pub fn pairs(&self) -> Vec<DuplicatePair> {
        self.entries.iter().map(|e| e.pair.clone()).collect()
    }

    /// Number of pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Block until every tracked size is known or `timeout` elapses.
    ///
    /// Returns whether all sizes completed.
    pub fn wait_for_sizes(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let sizes = self
            .entries
            .iter()
            .filter_map(|e| e.sizes.as_ref())
            .flatten();

        let mut complete = true;
        for size in sizes {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if size.wait_timeout(remaining).is_pending() {
                complete = false;
            }
        }
        complete
    }

    /// Register a change callback.
    ///
    /// [`PairSetChange::Reset`] is delivered from the background thread that
    /// finished the size computation.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&PairSetChange) + Send + Sync + 'static,
    {
        self.subscribers.subscribe(callback)
    }

    /// Remove a change callback.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// The measurement of `path`, creating and subscribing to it when no
    /// entry holds one yet. The flag is set for a new, unstarted measurement.
    fn acquire(&mut self, path: &Path, format: SizeFormat) -> (SizeObservable, bool) {
        if let Some(shared) = self.shared_sizes.get_mut(path) {
            shared.holders += 1;
            return (shared.size.clone(), false);
        }

        let size = SizeObservable::pending(path, format);
        let owner: Weak<Subscribers<PairSetChange>> = Arc::downgrade(&self.subscribers);
        let subscription = size.subscribe(move |_| {
            if let Some(subscribers) = owner.upgrade() {
                subscribers.notify(&PairSetChange::Reset);
            }
        });
        self.shared_sizes.insert(
            path,
            SharedSize {
                size: size.clone(),
                subscription,
                holders: 1,
            },
        );
        (size, true)
    }

    /// Drop `entry`'s hold on its sizes; the last holder detaches them.
    fn release(&mut self, entry: &PairEntry) {
        let Some(sizes) = &entry.sizes else {
            return;
        };
        for size in sizes {
            let Some(shared) = self.shared_sizes.get_mut(size.path()) else {
                continue;
            };
            shared.holders -= 1;
            if shared.holders == 0 {
                if let Some(shared) = self.shared_sizes.remove(size.path()) {
                    shared.size.unsubscribe(shared.subscription);
                    shared.size.detach();
                }
            }
        }
    }

    fn take_at(&mut self, position: usize) {
        let entry = self.entries.remove(position);
        self.release(&entry);
        log::debug!("Removed pair {}", entry.pair);
        self.subscribers.notify(&PairSetChange::Removed(entry.pair));
    }
}

impl Default for DuplicatePairSet {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DuplicatePairSet {
    fn drop(&mut self) {
        for entry in std::mem::take(&mut self.entries) {
            self.release(&entry);
        }
    }
}

impl<'a> IntoIterator for &'a DuplicatePairSet {
    type Item = &'a PairEntry;
    type IntoIter = std::slice::Iter<'a, PairEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
