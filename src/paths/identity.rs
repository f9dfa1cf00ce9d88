//! Equality and hashing strategies over filesystem paths.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;

use super::lexical_canonical;
use super::normalize::{name_key, path_key};

/// A comparison policy over paths.
///
/// Implementations map a path to a key; two paths are equal under the policy
/// iff their keys are equal, and they hash alike for the same reason.
pub trait PathIdentity {
    /// The comparison key.
    type Key: Eq + Hash + Clone + fmt::Debug;

    /// Compute the comparison key for `path`. Never fails, even when `path`
    /// does not exist.
    fn key(&self, path: &Path) -> Self::Key;

    /// Whether `a` and `b` are equal under this policy.
    fn same(&self, a: &Path, b: &Path) -> bool {
        self.key(a) == self.key(b)
    }

    /// Hash of `path` consistent with [`PathIdentity::same`].
    fn hash_of(&self, path: &Path) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.key(path).hash(&mut hasher);
        hasher.finish()
    }
}

/// Paths are equal iff their final component is equal.
///
/// A path with no final component (`/`, or one ending in `..`) keys as the
/// empty name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LeafNameIdentity;

impl PathIdentity for LeafNameIdentity {
    type Key = OsString;

    fn key(&self, path: &Path) -> OsString {
        path.file_name().map(name_key).unwrap_or_default()
    }
}

/// Paths are equal iff their lexically canonical absolute forms are equal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FullPathIdentity;

impl PathIdentity for FullPathIdentity {
    type Key = OsString;

    fn key(&self, path: &Path) -> OsString {
        path_key(&lexical_canonical(path))
    }
}

/// Whether `a` and `b` share a leaf name.
#[must_use]
pub fn same_name(a: impl AsRef<Path>, b: impl AsRef<Path>) -> bool {
    LeafNameIdentity.same(a.as_ref(), b.as_ref())
}

/// Hash of the leaf name of `path`.
#[must_use]
pub fn hash_by_name(path: impl AsRef<Path>) -> u64 {
    LeafNameIdentity.hash_of(path.as_ref())
}

/// Whether `a` and `b` canonicalize to the same absolute path.
#[must_use]
pub fn same_path(a: impl AsRef<Path>, b: impl AsRef<Path>) -> bool {
    FullPathIdentity.same(a.as_ref(), b.as_ref())
}

/// Hash of the canonical form of `path`.
#[must_use]
pub fn hash_by_path(path: impl AsRef<Path>) -> u64 {
    FullPathIdentity.hash_of(path.as_ref())
}

/// A lookup table whose keys are paths compared through an explicit policy.
///
/// ```
/// use dupdirs::paths::{IdentityMap, LeafNameIdentity};
/// use std::path::Path;
///
/// let mut by_name = IdentityMap::new(LeafNameIdentity);
/// by_name.insert(Path::new("/a/music"), 1);
/// assert_eq!(by_name.get(Path::new("/b/music")), Some(&1));
/// ```
pub struct IdentityMap<P: PathIdentity, V> {
    policy: P,
    entries: HashMap<P::Key, V>,
}

impl<P: PathIdentity, V> IdentityMap<P, V> {
    /// Create an empty map using `policy` for every lookup.
    #[must_use]
    pub fn new(policy: P) -> Self {
        Self {
            policy,
            entries: HashMap::new(),
        }
    }

    /// The policy this map compares through.
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Look up the value stored under a path equal to `path`.
    pub fn get(&self, path: &Path) -> Option<&V> {
        self.entries.get(&self.policy.key(path))
    }

    /// Mutable access to the value stored under a path equal to `path`.
    pub fn get_mut(&mut self, path: &Path) -> Option<&mut V> {
        self.entries.get_mut(&self.policy.key(path))
    }

    /// Whether a path equal to `path` is present.
    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(&self.policy.key(path))
    }

    /// Insert `value` under `path`, returning the value it replaced.
    pub fn insert(&mut self, path: &Path, value: V) -> Option<V> {
        self.entries.insert(self.policy.key(path), value)
    }

    /// Remove the value stored under a path equal to `path`.
    pub fn remove(&mut self, path: &Path) -> Option<V> {
        self.entries.remove(&self.policy.key(path))
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<P: PathIdentity + fmt::Debug, V: fmt::Debug> fmt::Debug for IdentityMap<P, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityMap")
            .field("policy", &self.policy)
            .field("entries", &self.entries)
            .finish()
    }
}
