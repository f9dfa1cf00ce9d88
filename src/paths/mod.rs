//! Path canonicalization and comparison policies.
//!
//! Two different notions of "the same directory" are needed:
//!
//! - [`FullPathIdentity`]: two paths are the same iff their lexically
//!   canonical absolute forms are equal. The root set is deduplicated with it.
//! - [`LeafNameIdentity`]: two paths are the same iff their final component is
//!   equal. Only the duplicate detector uses it, to match children across roots.
//!
//! Neither policy is baked into [`crate::scanner::DirectoryRef`]; callers pick
//! one explicitly and hand it to an [`IdentityMap`] or call it directly.
//!
//! # Example
//!
//! ```
//! use dupdirs::paths::{same_name, same_path};
//!
//! assert!(same_name("/a/photos", "/b/photos"));
//! assert!(!same_path("/a/photos", "/b/photos"));
//! assert!(same_path("/a/./photos", "/a/x/../photos"));
//! ```

pub mod identity;
pub mod normalize;

use std::path::{Component, Path, PathBuf};

pub use identity::{
    hash_by_name, hash_by_path, same_name, same_path, FullPathIdentity, IdentityMap,
    LeafNameIdentity, PathIdentity,
};

/// Make `path` absolute and fold `.` and `..` components without touching
/// the filesystem (symlinks are left as written).
///
/// Relative paths are resolved against the current working directory. A `..`
/// at the filesystem root stays at the root. Trailing separators disappear.
///
/// # Example
///
/// ```
/// use dupdirs::paths::lexical_canonical;
/// use std::path::Path;
///
/// if cfg!(unix) {
///     assert_eq!(lexical_canonical(Path::new("/a/b/../c/./")), Path::new("/a/c"));
/// }
/// ```
#[must_use]
pub fn lexical_canonical(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(e) => {
                log::debug!(
                    "Cannot resolve current directory for {}: {}",
                    path.display(),
                    e
                );
                path.to_path_buf()
            }
        }
    };

    let mut canonical = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => canonical.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                canonical.pop();
            }
            Component::Normal(name) => canonical.push(name),
        }
    }
    canonical
}
