//! Same-name subdirectory detection across root directories.
//!
//! # Overview
//!
//! Roots are visited in order and each root's immediate subdirectories in
//! filesystem enumeration order. A name-keyed table ([`LeafNameIdentity`])
//! remembers the first child seen for every name; a later child with the same
//! name is paired with that first child and is not inserted itself. For N
//! roots sharing a child name this yields N-1 pairs, all with the same
//! `first`.
//!
//! Detection never recurses below the immediate children of a root and never
//! modifies the filesystem.
//!
//! # Example
//!
//! ```no_run
//! use dupdirs::duplicates::DuplicateDetector;
//! use dupdirs::scanner::DirectoryRef;
//!
//! let roots = vec![DirectoryRef::new("/mnt/old"), DirectoryRef::new("/mnt/new")];
//! let detector = DuplicateDetector::with_defaults();
//! match detector.detect(&roots) {
//!     Ok(pairs) => {
//!         for pair in &pairs {
//!             println!("{}", pair);
//!         }
//!     }
//!     Err(e) => eprintln!("Scan failed: {}", e),
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::paths::{same_path, IdentityMap, LeafNameIdentity};
use crate::progress::{ProgressCallback, PHASE_SCANNING};
use crate::roots::RootDirectorySet;
use crate::scanner::DirectoryRef;

use super::pair::DuplicatePair;

/// Errors that abort a detection run.
///
/// No partial pair list is ever returned alongside one of these.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    /// Listing a root's children failed.
    #[error("Failed to list {path}: {source}")]
    Enumeration {
        /// Directory being listed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Listing a root's children was not permitted.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,
}

impl DetectError {
    fn from_io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::PermissionDenied {
            Self::PermissionDenied(path.to_path_buf())
        } else {
            Self::Enumeration {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

/// Options controlling which children count as subdirectories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetectorConfig {
    /// Ignore children whose name starts with `.`
    pub skip_hidden: bool,
    /// Treat a symlink pointing at a directory as a subdirectory
    pub follow_symlinks: bool,
}

impl DetectorConfig {
    /// Set whether hidden children are skipped.
    #[must_use]
    pub fn with_skip_hidden(mut self, skip: bool) -> Self {
        self.skip_hidden = skip;
        self
    }

    /// Set whether symlinks to directories count as subdirectories.
    #[must_use]
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }
}

/// Finds same-named immediate subdirectories under different roots.
///
/// Detection is synchronous and single-threaded.
#[derive(Clone, Default)]
pub struct DuplicateDetector {
    config: DetectorConfig,
    shutdown_flag: Option<Arc<AtomicBool>>,
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for DuplicateDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuplicateDetector")
            .field("config", &self.config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl DuplicateDetector {
    /// Create a detector with the given configuration.
    #[must_use]
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            shutdown_flag: None,
            progress_callback: None,
        }
    }

    /// Create a detector with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Detect duplicate pairs among the current members of `roots`.
    ///
    /// # Errors
    ///
    /// See [`DuplicateDetector::detect`].
    pub fn detect_in(&self, roots: &RootDirectorySet) -> Result<Vec<DuplicatePair>, DetectError> {
        self.detect(&roots.snapshot())
    }

    /// Detect duplicate pairs among `roots`, in order.
    ///
    /// Fewer than two roots yield an empty result. A root that no longer
    /// exists, or is not a directory, contributes no children. A root listed
    /// more than once never pairs a child with itself.
    ///
    /// # Errors
    ///
    /// Returns `DetectError` if:
    /// - listing a root's children fails
    /// - the shutdown flag is raised during the scan
    pub fn detect(&self, roots: &[DirectoryRef]) -> Result<Vec<DuplicatePair>, DetectError> {
        if roots.len() < 2 {
            log::debug!("{} root(s): nothing to compare", roots.len());
            return Ok(Vec::new());
        }

        let start_time = Instant::now();
        log::info!("Scanning {} roots for duplicate directories", roots.len());

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_start(PHASE_SCANNING, roots.len());
        }

        let result = self.pair_children(roots);

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end(PHASE_SCANNING);
        }

        let pairs = result?;
        log::info!(
            "Found {} duplicate pairs in {:.2?}",
            pairs.len(),
            start_time.elapsed()
        );
        Ok(pairs)
    }

    fn pair_children(&self, roots: &[DirectoryRef]) -> Result<Vec<DuplicatePair>, DetectError> {
        let mut seen: IdentityMap<LeafNameIdentity, DirectoryRef> =
            IdentityMap::new(LeafNameIdentity);
        let mut pairs = Vec::new();

        for (index, root) in roots.iter().enumerate() {
            if self.is_shutdown_requested() {
                log::info!("Detection interrupted by shutdown signal");
                return Err(DetectError::Interrupted);
            }
            if let Some(ref callback) = self.progress_callback {
                callback.on_progress(index + 1, &root.path().to_string_lossy());
            }

            for child in self.subdirectories(root)? {
                match seen.get(child.path()) {
                    // A root listed twice reaches the same child again
                    Some(first) if same_path(first.path(), child.path()) => {}
                    Some(first) => {
                        log::trace!("{} duplicates {}", child, first);
                        pairs.push(DuplicatePair::new(first.clone(), child));
                    }
                    None => {
                        let key = child.path().to_path_buf();
                        seen.insert(&key, child);
                    }
                }
            }
        }

        Ok(pairs)
    }

    /// Immediate subdirectories of `root`, in enumeration order.
    fn subdirectories(&self, root: &DirectoryRef) -> Result<Vec<DirectoryRef>, DetectError> {
        let path = root.path();
        if !root.exists() {
            log::debug!("Skipping root {}: not an existing directory", root);
            return Ok(Vec::new());
        }

        let reader = match fs::read_dir(path) {
            Ok(reader) => reader,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("Root {} vanished before listing", root);
                return Ok(Vec::new());
            }
            Err(e) => return Err(DetectError::from_io(path, e)),
        };

        let mut children = Vec::new();
        for entry in reader {
            if self.is_shutdown_requested() {
                return Err(DetectError::Interrupted);
            }

            let entry = entry.map_err(|e| DetectError::from_io(path, e))?;
            if self.config.skip_hidden && entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }

            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(DetectError::from_io(&entry.path(), e)),
            };

            let is_subdirectory = if file_type.is_dir() {
                true
            } else if file_type.is_symlink() && self.config.follow_symlinks {
                // Broken links are simply not directories
                fs::metadata(entry.path()).is_ok_and(|m| m.is_dir())
            } else {
                false
            };

            if is_subdirectory {
                children.push(DirectoryRef::new(entry.path()));
            }
        }

        Ok(children)
    }
}
