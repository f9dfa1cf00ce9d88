//! The owning context tying roots, pairs, detection and persistence together.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::duplicates::{DetectError, DuplicateDetector, DuplicatePairSet};
use crate::roots::RootDirectorySet;

use super::data::PersistedState;
use super::io::{StateError, StateStore};

/// One user session: the single writer of both collections.
///
/// # Example
///
/// ```no_run
/// use dupdirs::config::Config;
/// use dupdirs::session::{Session, StateStore};
///
/// let mut session = Session::open(Config::load(), StateStore::default_location());
/// session.add_roots(["/mnt/old", "/mnt/new"]);
/// if session.can_scan() {
///     let found = session.scan().expect("scan failed");
///     println!("{} duplicate pairs", found);
/// }
/// ```
#[derive(Debug)]
pub struct Session {
    config: Config,
    store: Option<StateStore>,
    roots: RootDirectorySet,
    pairs: DuplicatePairSet,
    initial_dir: Option<PathBuf>,
    autosave: bool,
}

impl Session {
    /// Open a session, seeding the roots and initial directory from `store`.
    #[must_use]
    pub fn open(config: Config, store: Option<StateStore>) -> Self {
        Self::open_with(config, store, true)
    }

    /// Like [`Session::open`], but measures roots only when `root_sizes` is
    /// set. Pair sizes still follow [`Config::compute_sizes`].
    #[must_use]
    pub fn open_with(config: Config, store: Option<StateStore>, root_sizes: bool) -> Self {
        let state = store
            .as_ref()
            .map(StateStore::load_or_reset)
            .unwrap_or_default();

        let format = config.tracked_size_format();
        let mut roots = match format.filter(|_| root_sizes) {
            Some(format) => RootDirectorySet::with_size_tracking(format),
            None => RootDirectorySet::new(),
        };
        let pairs = match format {
            Some(format) => DuplicatePairSet::with_size_format(format),
            None => DuplicatePairSet::without_sizes(),
        };

        let restored = roots.extend_from_persisted(&state.last_dir_list);
        if restored < state.last_dir_list.len() {
            log::debug!(
                "Dropped {} saved roots that no longer exist",
                state.last_dir_list.len() - restored
            );
        }

        Self {
            autosave: config.remember_roots,
            initial_dir: state.initial_directory(),
            config,
            store,
            roots,
            pairs,
        }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The root directories.
    #[must_use]
    pub fn roots(&self) -> &RootDirectorySet {
        &self.roots
    }

    /// Pairs found by the last scan.
    #[must_use]
    pub fn pairs(&self) -> &DuplicatePairSet {
        &self.pairs
    }

    /// Directory to start from when choosing roots, if one was set.
    #[must_use]
    pub fn initial_directory(&self) -> Option<&Path> {
        self.initial_dir.as_deref()
    }

    /// Enable or disable saving after every root change.
    pub fn set_autosave(&mut self, autosave: bool) {
        self.autosave = autosave;
    }

    /// Add roots in order. Returns how many were added.
    pub fn add_roots<I, P>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let added = self.roots.add_all(paths);
        if added > 0 {
            self.autosave();
        }
        added
    }

    /// Remove one root. Existing pairs are kept until the next scan.
    pub fn remove_root(&mut self, path: impl AsRef<Path>) -> bool {
        let removed = self.roots.remove(path);
        if removed {
            self.autosave();
        }
        removed
    }

    /// Remove every root.
    pub fn clear_roots(&mut self) -> bool {
        let cleared = self.roots.clear();
        if cleared {
            self.autosave();
        }
        cleared
    }

    /// Set the directory to start from when choosing roots.
    pub fn set_initial_directory(&mut self, path: impl AsRef<Path>) {
        self.initial_dir = Some(crate::paths::lexical_canonical(path.as_ref()));
        self.autosave();
    }

    /// Whether there are enough roots to compare.
    #[must_use]
    pub fn can_scan(&self) -> bool {
        self.roots.len() >= 2
    }

    /// A detector configured from [`Session::config`].
    #[must_use]
    pub fn detector(&self) -> DuplicateDetector {
        DuplicateDetector::new(self.config.detector_config())
    }

    /// Rescan with the configured detector. Returns the number of pairs.
    ///
    /// # Errors
    ///
    /// See [`Session::scan_with`].
    pub fn scan(&mut self) -> Result<usize, DetectError> {
        let detector = self.detector();
        self.scan_with(&detector)
    }

    /// Clear the pairs, dedupe the roots, detect, and repopulate the pairs.
    ///
    /// # Errors
    ///
    /// Propagates the detection error; the pair set is left empty.
    pub fn scan_with(&mut self, detector: &DuplicateDetector) -> Result<usize, DetectError> {
        self.pairs.clear();
        self.roots.dedupe();
        let found = detector.detect_in(&self.roots)?;
        Ok(self.pairs.add_all(found))
    }

    /// The state that [`Session::save`] writes.
    #[must_use]
    pub fn persisted_state(&self) -> PersistedState {
        PersistedState::new(
            self.initial_dir.as_deref(),
            self.roots.to_persisted(self.config.max_recent_dirs),
        )
    }

    /// Write the roots and initial directory to the store, if any.
    ///
    /// # Errors
    ///
    /// Returns the store's error.
    pub fn save(&self) -> Result<(), StateError> {
        match &self.store {
            Some(store) => store.save(&self.persisted_state()),
            None => Ok(()),
        }
    }

    fn autosave(&self) {
        if !self.autosave {
            return;
        }
        if let Err(e) = self.save() {
            log::warn!("Failed to save session state: {}", e);
        }
    }
}
