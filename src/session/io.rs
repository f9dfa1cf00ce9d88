//! Reading and writing the state file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use super::data::PersistedState;

/// File name of the state file inside the platform data directory.
pub const STATE_FILE_NAME: &str = "state.toml";

/// Errors raised by [`StateStore`].
#[derive(thiserror::Error, Debug)]
pub enum StateError {
    /// The file exists but is not valid state TOML.
    #[error("Malformed state file {path}: {source}")]
    Malformed {
        /// State file
        path: PathBuf,
        /// Parse error
        #[source]
        source: toml::de::Error,
    },

    /// Reading, writing or deleting the file failed.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// State file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The state could not be encoded.
    #[error("Failed to encode state: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// TOML store for [`PersistedState`].
///
/// The store only ever touches its own file.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Use the state file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Use `state.toml` in the platform data directory.
    #[must_use]
    pub fn default_location() -> Option<Self> {
        ProjectDirs::from("com", "dupdirs", "dupdirs")
            .map(|dirs| Self::new(dirs.data_dir().join(STATE_FILE_NAME)))
    }

    /// Path of the state file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the state. A missing file is the default state.
    ///
    /// # Errors
    ///
    /// [`StateError::Malformed`] for unparsable content, [`StateError::Io`]
    /// when the file cannot be read.
    pub fn load(&self) -> Result<PersistedState, StateError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(PersistedState::default());
            }
            Err(source) => {
                return Err(StateError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        toml::from_str(&content).map_err(|source| StateError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    /// Read the state, never failing.
    ///
    /// A malformed file is deleted and the default state returned; other
    /// failures are logged and also yield the default state.
    pub fn load_or_reset(&self) -> PersistedState {
        match self.load() {
            Ok(state) => state,
            Err(e @ StateError::Malformed { .. }) => {
                log::warn!("{}; discarding saved roots", e);
                if let Err(e) = self.reset() {
                    log::warn!("{}", e);
                }
                PersistedState::default()
            }
            Err(e) => {
                log::warn!("{}; starting with no saved roots", e);
                PersistedState::default()
            }
        }
    }

    /// Write `state`, creating the parent directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing fails.
    pub fn save(&self, state: &PersistedState) -> Result<(), StateError> {
        let content = toml::to_string_pretty(state)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StateError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&self.path, content).map_err(|source| StateError::Io {
            path: self.path.clone(),
            source,
        })?;
        log::debug!("Saved state to {}", self.path.display());
        Ok(())
    }

    /// Delete the state file. Returns whether a file was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be deleted.
    pub fn reset(&self) -> Result<bool, StateError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StateError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}
