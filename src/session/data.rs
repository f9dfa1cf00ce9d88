//! Data persisted between runs.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::paths::same_path;

/// Contents of the state file.
///
/// ```toml
/// default_dir = "/home/user/archive"
/// last_dir_list = ["/mnt/old", "/mnt/new"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    /// Directory to start from when choosing new roots.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_dir: Option<String>,
    /// Roots from the last session, in order.
    pub last_dir_list: Vec<String>,
}

impl PersistedState {
    /// Build the state to write.
    ///
    /// `default_dir` is only recorded when it differs from the current
    /// working directory.
    #[must_use]
    pub fn new(default_dir: Option<&Path>, last_dir_list: Vec<String>) -> Self {
        let cwd = std::env::current_dir().ok();
        let default_dir = default_dir
            .filter(|dir| !cwd.as_deref().is_some_and(|cwd| same_path(dir, cwd)))
            .map(|dir| dir.to_string_lossy().into_owned());
        Self {
            default_dir,
            last_dir_list,
        }
    }

    /// The recorded initial directory, if it still exists.
    #[must_use]
    pub fn initial_directory(&self) -> Option<PathBuf> {
        self.default_dir
            .as_deref()
            .map(str::trim)
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .filter(|dir| dir.is_dir())
    }
}
