//! Application configuration management.
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. [`Config::default`]
//! 2. `config.toml` in the platform configuration directory
//!    (see [`Config::config_path`]) or an explicit file
//! 3. Environment variables prefixed with `DUPDIRS_`
//!    (e.g. `DUPDIRS_SHOW_SIZE_IN_BYTES=true`)
//!
//! ```toml
//! show_size_in_bytes = false
//! max_recent_dirs = 20
//! skip_hidden = true
//! follow_symlinks = false
//! remember_roots = true
//! compute_sizes = true
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::duplicates::DetectorConfig;
use crate::scanner::SizeFormat;

/// Prefix of environment variables that override configuration.
pub const ENV_PREFIX: &str = "DUPDIRS_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Show sizes as raw byte counts instead of KB/MB/...
    pub show_size_in_bytes: bool,
    /// Keep at most this many roots when persisting (all when unset).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_recent_dirs: Option<usize>,
    /// Ignore subdirectories whose name starts with `.`
    pub skip_hidden: bool,
    /// Treat symlinks to directories as subdirectories.
    pub follow_symlinks: bool,
    /// Persist the root list after it changes.
    pub remember_roots: bool,
    /// Measure roots and paired directories in the background.
    pub compute_sizes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            show_size_in_bytes: false,
            max_recent_dirs: None,
            skip_hidden: false,
            follow_symlinks: false,
            remember_roots: true,
            compute_sizes: true,
        }
    }
}

impl Config {
    /// Load from the platform configuration file and the environment.
    ///
    /// Falls back to defaults, with a warning, if the layers cannot be
    /// merged (for example a malformed `config.toml`).
    pub fn load() -> Self {
        let path = Self::config_path();
        match Self::figment(path.as_deref()).extract() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load config, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Load with `path` as the configuration file.
    ///
    /// A missing file contributes nothing.
    ///
    /// # Errors
    ///
    /// Returns the figment error if the file is malformed or a value has the
    /// wrong type.
    pub fn load_from_path(path: &Path) -> Result<Self, figment::Error> {
        Self::figment(Some(path)).extract()
    }

    /// The layered provider stack.
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(file) = file {
            figment = figment.merge(Toml::file(file));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Default platform-specific configuration file.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "dupdirs", "dupdirs")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// How sizes should be rendered.
    #[must_use]
    pub fn size_format(&self) -> SizeFormat {
        SizeFormat::from_show_bytes(self.show_size_in_bytes)
    }

    /// Size format to track with, or `None` when sizes are disabled.
    #[must_use]
    pub fn tracked_size_format(&self) -> Option<SizeFormat> {
        self.compute_sizes.then(|| self.size_format())
    }

    /// Detector options derived from this configuration.
    #[must_use]
    pub fn detector_config(&self) -> DetectorConfig {
        DetectorConfig::default()
            .with_skip_hidden(self.skip_hidden)
            .with_follow_symlinks(self.follow_symlinks)
    }
}
