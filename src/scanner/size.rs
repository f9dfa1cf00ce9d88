//! Recursive directory size and byte-count formatting.
//!
//! Size is advisory display data: anything that goes wrong while walking
//! (an entry vanishing mid-walk, a permission error, a broken link)
//! contributes zero bytes instead of failing the whole computation.

use std::path::Path;

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

/// Shown while a size is still being computed.
///
/// Wide enough that a column sized from it does not jump when the real
/// value arrives.
pub const SIZE_PLACEHOLDER: &str = "                              ";

const UNITS: [&str; 8] = ["B", "KB", "MB", "GB", "TB", "PB", "EB", "ZB"];

/// How byte counts are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeFormat {
    /// Largest decimal unit keeping the value below 1000, e.g. `1.5 KB`
    #[default]
    Human,
    /// Raw byte count, e.g. `1500 B`
    Bytes,
}

impl SizeFormat {
    /// Pick the format from the "show size in bytes" switch.
    #[must_use]
    pub fn from_show_bytes(show_bytes: bool) -> Self {
        if show_bytes {
            Self::Bytes
        } else {
            Self::Human
        }
    }

    /// Render `bytes` in this format.
    #[must_use]
    pub fn format(self, bytes: u64) -> String {
        match self {
            Self::Human => format_size(bytes),
            Self::Bytes => format!("{} B", bytes),
        }
    }
}

/// Format a byte count with decimal (×1000) units up to zettabytes.
///
/// The value is rounded to two decimals and trailing zeros are dropped.
///
/// ```
/// use dupdirs::scanner::format_size;
///
/// assert_eq!(format_size(100), "100 B");
/// assert_eq!(format_size(1_500), "1.5 KB");
/// assert_eq!(format_size(1_234_567), "1.23 MB");
/// ```
#[must_use]
pub fn format_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }

    // 999_999 B rounds to 1000.00 KB; show it as 1 MB instead
    if round2(value) >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }

    format!("{} {}", trim_decimals(value), UNITS[unit])
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn trim_decimals(value: f64) -> String {
    let fixed = format!("{:.2}", value);
    fixed
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Total size in bytes of every file below `path`.
///
/// Returns `None` if `path` is not an existing directory. Symbolic links are
/// not followed and count as zero.
#[must_use]
pub fn measure(path: &Path) -> Option<u64> {
    if !path.is_dir() {
        return None;
    }

    let total = WalkDir::new(path)
        .min_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::trace!("Skipping unreadable entry under {}: {}", path.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| match entry.metadata() {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                log::trace!("File vanished while sizing {}: {}", entry.path().display(), e);
                0
            }
        })
        .sum();

    Some(total)
}

/// Total size in bytes of every file below `path`; zero if it does not exist.
#[must_use]
pub fn directory_size(path: &Path) -> u64 {
    measure(path).unwrap_or(0)
}
