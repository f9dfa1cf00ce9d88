//! Unicode and case normalization for comparison keys.
//!
//! macOS stores file names decomposed (NFD) while Windows and Linux usually
//! hand out composed (NFC) names, so the same visible name can arrive as two
//! different byte strings:
//!
//! - NFC: `café` - 'é' is U+00E9
//! - NFD: `café` - 'e' U+0065 + combining acute accent U+0301
//!
//! Keys follow the host's native name rules. On macOS, whose filesystems
//! treat both spellings as one name, keys are NFC and name keys are case
//! folded. On Windows name keys are case folded only. Everywhere else keys
//! are the raw bytes of the name, so two spellings are two directories.
//!
//! Names that are not valid Unicode are never converted: their key is the
//! name itself, compared byte for byte.
//!
//! # Example
//!
//! ```
//! use dupdirs::paths::normalize::normalize_str;
//!
//! assert_eq!(normalize_str("cafe\u{0301}"), normalize_str("café"));
//! ```

use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::path::Path;

use unicode_normalization::UnicodeNormalization;

/// Whether directory names compare case-insensitively on this host.
pub const CASE_INSENSITIVE_NAMES: bool = cfg!(any(windows, target_os = "macos"));

/// Whether NFC and NFD spellings of a name denote the same entry on this host.
pub const NORMALIZATION_INSENSITIVE_NAMES: bool = cfg!(target_os = "macos");

/// Normalize a string to NFC (Composed) form.
#[must_use]
pub fn normalize_str(s: &str) -> String {
    s.nfc().collect()
}

/// Check if a string is already in NFC form.
///
/// ```
/// use dupdirs::paths::normalize::is_nfc;
///
/// assert!(is_nfc("café"));
/// assert!(!is_nfc("cafe\u{0301}"));
/// ```
#[must_use]
pub fn is_nfc(s: &str) -> bool {
    unicode_normalization::is_nfc(s)
}

fn host_form(text: &str) -> Cow<'_, str> {
    if NORMALIZATION_INSENSITIVE_NAMES {
        Cow::Owned(normalize_str(text))
    } else {
        Cow::Borrowed(text)
    }
}

/// Comparison key for a single directory name.
///
/// NFC when [`NORMALIZATION_INSENSITIVE_NAMES`] holds, lowercased when
/// [`CASE_INSENSITIVE_NAMES`] holds, otherwise the name unchanged.
#[must_use]
pub fn name_key(name: &OsStr) -> OsString {
    let Some(text) = name.to_str() else {
        return name.to_os_string();
    };
    let text = host_form(text);
    if CASE_INSENSITIVE_NAMES {
        OsString::from(text.to_lowercase())
    } else {
        OsString::from(text.into_owned())
    }
}

/// Comparison key for a whole path. Never case folded.
///
/// The caller is expected to pass an already canonical path.
#[must_use]
pub fn path_key(path: &Path) -> OsString {
    match path.as_os_str().to_str() {
        Some(text) => OsString::from(host_form(text).into_owned()),
        None => path.as_os_str().to_os_string(),
    }
}
