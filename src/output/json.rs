//! JSON output formatter.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "pairs": [
//!     {
//!       "name": "photos",
//!       "first": { "path": "/r1/photos", "size": 1500, "size_display": "1.5 KB", "modified": "..." },
//!       "second": { "path": "/r2/photos", "size": 100, "size_display": "100 B", "modified": "..." }
//!     }
//!   ],
//!   "summary": {
//!     "roots": ["/r1", "/r2"],
//!     "pair_count": 1,
//!     "scan_duration_ms": 3,
//!     "exit_code": 0,
//!     "exit_code_name": "DD000"
//!   }
//! }
//! ```

use std::io::Write;

use serde::Serialize;

use crate::error::ExitCode;

use super::PairRecord;

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Roots that were compared, in order
    pub roots: Vec<String>,
    /// Number of pairs found
    pub pair_count: usize,
    /// Duration of detection in milliseconds
    pub scan_duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DD000")
    pub exit_code_name: String,
}

/// Complete JSON document.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput<'a> {
    /// Detected pairs
    pub pairs: &'a [PairRecord],
    /// Summary
    pub summary: JsonSummary,
}

impl<'a> JsonOutput<'a> {
    /// Create a JSON document.
    #[must_use]
    pub fn new(
        pairs: &'a [PairRecord],
        roots: Vec<String>,
        scan_duration_ms: u64,
        exit_code: ExitCode,
    ) -> Self {
        Self {
            pairs,
            summary: JsonSummary {
                roots,
                pair_count: pairs.len(),
                scan_duration_ms,
                exit_code: exit_code.as_i32(),
                exit_code_name: exit_code.code_prefix().to_string(),
            },
        }
    }

    /// Compact JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Write pretty-printed JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer)?;
        writer.flush()
    }
}
