//! CSV output formatter.
//!
//! One row per pair.
//!
//! # Columns
//!
//! - `pair_id`: 1-based position of the pair
//! - `name`: shared directory name
//! - `first_path`, `first_size`, `first_modified`
//! - `second_path`, `second_size`, `second_modified`
//!
//! Sizes are byte counts; they are empty when not computed.

use std::io;

use serde::Serialize;
use thiserror::Error;

use super::PairRecord;

/// Errors that can occur during CSV output generation.
#[derive(Debug, Error)]
pub enum CsvOutputError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error during CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    pair_id: usize,
    name: &'a str,
    first_path: &'a str,
    first_size: Option<u64>,
    first_modified: &'a str,
    second_path: &'a str,
    second_size: Option<u64>,
    second_modified: &'a str,
}

/// CSV output formatter.
pub struct CsvOutput<'a> {
    records: &'a [PairRecord],
}

impl<'a> CsvOutput<'a> {
    /// Create a CSV formatter.
    #[must_use]
    pub fn new(records: &'a [PairRecord]) -> Self {
        Self { records }
    }

    /// Write the CSV output to the given writer.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<(), CsvOutputError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        for (idx, record) in self.records.iter().enumerate() {
            csv_writer.serialize(CsvRow {
                pair_id: idx + 1,
                name: &record.name,
                first_path: &record.first.path,
                first_size: record.first.size,
                first_modified: &record.first.modified,
                second_path: &record.second.path,
                second_size: record.second.size,
                second_modified: &record.second.modified,
            })?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Generate CSV output as a string.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if serialization fails.
    pub fn to_csv_string(&self) -> Result<String, CsvOutputError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
