//! Duplicate directory detection module.
//!
//! This module provides functionality for:
//! - Pairing same-named immediate subdirectories across roots ([`detector`])
//! - The detected pair value ([`pair`])
//! - The change-notifying pair collection ([`pair_set`])

pub mod detector;
pub mod pair;
pub mod pair_set;

pub use detector::{DetectError, DetectorConfig, DuplicateDetector};
pub use pair::DuplicatePair;
pub use pair_set::{DuplicatePairSet, PairEntry, PairSetChange};
