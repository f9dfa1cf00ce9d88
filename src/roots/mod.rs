//! Root directory collection.
//!
//! This module provides:
//! - [`RootDirectorySet`]: the ordered, path-unique set of roots the user
//!   selected, with per-instance change notification
//! - [`RootEntry`]: one member, carrying an [`EntryId`] and an optional
//!   background size

pub mod entry;
pub mod set;

pub use entry::{EntryId, RootEntry};
pub use set::{ChangeKind, RootDirectorySet, RootSetChange};
