//! Session state and persistence.
//!
//! # Architecture
//!
//! * [`data`]: the persisted root list and initial directory.
//! * [`io`]: the TOML [`StateStore`], including malformed-file recovery.
//! * [`context`]: the [`Session`] that owns both collections and drives
//!   detection.

pub mod context;
pub mod data;
pub mod io;

pub use context::Session;
pub use data::PersistedState;
pub use io::{StateError, StateStore, STATE_FILE_NAME};
