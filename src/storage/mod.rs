//! Storage module for run artifacts
//!
//! Everything a run produces lives in flat files inside one folder per domain.
//! There is no other persistence.

mod layout;

pub use layout::{OutputDirectory, MERGED_FILE, TIMESTAMP_LOG};
