//! URL handling module for Wayback-Robots
//!
//! This module provides domain normalization and the construction of archive
//! index and snapshot URLs.

mod endpoints;
mod normalize;

// Re-export main functions
pub use endpoints::ArchiveEndpoints;
pub use normalize::{is_valid_domain, normalize_domain};
