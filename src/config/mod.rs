//! Configuration module for Wayback-Robots
//!
//! This module handles loading, parsing, and validating the optional TOML configuration file.
//! Every field has a default, so a run without a config file uses [`Config::default`].
//!
//! # Example
//!
//! ```no_run
//! use wayback_robots::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("wayback.toml")).unwrap();
//! println!("Snapshots per run: {}", config.archive.limit);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{ArchiveConfig, Config, FetchConfig, OutputConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
