//! Timestamp list handling
//!
//! Timestamps are opaque tokens, one per line. Blank lines are kept as empty
//! tokens; only the terminator after the final line is dropped.

use crate::output::split_lines;
use std::io;
use std::path::Path;

/// Splits timestamp text into tokens, one per line
///
/// # Examples
///
/// ```
/// use wayback_robots::archive::parse_timestamps;
///
/// let tokens = parse_timestamps("20200101000000\n\n20200601000000\n");
/// assert_eq!(tokens, vec!["20200101000000", "", "20200601000000"]);
/// ```
pub fn parse_timestamps(content: &str) -> Vec<String> {
    split_lines(content).into_iter().map(str::to_string).collect()
}

/// Reads a timestamp list file
///
/// Invalid UTF-8 is replaced rather than rejected.
pub fn read_timestamps(path: &Path) -> io::Result<Vec<String>> {
    let bytes = std::fs::read(path)?;
    Ok(parse_timestamps(&String::from_utf8_lossy(&bytes)))
}
