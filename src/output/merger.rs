//! Merging of downloaded snapshots
//!
//! Snapshots are read in download order. A file containing anything shaped like a
//! markup tag is an archive error page and is dropped whole. Lines of the remaining
//! files are written once, in the order they are first seen.

use crate::output::sink::ProgressSink;
use crate::MergeError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

static MARKUP_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]+>").expect("markup pattern is valid"));

/// Summary of a completed merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedOutput {
    /// The merged file
    pub path: PathBuf,

    /// Distinct lines written to the merged file
    pub lines_written: usize,

    /// Input files whose lines were merged
    pub files_merged: usize,

    /// Input files dropped because they contain markup
    pub files_rejected: Vec<PathBuf>,

    /// Input files that no longer existed
    pub files_missing: Vec<PathBuf>,
}

/// Returns true if `content` contains a tag-shaped substring such as `<html>`
///
/// # Examples
///
/// ```
/// use wayback_robots::output::contains_markup;
///
/// assert!(contains_markup("User-agent: *\n<p>oops</p>"));
/// assert!(!contains_markup("User-agent: *\nDisallow: /private"));
/// assert!(!contains_markup("Disallow: /<>"));
/// ```
pub fn contains_markup(content: &str) -> bool {
    MARKUP_PATTERN.is_match(content)
}

/// Splits `text` into lines, accepting `\n`, `\r\n` and a lone `\r` as terminators
///
/// The vertical tab, form feed, file/group/record separators, NEL and the Unicode
/// line and paragraph separators also end a line. A terminator after the final
/// line does not produce an extra empty line.
///
/// # Examples
///
/// ```
/// use wayback_robots::output::split_lines;
///
/// assert_eq!(split_lines("a\rb\r\nc\n"), vec!["a", "b", "c"]);
/// assert_eq!(split_lines("a\n\nb"), vec!["a", "", "b"]);
/// ```
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !is_line_break(c) {
            continue;
        }
        lines.push(&text[start..i]);
        start = i + c.len_utf8();
        if c == '\r' {
            if let Some(&(_, '\n')) = chars.peek() {
                chars.next();
                start += 1;
            }
        }
    }

    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0b}' | '\u{0c}' | '\u{1c}' | '\u{1d}' | '\u{1e}' | '\u{85}'
            | '\u{2028}' | '\u{2029}'
    )
}

/// Merges `files` into `output`, writing each distinct line once
///
/// The output file is truncated first. Missing inputs are skipped, inputs that
/// contain markup are excluded entirely. Invalid UTF-8 is replaced rather than
/// treated as an error.
///
/// # Arguments
///
/// * `files` - Snapshot files in download order
/// * `output` - Destination of the merged lines
/// * `sink` - Receives verbose diagnostics about skipped files
///
/// # Returns
///
/// * `Ok(MergedOutput)` - Counts and the list of excluded files
/// * `Err(MergeError)` - An input could not be read or the output could not be written
pub fn merge(
    files: &[PathBuf],
    output: &Path,
    sink: &dyn ProgressSink,
) -> Result<MergedOutput, MergeError> {
    let write_err = |source: std::io::Error| MergeError::Write {
        path: output.display().to_string(),
        source,
    };

    let mut writer = BufWriter::new(File::create(output).map_err(write_err)?);
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = MergedOutput {
        path: output.to_path_buf(),
        lines_written: 0,
        files_merged: 0,
        files_rejected: Vec::new(),
        files_missing: Vec::new(),
    };

    for path in files {
        if !path.exists() {
            sink.detail(&format!("Skipping {} because it no longer exists", path.display()));
            merged.files_missing.push(path.clone());
            continue;
        }

        let bytes = std::fs::read(path).map_err(|source| MergeError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let content = String::from_utf8_lossy(&bytes);

        if contains_markup(&content) {
            sink.detail(&format!(
                "Skipping {} because it contains HTML tags",
                path.display()
            ));
            merged.files_rejected.push(path.clone());
            continue;
        }

        for line in split_lines(&content) {
            if seen.contains(line) {
                continue;
            }
            writeln!(writer, "{}", line).map_err(write_err)?;
            seen.insert(line.to_string());
            merged.lines_written += 1;
        }
        merged.files_merged += 1;
    }

    writer.flush().map_err(write_err)?;

    Ok(merged)
}
