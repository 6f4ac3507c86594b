//! Run report and its console rendering

use crate::output::merger::MergedOutput;
use crate::output::sink::Verbosity;
use crate::state::DownloadRecord;
use chrono::{DateTime, Utc};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Cleaned domain
    pub domain: String,

    /// Folder holding the run artifacts
    pub directory: PathBuf,

    /// Timestamps resolved from the index or the supplied list
    pub timestamps: Vec<String>,

    /// Attempted snapshots in request order (the last one may be a failure)
    pub records: Vec<DownloadRecord>,

    /// Timestamp whose failure stopped the snapshot loop
    pub halted_at: Option<String>,

    /// Result of the merge step
    pub merged: MergedOutput,

    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn downloaded_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_downloaded()).count()
    }

    /// The failed record that stopped the snapshot loop, if any
    pub fn halting_record(&self) -> Option<&DownloadRecord> {
        self.records.last().filter(|r| !r.is_downloaded())
    }

    /// Timestamps that were never requested because the loop halted early
    pub fn not_attempted(&self) -> &[String] {
        let attempted = self.records.len().min(self.timestamps.len());
        &self.timestamps[attempted..]
    }
}

/// Renders a run report
///
/// Files dropped for containing markup are listed only in verbose mode.
pub fn write_report(
    out: &mut impl Write,
    report: &RunReport,
    verbosity: Verbosity,
) -> io::Result<()> {
    writeln!(out, "=== Wayback robots.txt: {} ===\n", report.domain)?;

    writeln!(out, "Snapshots:")?;
    writeln!(out, "  Timestamps resolved: {}", report.timestamps.len())?;
    writeln!(out, "  Downloaded: {}", report.downloaded_count())?;
    if let Some(record) = report.halting_record() {
        writeln!(out, "  Halted at: {} ({})", record.timestamp, record.outcome)?;
        writeln!(out, "  Not attempted: {}", report.not_attempted().len())?;
    }
    writeln!(out)?;

    writeln!(out, "Merge:")?;
    writeln!(out, "  Files merged: {}", report.merged.files_merged)?;
    writeln!(out, "  Distinct lines: {}", report.merged.lines_written)?;
    if verbosity == Verbosity::Verbose && !report.merged.files_rejected.is_empty() {
        writeln!(
            out,
            "  Rejected as HTML ({}):",
            report.merged.files_rejected.len()
        )?;
        for path in &report.merged.files_rejected {
            writeln!(out, "    - {}", path.display())?;
        }
    }
    writeln!(out)?;

    writeln!(
        out,
        "Started {} and took {:.1}s",
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.elapsed.as_secs_f64()
    )?;
    writeln!(out, "Merged file: {}", report.merged.path.display())
}

/// Prints a run report to stdout
pub fn print_report(report: &RunReport, verbosity: Verbosity) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_report(&mut out, report, verbosity)
}
