//! Output module: merging, progress reporting and run summaries
//!
//! This module handles:
//! - Merging downloaded snapshots into one deduplicated file
//! - The progress sink interface used by the fetcher and the pipeline
//! - Rendering the report of a finished run

mod merger;
mod sink;
mod summary;

pub use merger::{contains_markup, merge, split_lines, MergedOutput};
pub use sink::{ConsoleSink, MemorySink, ProgressSink, SinkEvent, Verbosity};
pub use summary::{print_report, write_report, RunReport};
