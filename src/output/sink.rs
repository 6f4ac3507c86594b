//! Progress and diagnostic sinks
//!
//! The fetcher and the pipeline never print directly. They report through a
//! [`ProgressSink`] handed to them at construction time.

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// How much the user wants to see
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Failures and warnings only
    #[default]
    Quiet,
    /// Step-by-step details and transfer progress
    Verbose,
}

impl Verbosity {
    pub fn from_flag(verbose: bool) -> Self {
        if verbose {
            Self::Verbose
        } else {
            Self::Quiet
        }
    }
}

/// Receiver for run diagnostics and transfer progress
pub trait ProgressSink: Send + Sync {
    fn verbosity(&self) -> Verbosity;

    /// Step-by-step detail, only meaningful in verbose mode
    fn detail(&self, message: &str);

    /// A failure that changes the outcome of the run
    fn failure(&self, message: &str);

    fn transfer_started(&self, _url: &str, _total_bytes: Option<u64>) {}

    fn transfer_progress(&self, _bytes: u64) {}

    fn transfer_finished(&self) {}

    fn is_verbose(&self) -> bool {
        self.verbosity() == Verbosity::Verbose
    }
}

const PB_STYLE: &str =
    "{spinner:.green} [{elapsed_precise}] {wide_bar:.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec})";

const PB_CHARS: &str = "█▓▒░  ";

/// Sink writing to the tracing subscriber, with a byte progress bar in verbose mode
pub struct ConsoleSink {
    verbosity: Verbosity,
    bar: Mutex<Option<ProgressBar>>,
}

impl ConsoleSink {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            bar: Mutex::new(None),
        }
    }

    fn with_bar(&self, f: impl FnOnce(&mut Option<ProgressBar>)) {
        let mut guard = self.bar.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard);
    }
}

impl ProgressSink for ConsoleSink {
    fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    fn detail(&self, message: &str) {
        if self.is_verbose() {
            tracing::info!("{}", message);
        }
    }

    fn failure(&self, message: &str) {
        tracing::error!("{}", message);
    }

    fn transfer_started(&self, _url: &str, total_bytes: Option<u64>) {
        if !self.is_verbose() {
            return;
        }

        let bar = match total_bytes {
            Some(len) => ProgressBar::new(len),
            None => ProgressBar::new_spinner(),
        };
        if let Ok(style) = ProgressStyle::with_template(PB_STYLE) {
            bar.set_style(style.progress_chars(PB_CHARS));
        }
        self.with_bar(|slot| {
            if let Some(previous) = slot.replace(bar) {
                previous.finish_and_clear();
            }
        });
    }

    fn transfer_progress(&self, bytes: u64) {
        self.with_bar(|slot| {
            if let Some(bar) = slot.as_ref() {
                bar.inc(bytes);
            }
        });
    }

    fn transfer_finished(&self) {
        self.with_bar(|slot| {
            if let Some(bar) = slot.take() {
                bar.finish();
            }
        });
    }
}

/// A message captured by [`MemorySink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Detail(String),
    Failure(String),
    TransferStarted(String),
}

/// Sink that keeps every message in memory
///
/// Details are recorded regardless of verbosity so callers can inspect them.
#[derive(Debug, Default)]
pub struct MemorySink {
    verbosity: Verbosity,
    events: Mutex<Vec<SinkEvent>>,
    bytes: Mutex<u64>,
}

impl MemorySink {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            ..Self::default()
        }
    }

    fn push(&self, event: SinkEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn details(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SinkEvent::Detail(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    pub fn failures(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SinkEvent::Failure(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    /// URLs whose transfer was started, in request order
    pub fn transfers(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SinkEvent::TransferStarted(url) => Some(url),
                _ => None,
            })
            .collect()
    }

    /// Total body bytes reported through `transfer_progress`
    pub fn bytes_received(&self) -> u64 {
        *self.bytes.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ProgressSink for MemorySink {
    fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    fn detail(&self, message: &str) {
        self.push(SinkEvent::Detail(message.to_string()));
    }

    fn failure(&self, message: &str) {
        self.push(SinkEvent::Failure(message.to_string()));
    }

    fn transfer_started(&self, url: &str, _total_bytes: Option<u64>) {
        self.push(SinkEvent::TransferStarted(url.to_string()));
    }

    fn transfer_progress(&self, bytes: u64) {
        *self.bytes.lock().unwrap_or_else(|e| e.into_inner()) += bytes;
    }
}
