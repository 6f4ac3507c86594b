use std::io;
use std::path::{Path, PathBuf};

/// Name of the timestamp list written when the index is queried
pub const TIMESTAMP_LOG: &str = "ts.log";

/// Name of the merged output file
pub const MERGED_FILE: &str = "merged.txt";

/// Per-domain folder holding every artifact of a run
///
/// ```text
/// <root>/<domain>/ts.log
/// <root>/<domain>/<timestamp>.txt
/// <root>/<domain>/merged.txt
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDirectory {
    dir: PathBuf,
}

impl OutputDirectory {
    /// Describes the folder for `domain` under `root` without touching the filesystem
    pub fn new(root: &Path, domain: &str) -> Self {
        Self {
            dir: root.join(domain),
        }
    }

    /// Creates the folder (and any missing parents)
    pub fn create(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    pub fn timestamp_log(&self) -> PathBuf {
        self.dir.join(TIMESTAMP_LOG)
    }

    /// File receiving the snapshot captured at `timestamp`
    pub fn snapshot_file(&self, timestamp: &str) -> PathBuf {
        self.dir.join(format!("{}.txt", timestamp))
    }

    pub fn merged_file(&self) -> PathBuf {
        self.dir.join(MERGED_FILE)
    }
}
