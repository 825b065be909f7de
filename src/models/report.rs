//! Run statistics for catalogue assembly and downloads.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Statistics about one catalogue assembly run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyStats {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub issue_count: usize,
    pub issue_failures: usize,
    pub article_count: usize,
    /// Half-built records dropped by the line scanner
    pub skipped_records: usize,
}

/// An article that could not be written to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedDownload {
    pub path: PathBuf,
    pub url: String,
    pub reason: String,
}

/// Outcome of walking a catalogue onto disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadReport {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub attempted: usize,
    pub downloaded: usize,
    pub bytes_written: u64,
    pub failures: Vec<FailedDownload>,
    /// Directories that could not be created
    pub directory_failures: Vec<PathBuf>,
}

impl DownloadReport {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            start_time: now,
            end_time: now,
            attempted: 0,
            downloaded: 0,
            bytes_written: 0,
            failures: Vec::new(),
            directory_failures: Vec::new(),
        }
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// True when every article was written and every directory created.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.directory_failures.is_empty()
    }
}

impl Default for DownloadReport {
    fn default() -> Self {
        Self::new()
    }
}
