//! Run report and per-file outcomes.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CopyFailure;

/// Why a walked file was not copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Exact file name is in the skip-filename set.
    FileName,
    /// File name ends with a suffix in the skip-extension set.
    Extension,
    /// Entry is a symbolic link.
    Symlink,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FileName => write!(f, "skipped file name"),
            Self::Extension => write!(f, "skipped extension"),
            Self::Symlink => write!(f, "symlink"),
        }
    }
}

/// Result of handling one walked file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Text was written to the destination.
    Copied {
        source: PathBuf,
        destination: PathBuf,
        bytes: u64,
    },
    /// Would have been copied (dry run).
    Planned { source: PathBuf, destination: PathBuf },
    /// Excluded by a skip rule.
    Skipped { path: PathBuf, reason: SkipReason },
    /// Read, decode or write failed.
    Failed(CopyFailure),
}

/// Counters and diagnostics for one mirror run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MirrorReport {
    /// Canonical source root.
    pub source_root: PathBuf,
    /// Destination root as resolved for the run.
    pub dest_root: PathBuf,
    /// Directories mirrored (created or already present). In a dry run,
    /// directories that would be created.
    pub dirs_created: u64,
    /// Directories not descended into because of a skip rule.
    pub dirs_pruned: u64,
    /// Files whose text was written.
    pub files_copied: u64,
    /// Files that would be written (dry run only).
    pub files_planned: u64,
    /// Files excluded by a skip rule.
    pub files_skipped: u64,
    /// Total bytes written.
    pub bytes_written: u64,
    /// Destination files written more than once in this run.
    pub collisions: Vec<PathBuf>,
    /// Per-file failures.
    pub failures: Vec<CopyFailure>,
    /// Whether this was a dry run.
    pub dry_run: bool,
    /// Wall time of the run.
    pub duration: Duration,
}

impl MirrorReport {
    /// Create an empty report for the given roots.
    pub fn new(source_root: impl Into<PathBuf>, dest_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            dest_root: dest_root.into(),
            ..Self::default()
        }
    }

    /// Fold one file outcome into the counters.
    pub fn record(&mut self, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Copied { bytes, .. } => {
                self.files_copied += 1;
                self.bytes_written += bytes;
            }
            FileOutcome::Planned { .. } => self.files_planned += 1,
            FileOutcome::Skipped { .. } => self.files_skipped += 1,
            FileOutcome::Failed(failure) => self.failures.push(failure),
        }
    }

    /// Record a mirrored directory.
    pub fn record_dir(&mut self) {
        self.dirs_created += 1;
    }

    /// Record a pruned directory.
    pub fn record_pruned(&mut self, count: u64) {
        self.dirs_pruned += count;
    }

    /// Record a destination path that was overwritten within the run.
    pub fn record_collision(&mut self, destination: PathBuf) {
        self.collisions.push(destination);
    }

    /// Check if every attempted file was mirrored.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of failed files.
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Get a human-readable one-line summary.
    pub fn summary(&self) -> String {
        let action = if self.dry_run { "Would copy" } else { "Copied" };
        let files = if self.dry_run {
            self.files_planned
        } else {
            self.files_copied
        };

        let mut line = format!(
            "{action} {files} files into {} directories ({} skipped, {} pruned)",
            self.dirs_created, self.files_skipped, self.dirs_pruned
        );
        if !self.failures.is_empty() {
            line.push_str(&format!(", {} failed", self.failures.len()));
        }
        line
    }
}

impl std::fmt::Display for MirrorReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.summary())
    }
}
