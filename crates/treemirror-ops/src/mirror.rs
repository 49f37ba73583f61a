//! Tree mirroring: walk, filter, rename and copy.

use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use treemirror_core::{FileOutcome, MirrorConfig, MirrorError, MirrorReport, SkipReason};
use treemirror_walk::{MirrorWalker, WalkEntry};

use crate::copy::copy_as_text;
use crate::paths::resolve_roots;

/// Mirrors a source tree into a destination tree of text files.
#[derive(Debug, Clone)]
pub struct TreeMirror {
    config: MirrorConfig,
}

impl TreeMirror {
    /// Create a mirror for the given config.
    pub fn new(config: MirrorConfig) -> Self {
        Self { config }
    }

    /// The config this mirror runs with.
    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    /// Run the mirror.
    pub fn run(&self) -> Result<MirrorReport, MirrorError> {
        self.run_with(|_| {})
    }

    /// Run the mirror, passing every file outcome to `on_outcome` as it
    /// happens.
    ///
    /// Per-file failures are logged and collected in the report. Errors
    /// creating a destination directory or reading a source directory abort
    /// the run.
    pub fn run_with<F>(&self, mut on_outcome: F) -> Result<MirrorReport, MirrorError>
    where
        F: FnMut(&FileOutcome),
    {
        let start = Instant::now();
        self.config.validate()?;
        let roots = resolve_roots(&self.config)?;
        let dry_run = self.config.dry_run;

        tracing::info!(
            source = %roots.source.display(),
            dest = %roots.dest.display(),
            dry_run,
            "starting mirror"
        );

        let mut walker = MirrorWalker::new(&self.config.skip);
        if roots.dest_inside_source {
            walker = walker.exclude_path(&roots.dest);
        }

        let mut report = MirrorReport::new(&roots.source, &roots.dest);
        report.dry_run = dry_run;
        let mut written: HashSet<PathBuf> = HashSet::new();

        let mut walk = walker.walk(&roots.source);
        for entry in walk.by_ref() {
            match entry? {
                WalkEntry::Dir { relative, .. } => {
                    let dest_dir = roots.dest.join(&relative);
                    if !dry_run {
                        fs::create_dir_all(&dest_dir).map_err(|source| {
                            MirrorError::CreateDir {
                                path: dest_dir.clone(),
                                source,
                            }
                        })?;
                    }
                    tracing::debug!(dir = %dest_dir.display(), "mirrored directory");
                    report.record_dir();
                }
                WalkEntry::Symlink { path, .. } => {
                    tracing::debug!(path = %path.display(), "skipping symlink");
                    let outcome = FileOutcome::Skipped {
                        path,
                        reason: SkipReason::Symlink,
                    };
                    on_outcome(&outcome);
                    report.record(outcome);
                }
                WalkEntry::File {
                    path,
                    relative,
                    name,
                } => {
                    let dest_dir = roots.dest.join(relative.parent().unwrap_or(Path::new("")));
                    let outcome = self.mirror_file(path, &name, &dest_dir);

                    let destination = match &outcome {
                        FileOutcome::Copied { destination, .. }
                        | FileOutcome::Planned { destination, .. } => Some(destination),
                        _ => None,
                    };
                    if let Some(destination) = destination {
                        if !written.insert(destination.clone()) {
                            tracing::warn!(
                                dest = %destination.display(),
                                "Overwrote output of an earlier file with the same stem"
                            );
                            report.record_collision(destination.clone());
                        }
                    }

                    on_outcome(&outcome);
                    report.record(outcome);
                }
            }
        }

        report.record_pruned(walk.pruned());
        report.duration = start.elapsed();

        tracing::info!(
            copied = report.files_copied,
            skipped = report.files_skipped,
            failed = report.failure_count(),
            "mirror finished in {:.2}s",
            report.duration.as_secs_f64()
        );

        Ok(report)
    }

    /// Filter, rename and copy one file.
    fn mirror_file(&self, source: PathBuf, name: &OsStr, dest_dir: &Path) -> FileOutcome {
        if let Some(reason) = self.config.skip.skips_file(&name.to_string_lossy()) {
            tracing::debug!(path = %source.display(), %reason, "skipping file");
            return FileOutcome::Skipped {
                path: source,
                reason,
            };
        }

        let destination = dest_dir.join(self.config.destination_name(name));
        if self.config.dry_run {
            return FileOutcome::Planned {
                source,
                destination,
            };
        }

        match copy_as_text(&source, &destination, self.config.newline) {
            Ok(bytes) => {
                tracing::debug!(
                    path = %source.display(),
                    dest = %destination.display(),
                    bytes,
                    "copied"
                );
                FileOutcome::Copied {
                    source,
                    destination,
                    bytes,
                }
            }
            Err(failure) => {
                tracing::error!("Skipping {failure}");
                FileOutcome::Failed(failure)
            }
        }
    }
}
