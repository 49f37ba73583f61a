//! JWalk-based serial directory walker with name-based pruning.

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use jwalk::{DirEntryIter, Parallelism, WalkDir};

use treemirror_core::{MirrorError, SkipRules};

/// One entry yielded by the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkEntry {
    /// A directory to mirror. Always yielded before its children.
    Dir {
        path: PathBuf,
        relative: PathBuf,
        depth: usize,
    },
    /// A regular file.
    File {
        path: PathBuf,
        relative: PathBuf,
        name: OsString,
    },
    /// A symbolic link (never followed).
    Symlink { path: PathBuf, relative: PathBuf },
}

impl WalkEntry {
    /// Absolute path of the entry.
    pub fn path(&self) -> &Path {
        match self {
            Self::Dir { path, .. } | Self::File { path, .. } | Self::Symlink { path, .. } => path,
        }
    }

    /// Path relative to the walk root (empty for the root itself).
    pub fn relative(&self) -> &Path {
        match self {
            Self::Dir { relative, .. }
            | Self::File { relative, .. }
            | Self::Symlink { relative, .. } => relative,
        }
    }
}

/// Walker that never descends into skip-named directories or excluded paths.
///
/// The walk is serial and sorted by file name, so every directory is yielded
/// before anything beneath it and runs are reproducible.
#[derive(Debug, Clone, Default)]
pub struct MirrorWalker {
    skip_dirs: Arc<BTreeSet<String>>,
    excluded: Arc<Vec<PathBuf>>,
}

impl MirrorWalker {
    /// Create a walker pruning the directory names in `rules`.
    pub fn new(rules: &SkipRules) -> Self {
        Self {
            skip_dirs: Arc::new(rules.dirs.clone()),
            excluded: Arc::new(Vec::new()),
        }
    }

    /// Never descend into this exact directory path.
    ///
    /// Paths are compared as given, so callers pass canonical paths to match
    /// a canonical walk root.
    pub fn exclude_path(mut self, path: impl Into<PathBuf>) -> Self {
        Arc::make_mut(&mut self.excluded).push(path.into());
        self
    }

    /// Start walking `root`.
    ///
    /// The root itself is never pruned, even if its name is a skip name.
    pub fn walk(&self, root: &Path) -> Walk {
        let pruned = Arc::new(AtomicU64::new(0));
        let skip_dirs = Arc::clone(&self.skip_dirs);
        let excluded = Arc::clone(&self.excluded);
        let counter = Arc::clone(&pruned);

        let walker = WalkDir::new(root)
            .parallelism(Parallelism::Serial)
            .sort(true)
            .skip_hidden(false)
            .follow_links(false)
            .process_read_dir(move |depth, _path, _state, children| {
                // `None` is the pseudo read that yields the root entry
                if depth.is_none() {
                    return;
                }
                children.retain(|child| {
                    let Ok(entry) = child else {
                        return true;
                    };
                    if !entry.file_type().is_dir() {
                        return true;
                    }
                    let name = entry.file_name().to_string_lossy();
                    let prune = skip_dirs.contains(name.as_ref())
                        || excluded.iter().any(|p| entry.path() == *p);
                    if prune {
                        tracing::debug!(path = %entry.path().display(), "pruned directory");
                        counter.fetch_add(1, Ordering::Relaxed);
                    }
                    !prune
                });
            });

        Walk {
            root: root.to_path_buf(),
            inner: walker.into_iter(),
            pruned,
        }
    }
}

/// Iterator over a pruned walk.
pub struct Walk {
    root: PathBuf,
    inner: DirEntryIter<((), ())>,
    pruned: Arc<AtomicU64>,
}

impl Walk {
    /// Number of directories pruned so far.
    pub fn pruned(&self) -> u64 {
        self.pruned.load(Ordering::Relaxed)
    }
}

impl Iterator for Walk {
    type Item = Result<WalkEntry, MirrorError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut entry = match self.inner.next()? {
            Ok(entry) => entry,
            Err(err) => return Some(Err(walk_error(err, PathBuf::new()))),
        };

        let path = entry.path();
        // jwalk still yields a directory it could not list, with the error attached
        if let Some(err) = entry.read_children_error.take() {
            return Some(Err(walk_error(err, path)));
        }

        let relative = path
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let file_type = entry.file_type();

        let item = if file_type.is_dir() {
            WalkEntry::Dir {
                path,
                relative,
                depth: entry.depth,
            }
        } else if file_type.is_symlink() {
            WalkEntry::Symlink { path, relative }
        } else {
            WalkEntry::File {
                name: entry.file_name().to_os_string(),
                path,
                relative,
            }
        };
        Some(Ok(item))
    }
}

fn walk_error(err: jwalk::Error, fallback: PathBuf) -> MirrorError {
    let path = err.path().map(Path::to_path_buf).unwrap_or(fallback);
    let message = err.to_string();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other(message));
    MirrorError::Walk { path, source }
}
