//! Mirroring engine for treemirror.
//!
//! This crate walks a source tree with `treemirror-walk`, filters files by
//! the configured skip rules, and writes each remaining file as UTF-8 text
//! under the destination root with its extension replaced by the marker
//! extension. A failure on one file is reported and the run moves on; a
//! failure creating or reading a directory ends the run.

mod copy;
mod mirror;
mod paths;

pub use copy::{copy_as_text, normalize_newlines, read_text};
pub use mirror::TreeMirror;
pub use paths::{ResolvedRoots, normalize_path, resolve_roots};

// Re-export core types for convenience
pub use treemirror_core::{
    CopyFailure, FailureKind, FileOutcome, MirrorConfig, MirrorError, MirrorReport, NewlineMode,
    SkipReason, SkipRules,
};
