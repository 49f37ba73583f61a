//! Directory walking for treemirror.
//!
//! `treemirror-walk` traverses a source tree top-down with jwalk in serial
//! mode, sorted by file name. Directories whose base name is in the
//! skip-directory set, and explicitly excluded paths such as a destination
//! nested inside the source, are pruned before they are read.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use treemirror_walk::{MirrorWalker, SkipRules, WalkEntry};
//!
//! let rules = SkipRules::new().with_dirs(["node_modules", ".git"]);
//! let walker = MirrorWalker::new(&rules);
//!
//! for entry in walker.walk(Path::new("/path/to/project")) {
//!     if let WalkEntry::File { relative, .. } = entry.unwrap() {
//!         println!("{}", relative.display());
//!     }
//! }
//! ```

mod walker;

pub use walker::{MirrorWalker, Walk, WalkEntry};

// Re-export core types for convenience
pub use treemirror_core::{MirrorError, SkipRules};
