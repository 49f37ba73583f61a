//! Root resolution and overlap checks.

use std::path::{Component, Path, PathBuf};

use treemirror_core::{MirrorConfig, MirrorError};

/// Source and destination roots as used by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoots {
    /// Canonical source root.
    pub source: PathBuf,
    /// Absolute destination root, canonical up to its deepest existing ancestor.
    pub dest: PathBuf,
    /// Destination lies strictly inside the source tree.
    pub dest_inside_source: bool,
}

/// Resolve and check the roots of `config`.
///
/// A destination equal to the source, or containing it, is rejected. A
/// destination strictly inside the source is allowed; the caller excludes it
/// from the walk.
pub fn resolve_roots(config: &MirrorConfig) -> Result<ResolvedRoots, MirrorError> {
    let source = config
        .source_root
        .canonicalize()
        .map_err(|e| MirrorError::io(&config.source_root, e))?;
    if !source.is_dir() {
        return Err(MirrorError::NotADirectory { path: source });
    }

    let dest = normalize_path(&config.dest_root)?;

    if dest == source {
        return Err(MirrorError::Overlap {
            source_root: source,
            dest_root: dest,
            reason: "destination is the source root",
        });
    }
    if source.starts_with(&dest) {
        return Err(MirrorError::Overlap {
            source_root: source,
            dest_root: dest,
            reason: "source is inside the destination",
        });
    }

    let dest_inside_source = dest.starts_with(&source);
    Ok(ResolvedRoots {
        source,
        dest,
        dest_inside_source,
    })
}

/// Make `path` absolute, fold `.` and `..` lexically, then canonicalize the
/// deepest ancestor that exists and re-append the rest.
pub fn normalize_path(path: &Path) -> Result<PathBuf, MirrorError> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| MirrorError::io(path, e))?
            .join(path)
    };

    let mut lexical = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                lexical.pop();
            }
            other => lexical.push(other.as_os_str()),
        }
    }

    let mut missing = Vec::new();
    let mut cursor = lexical.as_path();
    loop {
        if let Ok(resolved) = cursor.canonicalize() {
            let mut out = resolved;
            for part in missing.iter().rev() {
                out.push(part);
            }
            return Ok(out);
        }
        match (cursor.parent(), cursor.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                cursor = parent;
            }
            _ => return Ok(lexical),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_missing_tail() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().canonicalize().unwrap();

        let path = temp.path().join("a/./b/../c");
        assert_eq!(normalize_path(&path).unwrap(), base.join("a/c"));
    }

    #[test]
    fn test_nested_destination_allowed() {
        let temp = TempDir::new().unwrap();
        let config = MirrorConfig::new(temp.path(), temp.path().join("mirror"));

        let roots = resolve_roots(&config).unwrap();
        assert!(roots.dest_inside_source);
        assert_eq!(roots.dest, roots.source.join("mirror"));
    }

    #[test]
    fn test_sibling_destination() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("app")).unwrap();
        let config = MirrorConfig::new(temp.path().join("app"), temp.path().join("app-mirror"));

        let roots = resolve_roots(&config).unwrap();
        assert!(!roots.dest_inside_source);
    }

    #[test]
    fn test_destination_equal_to_source_rejected() {
        let temp = TempDir::new().unwrap();
        let config = MirrorConfig::new(temp.path(), temp.path().join("."));

        let err = resolve_roots(&config).unwrap_err();
        assert!(matches!(err, MirrorError::Overlap { .. }));
    }

    #[test]
    fn test_source_inside_destination_rejected() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("app")).unwrap();
        let config = MirrorConfig::new(temp.path().join("app"), temp.path());

        let err = resolve_roots(&config).unwrap_err();
        assert!(matches!(err, MirrorError::Overlap { .. }));
    }

    #[test]
    fn test_source_must_be_directory() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file.js");
        fs::write(&file, "x").unwrap();

        let err = resolve_roots(&MirrorConfig::new(&file, temp.path().join("out"))).unwrap_err();
        assert!(matches!(err, MirrorError::NotADirectory { .. }));

        let err =
            resolve_roots(&MirrorConfig::new(temp.path().join("nope"), temp.path().join("out")))
                .unwrap_err();
        assert!(matches!(err, MirrorError::NotFound { .. }));
    }
}
