//! Error types for mirror runs.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structural errors that abort a mirror run.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source root is not a directory.
    #[error("Source root is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Source and destination roots overlap in a way the mirror cannot handle.
    #[error("Destination {dest_root} overlaps source {source_root}: {reason}")]
    Overlap {
        source_root: PathBuf,
        dest_root: PathBuf,
        reason: &'static str,
    },

    /// A destination directory could not be created.
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A source directory could not be enumerated.
    #[error("Failed to read directory {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Config file could not be parsed.
    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl MirrorError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }
}

/// Stage of a single-file copy that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Permission was denied reading or writing.
    PermissionDenied,
    /// Error reading the source file.
    ReadError,
    /// Source content is not valid UTF-8.
    DecodeError,
    /// Error writing the destination file.
    WriteError,
}

/// A recoverable per-file failure. The run continues past it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyFailure {
    /// Source file that could not be mirrored.
    pub path: PathBuf,
    /// Which stage failed.
    pub kind: FailureKind,
    /// Human-readable cause.
    pub message: String,
}

impl CopyFailure {
    /// Create a new copy failure.
    pub fn new(path: impl Into<PathBuf>, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            message: message.into(),
        }
    }

    /// Create a failure for an error reading the source.
    pub fn read(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        Self::from_io(path, error, FailureKind::ReadError, "Read error")
    }

    /// Create a failure for an error writing the destination.
    pub fn write(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        Self::from_io(path, error, FailureKind::WriteError, "Write error")
    }

    /// Create a failure for content that is not valid UTF-8.
    pub fn decode(path: impl Into<PathBuf>, error: &std::string::FromUtf8Error) -> Self {
        Self::new(path, FailureKind::DecodeError, format!("Decode error: {error}"))
    }

    fn from_io(
        path: impl Into<PathBuf>,
        error: &std::io::Error,
        kind: FailureKind,
        label: &str,
    ) -> Self {
        let kind = match error.kind() {
            std::io::ErrorKind::PermissionDenied => FailureKind::PermissionDenied,
            _ => kind,
        };
        Self::new(path, kind, format!("{label}: {error}"))
    }
}

impl std::fmt::Display for CopyFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirror_error_io() {
        let err = MirrorError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, MirrorError::PermissionDenied { .. }));

        let err = MirrorError::io("/test/path", std::io::Error::other("boom"));
        assert!(matches!(err, MirrorError::Io { .. }));
    }

    #[test]
    fn test_copy_failure_permission_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let failure = CopyFailure::write("/out/a.txt", &io);
        assert_eq!(failure.kind, FailureKind::PermissionDenied);
        assert!(failure.message.starts_with("Write error"));
    }

    #[test]
    fn test_copy_failure_display_names_path() {
        let bytes = vec![0xff, 0xfe, 0x00];
        let err = String::from_utf8(bytes).unwrap_err();
        let failure = CopyFailure::decode("/src/logo.bin", &err);

        assert_eq!(failure.kind, FailureKind::DecodeError);
        let line = failure.to_string();
        assert!(line.starts_with("/src/logo.bin: Decode error"));
    }
}
