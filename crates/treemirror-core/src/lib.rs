//! Core types for treemirror.
//!
//! This crate provides the configuration, error and report types shared by
//! the walker, the copy engine and the CLI.

mod config;
mod error;
mod report;

pub use config::{
    ConfigFile, DEFAULT_MARKER_EXTENSION, MirrorConfig, MirrorConfigBuilder,
    MirrorConfigBuilderError, NewlineMode, SkipRules,
};
pub use error::{CopyFailure, FailureKind, MirrorError};
pub use report::{FileOutcome, MirrorReport, SkipReason};
