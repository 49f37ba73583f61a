//! Mirror configuration types.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::MirrorError;
use crate::report::SkipReason;

/// Extension given to every mirrored file unless configured otherwise.
pub const DEFAULT_MARKER_EXTENSION: &str = "txt";

/// Literal-match exclusion lists checked during the walk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipRules {
    /// Directory base names that are never descended into.
    #[serde(rename = "skipDirs", default)]
    pub dirs: BTreeSet<String>,

    /// File name suffixes (e.g. `.map`, `.d.ts`) that are not copied.
    #[serde(rename = "skipExtensions", default)]
    pub extensions: BTreeSet<String>,

    /// Exact file names that are not copied.
    #[serde(rename = "skipFiles", default)]
    pub files: BTreeSet<String>,
}

impl SkipRules {
    /// Empty rules: nothing is skipped.
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip sets suited to a JavaScript/mobile project checkout: platform
    /// folders, dependency and build output, binary assets and lockfiles.
    pub fn project_defaults() -> Self {
        Self::new()
            .with_dirs([
                "android",
                "ios",
                "node_modules",
                ".git",
                ".expo",
                ".vscode",
                ".idea",
                "coverage",
                "dist",
                "build",
                "__tests__",
                "Pods",
                "xcshareddata",
            ])
            .with_extensions([".map", ".d.ts", ".ttf", ".png", ".jpg", ".jpeg", ".webp"])
            .with_files([
                ".DS_Store",
                "LICENSE",
                "README.md",
                "package-lock.json",
                "project_tree.txt",
            ])
    }

    /// Add directory names to skip.
    pub fn with_dirs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dirs.extend(names.into_iter().map(Into::into));
        self
    }

    /// Add file suffixes to skip.
    pub fn with_extensions<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions.extend(suffixes.into_iter().map(Into::into));
        self
    }

    /// Add exact file names to skip.
    pub fn with_files<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files.extend(names.into_iter().map(Into::into));
        self
    }

    /// Check if a directory with this base name is pruned.
    pub fn skips_dir(&self, name: &str) -> bool {
        self.dirs.contains(name)
    }

    /// Check a file name against both file filters.
    ///
    /// Returns the first filter that excludes the file, or `None` if it
    /// should be copied.
    pub fn skips_file(&self, name: &str) -> Option<SkipReason> {
        if self.files.contains(name) {
            return Some(SkipReason::FileName);
        }
        if self.extensions.iter().any(|ext| has_suffix(name, ext)) {
            return Some(SkipReason::Extension);
        }
        None
    }

    /// Total number of entries across all three sets.
    pub fn len(&self) -> usize {
        self.dirs.len() + self.extensions.len() + self.files.len()
    }

    /// Check if no rule is configured.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Suffix match that requires a non-empty stem, so a dotfile named `.map`
/// is not treated as having the `.map` extension. Entries written without a
/// leading dot (`map`) match as if they had one.
fn has_suffix(name: &str, ext: &str) -> bool {
    if ext.is_empty() {
        return false;
    }
    let Some(stem) = name.strip_suffix(ext) else {
        return false;
    };
    if ext.starts_with('.') {
        return !stem.is_empty();
    }
    stem.strip_suffix('.').is_some_and(|s| !s.is_empty())
}

/// How line endings are treated during the text pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewlineMode {
    /// Write decoded text back unchanged.
    #[default]
    Preserve,
    /// Rewrite `\r\n` and lone `\r` to `\n`.
    Lf,
}

/// Configuration for one mirror run.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
#[serde(rename_all = "camelCase")]
pub struct MirrorConfig {
    /// Root of the tree being mirrored. Never written to.
    pub source_root: PathBuf,

    /// Root the mirrored structure is written under.
    pub dest_root: PathBuf,

    /// Directory, suffix and file name exclusions.
    #[builder(default)]
    #[serde(flatten)]
    pub skip: SkipRules,

    /// Extension (without the dot) given to every mirrored file.
    #[builder(default = "DEFAULT_MARKER_EXTENSION.to_string()")]
    #[serde(default = "default_marker_extension")]
    pub marker_extension: String,

    /// Line ending treatment.
    #[builder(default)]
    #[serde(default)]
    pub newline: NewlineMode,

    /// Walk and filter without touching the destination.
    #[builder(default = "false")]
    #[serde(default)]
    pub dry_run: bool,
}

fn default_marker_extension() -> String {
    DEFAULT_MARKER_EXTENSION.to_string()
}

fn validate_marker_extension(ext: &str) -> Result<(), String> {
    if ext.is_empty() {
        return Err("Marker extension cannot be empty".to_string());
    }
    if ext.contains(['.', '/', '\\']) {
        return Err(format!(
            "Marker extension must be a bare extension without dots or separators: {ext:?}"
        ));
    }
    Ok(())
}

impl MirrorConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.source_root {
            Some(ref root) if root.as_os_str().is_empty() => {
                return Err("Source root cannot be empty".to_string());
            }
            Some(_) => {}
            None => return Err("Source root is required".to_string()),
        }
        match self.dest_root {
            Some(ref root) if root.as_os_str().is_empty() => {
                return Err("Destination root cannot be empty".to_string());
            }
            Some(_) => {}
            None => return Err("Destination root is required".to_string()),
        }
        if let Some(ref ext) = self.marker_extension {
            validate_marker_extension(ext)?;
        }
        Ok(())
    }
}

impl MirrorConfig {
    /// Create a new mirror config builder.
    pub fn builder() -> MirrorConfigBuilder {
        MirrorConfigBuilder::default()
    }

    /// Create a config with no skip rules and the default marker extension.
    pub fn new(source_root: impl Into<PathBuf>, dest_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            dest_root: dest_root.into(),
            skip: SkipRules::new(),
            marker_extension: default_marker_extension(),
            newline: NewlineMode::Preserve,
            dry_run: false,
        }
    }

    /// Replace the skip rules.
    pub fn with_skip(mut self, skip: SkipRules) -> Self {
        self.skip = skip;
        self
    }

    /// Re-check invariants on a config that did not come through the builder.
    pub fn validate(&self) -> Result<(), MirrorError> {
        let invalid = |message: String| MirrorError::InvalidConfig { message };
        if self.source_root.as_os_str().is_empty() {
            return Err(invalid("Source root cannot be empty".to_string()));
        }
        if self.dest_root.as_os_str().is_empty() {
            return Err(invalid("Destination root cannot be empty".to_string()));
        }
        validate_marker_extension(&self.marker_extension).map_err(invalid)
    }

    /// Destination file name for a source file name: the stem with the
    /// marker extension in place of the last extension.
    pub fn destination_name(&self, file_name: &std::ffi::OsStr) -> std::ffi::OsString {
        let stem = Path::new(file_name)
            .file_stem()
            .unwrap_or(file_name)
            .to_os_string();
        let mut name = stem;
        name.push(".");
        name.push(&self.marker_extension);
        name
    }
}

/// Optional settings read from a TOML config file.
///
/// Every key is optional; a present skip set replaces the corresponding
/// preset set rather than extending it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigFile {
    pub source_root: Option<PathBuf>,
    pub dest_root: Option<PathBuf>,
    pub skip_dirs: Option<BTreeSet<String>>,
    pub skip_extensions: Option<BTreeSet<String>>,
    pub skip_files: Option<BTreeSet<String>>,
    pub marker_extension: Option<String>,
    pub newline: Option<NewlineMode>,
}

impl ConfigFile {
    /// Get the default config file path.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("treemirror").join("config.toml"))
    }

    /// Load and parse a config file.
    pub fn load(path: &Path) -> Result<Self, MirrorError> {
        let content = std::fs::read_to_string(path).map_err(|e| MirrorError::io(path, e))?;
        Self::parse(&content, path)
    }

    /// Load the default config file if one exists.
    pub fn load_default() -> Result<Option<Self>, MirrorError> {
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path).map(Some),
            _ => Ok(None),
        }
    }

    fn parse(content: &str, path: &Path) -> Result<Self, MirrorError> {
        toml::from_str(content).map_err(|source| MirrorError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply the file's skip sets on top of `base`.
    pub fn skip_rules(&self, base: SkipRules) -> SkipRules {
        SkipRules {
            dirs: self.skip_dirs.clone().unwrap_or(base.dirs),
            extensions: self.skip_extensions.clone().unwrap_or(base.extensions),
            files: self.skip_files.clone().unwrap_or(base.files),
        }
    }
}
