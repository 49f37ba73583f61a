//! Single-file text copy.

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use treemirror_core::{CopyFailure, NewlineMode};

/// Copy one file as UTF-8 text.
///
/// The source is read and decoded in full, then written to `destination`
/// (replacing any existing file). Failures name the source path. Returns
/// the number of bytes written.
pub fn copy_as_text(
    source: &Path,
    destination: &Path,
    newline: NewlineMode,
) -> Result<u64, CopyFailure> {
    let text = read_text(source)?;
    let text = match newline {
        NewlineMode::Preserve => Cow::Borrowed(text.as_str()),
        NewlineMode::Lf => normalize_newlines(&text),
    };

    fs::write(destination, text.as_bytes()).map_err(|e| CopyFailure::write(source, &e))?;

    Ok(text.len() as u64)
}

/// Read a file and decode it as UTF-8.
pub fn read_text(path: &Path) -> Result<String, CopyFailure> {
    let bytes = fs::read(path).map_err(|e| CopyFailure::read(path, &e))?;
    String::from_utf8(bytes).map_err(|e| CopyFailure::decode(path, &e))
}

/// Rewrite `\r\n` and lone `\r` line endings to `\n`.
pub fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
}
