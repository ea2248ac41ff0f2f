pub mod types;

pub use types::{FileDiff, Hunk};

use thiserror::Error;
use tracing::debug;

/// Marker that opens a file section.
pub const FILE_HEADER: &str = "diff --git";

#[derive(Debug, Error)]
pub enum DiffError {
    /// The header carries no `+<new_start>` field, so no line number can be trusted.
    #[error("Malformed hunk header: {0:?}")]
    MalformedHunkHeader(String),

    #[error("{file}: {source}")]
    File {
        file: String,
        source: Box<DiffError>,
    },
}

/// Split raw diff text into lines, each keeping its own terminator.
pub fn split_lines(raw_diff: &str) -> Vec<&str> {
    raw_diff.split_inclusive('\n').collect()
}

/// Parse unified diff text into files.
///
/// Equivalent to `parse_lines(&split_lines(raw_diff))`.
pub fn parse_diff(raw_diff: &str) -> Result<Vec<FileDiff>, DiffError> {
    parse_lines(split_lines(raw_diff).as_slice())
}

/// Parse a sequence of raw diff lines into files, in diff order.
///
/// Each line starting with `diff --git` opens a new file section that runs up
/// to the next one. Anything before the first file header is dropped, so an
/// empty or header-less input yields no files rather than an error. The only
/// failure is a hunk header without a usable `+<new_start>` field.
pub fn parse_lines<S: AsRef<str>>(lines: &[S]) -> Result<Vec<FileDiff>, DiffError> {
    let mut sections: Vec<Vec<&str>> = Vec::new();
    for line in lines {
        let line = line.as_ref();
        if line.starts_with(FILE_HEADER) {
            sections.push(Vec::new());
        }
        if let Some(section) = sections.last_mut() {
            section.push(line);
        }
    }

    let files = sections
        .iter()
        .map(|section| FileDiff::from_lines(section.as_slice()))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(lines = lines.len(), files = files.len(), "parsed diff");
    Ok(files)
}
