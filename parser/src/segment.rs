//! Blank-line segmentation of raw log text into line groups.

use std::fs;
use std::ops::Deref;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{ConvertError, Result};

/// Ordered run of trimmed, non-empty lines bounded by blank lines.
///
/// Never empty when produced by [`segment`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineGroup(Vec<String>);

impl LineGroup {
    /// First line of the group, which most grammars use for classification.
    pub fn first_line(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn into_lines(self) -> Vec<String> {
        self.0
    }
}

impl Deref for LineGroup {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Splits `lines` into groups separated by whitespace-only lines.
///
/// Every kept line is trimmed. Consecutive blank lines never produce empty
/// groups, and trailing lines form a final group without a terminating blank.
pub fn segment<I, S>(lines: I) -> Vec<LineGroup>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut groups = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for line in lines {
        let trimmed = line.as_ref().trim();
        if trimmed.is_empty() {
            if !current.is_empty() {
                groups.push(LineGroup(std::mem::take(&mut current)));
            }
            continue;
        }
        current.push(trimmed.to_string());
    }

    if !current.is_empty() {
        groups.push(LineGroup(current));
    }

    groups
}

/// Segments a whole text blob (`\n` or `\r\n` line endings).
pub fn segment_text(text: &str) -> Vec<LineGroup> {
    segment(text.lines())
}

/// Reads `path` and segments its contents.
///
/// A read failure is reported as [`ConvertError::Read`]. Content that is not
/// valid UTF-8 is decoded lossily; legacy dumps occasionally carry Latin-1
/// card names.
pub fn load_groups(path: &Path) -> Result<Vec<LineGroup>> {
    info!(path = %path.display(), "Loading file");
    let bytes = fs::read(path).map_err(|source| ConvertError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            debug!(path = %path.display(), "Input is not valid UTF-8, decoding lossily");
            String::from_utf8_lossy(err.as_bytes()).into_owned()
        }
    };

    let groups = segment_text(&text);
    debug!(path = %path.display(), groups = groups.len(), "Segmented input");
    Ok(groups)
}
