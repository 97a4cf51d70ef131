use std::path::Path;

use crate::error::FenceError;

/// The markdown source a run works from. Read once, never mutated.
#[derive(Debug, Clone)]
pub struct Document {
    /// Display name (usually the path it was read from).
    pub name: String,
    pub source: String,
}

impl Document {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Document {
            name: name.into(),
            source: source.into(),
        }
    }

    /// Read a document from disk. A leading BOM is dropped.
    pub fn read(path: &Path) -> Result<Self, FenceError> {
        let source = std::fs::read_to_string(path).map_err(|source| FenceError::ReadDocument {
            path: path.to_path_buf(),
            source,
        })?;
        let source = match source.strip_prefix('\u{feff}') {
            Some(rest) => rest.to_string(),
            None => source,
        };
        Ok(Document::new(path.display().to_string(), source))
    }

    /// Convert a byte offset to a 1-based line number.
    pub fn line_of(&self, offset: usize) -> usize {
        self.source[..offset.min(self.source.len())]
            .bytes()
            .filter(|&b| b == b'\n')
            .count()
            + 1
    }
}
