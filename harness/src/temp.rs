use std::io::Write;
use std::path::Path;

use tempfile::TempPath;

use fences::CodeBlock;

use crate::error::HarnessError;

/// A block's text on disk for the duration of one validator call.
///
/// The file is closed before the validator sees it and removed when the
/// `BlockFile` is dropped, whichever way the caller leaves its scope.
#[derive(Debug)]
pub struct BlockFile {
    path: TempPath,
}

impl BlockFile {
    /// Write `block.text` to a fresh, uniquely named `.json` file in the
    /// system temp directory.
    pub fn create(block: &CodeBlock) -> Result<Self, HarnessError> {
        let map_err = |source: std::io::Error| HarnessError::TempFile {
            index: block.index,
            source,
        };

        let mut file = tempfile::Builder::new()
            .prefix("fencecheck-")
            .suffix(".json")
            .tempfile()
            .map_err(map_err)?;
        file.write_all(block.text.as_bytes()).map_err(map_err)?;
        file.flush().map_err(map_err)?;

        Ok(BlockFile {
            path: file.into_temp_path(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the file now. A failure is logged rather than returned; the
    /// block has already been reported by the time this runs.
    pub fn remove(self) {
        let shown = self.path.display().to_string();
        if let Err(err) = self.path.close() {
            tracing::warn!(file = %shown, error = %err, "could not remove temporary file");
        }
    }
}
