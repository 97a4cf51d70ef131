use thiserror::Error;

use fences::FenceError;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error(transparent)]
    Document(#[from] FenceError),

    #[error("cannot create temporary file for block {index}: {source}")]
    TempFile {
        index: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to launch validator '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write report: {0}")]
    Report(#[source] std::io::Error),
}

impl HarnessError {
    pub fn is_launch(&self) -> bool {
        matches!(self, HarnessError::Launch { .. })
    }
}
