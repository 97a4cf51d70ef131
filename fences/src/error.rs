use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FenceError {
    #[error("cannot read '{}': {source}", path.display())]
    ReadDocument {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid language tag '{tag}': {source}")]
    InvalidLanguage {
        tag: String,
        #[source]
        source: regex::Error,
    },

    #[error("language tag must not be empty")]
    EmptyLanguage,
}
