pub mod diagnostic;
mod markdown;
mod textual;

pub use diagnostic::FenceWarning;

use std::fmt;
use std::str::FromStr;

use regex::Regex;

use crate::CodeBlock;
use crate::document::Document;
use crate::error::FenceError;

pub const DEFAULT_LANGUAGE: &str = "json";

/// How fences are located in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractMode {
    /// Plain text scan: the opening marker is three backticks immediately
    /// followed by the language tag, closed by the next three backticks.
    #[default]
    Textual,
    /// CommonMark fenced code blocks whose info string starts with the tag.
    Markdown,
}

impl ExtractMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ExtractMode::Textual => "textual",
            ExtractMode::Markdown => "markdown",
        }
    }
}

impl fmt::Display for ExtractMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtractMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "textual" | "text" => Ok(ExtractMode::Textual),
            "markdown" | "md" => Ok(ExtractMode::Markdown),
            other => Err(format!(
                "unknown extraction mode '{}' (expected textual or markdown)",
                other
            )),
        }
    }
}

/// Blocks found in a document, plus anything worth warning about.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub blocks: Vec<CodeBlock>,
    pub warnings: Vec<FenceWarning>,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Extractor entry point.
#[derive(Debug, Clone)]
pub struct Extractor {
    language: String,
    mode: ExtractMode,
    pattern: Regex,
}

impl Extractor {
    pub fn new(language: &str, mode: ExtractMode) -> Result<Self, FenceError> {
        if language.is_empty() {
            return Err(FenceError::EmptyLanguage);
        }
        let pattern = textual::fence_pattern(language)?;
        Ok(Extractor {
            language: language.to_string(),
            mode,
            pattern,
        })
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Extract every matching block, in document order, numbered from 1.
    pub fn extract(&self, document: &Document, file_id: usize) -> Extraction {
        let extraction = match self.mode {
            ExtractMode::Textual => {
                textual::extract(&self.pattern, &self.language, &document.source, file_id)
            }
            ExtractMode::Markdown => markdown::extract(&self.language, &document.source),
        };
        tracing::debug!(
            document = %document.name,
            mode = %self.mode,
            blocks = extraction.blocks.len(),
            warnings = extraction.warnings.len(),
            "extracted fenced blocks"
        );
        extraction
    }
}
