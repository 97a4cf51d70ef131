pub mod document;
pub mod error;
pub mod extract;

use std::ops::Range;

pub use document::Document;
pub use error::FenceError;
pub use extract::{ExtractMode, Extraction, Extractor, FenceWarning};

/// A fenced code block pulled out of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// 1-based position in document order.
    pub index: usize,
    /// Content between the fence markers, trimmed of surrounding whitespace.
    pub text: String,
    /// Byte span of the whole fence (markers included) in the source.
    pub span: Range<usize>,
}
