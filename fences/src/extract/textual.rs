use regex::Regex;

use crate::CodeBlock;
use crate::error::FenceError;
use crate::extract::{Extraction, FenceWarning};

const FENCE: &str = "```";

/// Build the non-greedy, dot-matches-newline fence pattern for `language`.
pub(super) fn fence_pattern(language: &str) -> Result<Regex, FenceError> {
    let pattern = format!("(?s){FENCE}{}(.*?){FENCE}", regex::escape(language));
    Regex::new(&pattern).map_err(|source| FenceError::InvalidLanguage {
        tag: language.to_string(),
        source,
    })
}

pub(super) fn extract(pattern: &Regex, language: &str, source: &str, file_id: usize) -> Extraction {
    let mut blocks = Vec::new();
    let mut last_end = 0;

    for (i, caps) in pattern.captures_iter(source).enumerate() {
        // Group 0 always exists; group 1 is not optional in the pattern.
        let (Some(whole), Some(body)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        blocks.push(CodeBlock {
            index: i + 1,
            text: body.as_str().trim().to_string(),
            span: whole.range(),
        });
        last_end = whole.end();
    }

    // Matches never span an opening marker that lacks a closer, so any such
    // marker can only sit after the last match.
    let mut warnings = Vec::new();
    let opener = format!("{FENCE}{language}");
    if let Some(offset) = source[last_end..].find(&opener) {
        let start = last_end + offset;
        tracing::debug!(offset = start, "unterminated {} fence", language);
        warnings.push(
            FenceWarning::new(
                format!("unterminated ```{} fence", language),
                start..start + opener.len(),
                file_id,
            )
            .with_note("no closing ``` follows this marker; the block is skipped"),
        );
    }

    Extraction { blocks, warnings }
}
