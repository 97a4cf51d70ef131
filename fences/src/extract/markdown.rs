use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, Event, Parser as CmarkParser, Tag, TagEnd};

use crate::CodeBlock;
use crate::extract::Extraction;

/// Collect fenced code blocks whose info string names `language`.
/// Indented blocks, inline code and fences nested in other code are ignored.
pub(super) fn extract(language: &str, source: &str) -> Extraction {
    let mut blocks = Vec::new();
    // (span, accumulated text) of the block currently open, if it matches.
    let mut open: Option<(Range<usize>, String)> = None;

    for (event, range) in CmarkParser::new(source).into_offset_iter() {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                if info_matches(&info, language) {
                    open = Some((range, String::new()));
                }
            }
            Event::Text(text) => {
                if let Some((_, body)) = open.as_mut() {
                    body.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((span, body)) = open.take() {
                    blocks.push(CodeBlock {
                        index: blocks.len() + 1,
                        text: body.trim().to_string(),
                        span,
                    });
                }
            }
            _ => {}
        }
    }

    Extraction {
        blocks,
        warnings: Vec::new(),
    }
}

fn info_matches(info: &str, language: &str) -> bool {
    info.split_whitespace()
        .next()
        .map(|tag| tag.eq_ignore_ascii_case(language))
        .unwrap_or(false)
}
