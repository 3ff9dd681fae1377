//! Diagram block extraction.
//!
//! Finds every ` ```mermaid ` fenced block in a Markdown document and yields
//! its source, in document order, tagged with a 1-based ordinal. The ordinal
//! travels with the block through rendering and substitution; it is the only
//! key that ties a block to its image.
//!
//! Diagram syntax is never inspected here. Whatever sits between the fence
//! markers is handed to the renderer verbatim (after trimming).

use crate::pipeline::fence::{FenceLine, FenceTracker};
use std::ops::Range;

/// A diagram source extracted from a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramBlock {
    /// 1-based position of the block in the document.
    pub ordinal: usize,
    /// Diagram source, trimmed of surrounding whitespace.
    pub source: String,
}

/// Lazily iterate over the diagram blocks of `markdown`, in document order.
///
/// An empty iterator is a normal result: the document simply has no diagrams.
pub fn extract_blocks(markdown: &str) -> impl Iterator<Item = DiagramBlock> + '_ {
    block_spans(markdown)
        .enumerate()
        .map(|(idx, span)| DiagramBlock {
            ordinal: idx + 1,
            source: span.source.to_string(),
        })
}

/// Number of diagram blocks in `markdown`.
pub fn count_blocks(markdown: &str) -> usize {
    block_spans(markdown).count()
}

/// Where a diagram block sits in its document.
///
/// `range` runs from the opening fence (after any indentation) to the end of
/// the closing fence, line terminator excluded. Shared with
/// [`crate::pipeline::substitute`] so extraction and substitution can never
/// disagree about what counts as a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BlockSpan<'a> {
    pub(crate) range: Range<usize>,
    pub(crate) source: &'a str,
}

/// Top-level fenced blocks tagged `mermaid`, in document order.
///
/// The tag is case-insensitive and must be a whole word (` ```mermaidjs ` is
/// not a diagram block). A diagram fence nested inside another fenced block is
/// part of that block's text. An unclosed diagram fence yields nothing.
pub(crate) fn block_spans(markdown: &str) -> impl Iterator<Item = BlockSpan<'_>> + '_ {
    BlockSpans {
        text: markdown,
        pos: 0,
        fences: FenceTracker::new(),
        pending: None,
    }
}

struct BlockSpans<'a> {
    text: &'a str,
    pos: usize,
    fences: FenceTracker,
    /// Start of the open diagram fence and of its body.
    pending: Option<(usize, usize)>,
}

impl<'a> Iterator for BlockSpans<'a> {
    type Item = BlockSpan<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let text = self.text;
        while self.pos < text.len() {
            let start = self.pos;
            let rest = &text[start..];
            let line = &rest[..rest.find('\n').map_or(rest.len(), |i| i + 1)];
            self.pos += line.len();

            match self.fences.classify(line) {
                FenceLine::Open { info } if is_diagram_tag(info) => {
                    let indent = line.len() - line.trim_start().len();
                    self.pending = Some((start + indent, self.pos));
                }
                FenceLine::Close => {
                    if let Some((block_start, body_start)) = self.pending.take() {
                        return Some(BlockSpan {
                            range: block_start..start + line.trim_end().len(),
                            source: text[body_start..start].trim(),
                        });
                    }
                }
                _ => {}
            }
        }
        None
    }
}

/// `mermaid` (any case) not followed by another word character.
fn is_diagram_tag(info: &str) -> bool {
    const TAG: &str = "mermaid";
    info.get(..TAG.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(TAG))
        && !info[TAG.len()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
}
