use crate::rope::Span;

use super::kinds::EmbedKind;

/// Inclusive line range of a block: `start_line` holds the opening fence and
/// `end_line` the closing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRange {
    pub start_line: usize,
    pub end_line: usize,
}

impl BlockRange {
    pub fn contains(&self, line: usize) -> bool {
        self.start_line <= line && line <= self.end_line
    }
}

/// A complete embedded block located in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedBlock {
    pub kind: EmbedKind,
    pub start_line: usize,
    pub end_line: usize,
    /// Opening fence through closing fence, without the final line terminator.
    pub span: Span,
    /// Lines strictly between the fences, without the last payload line's
    /// terminator. Empty (and positioned after the opener) when the block
    /// has no payload lines.
    pub payload_span: Span,
}

impl EmbeddedBlock {
    pub fn range(&self) -> BlockRange {
        BlockRange {
            start_line: self.start_line,
            end_line: self.end_line,
        }
    }

    /// Raw payload text, sliced from the document the block was scanned from.
    pub fn payload<'a>(&self, text: &'a str) -> &'a str {
        &text[self.payload_span.range()]
    }

    /// Whole block text, fences included.
    pub fn source<'a>(&self, text: &'a str) -> &'a str {
        &text[self.span.range()]
    }
}
