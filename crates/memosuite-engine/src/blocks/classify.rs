use super::kinds::{EmbedFence, EmbedKind};

/// Classification of a single line containing only local facts.
///
/// Each line is classified independently; pairing openers with closers is
/// left to [`locate_at`](super::locate_at) and [`scan_blocks`](super::scan_blocks).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceLine {
    /// Opens an embedded block of the given kind.
    Open(EmbedKind),
    /// A bare closing fence.
    Close,
    /// Opens an ordinary fenced code block (``` ```rust ```, ```` ```` ````).
    OtherFence,
    /// Anything else.
    Text,
}

/// Classifies a line. The line terminator, if present, is ignored.
pub fn classify_line(line: &str) -> FenceLine {
    if EmbedFence::closes(line) {
        FenceLine::Close
    } else if let Some(kind) = EmbedFence::opens(line) {
        FenceLine::Open(kind)
    } else if EmbedFence::opens_other(line) {
        FenceLine::OtherFence
    } else {
        FenceLine::Text
    }
}
