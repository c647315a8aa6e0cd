use xi_rope::Rope;

use crate::rope::{LineRef, Span, lines_with_spans};

use super::{
    classify::{FenceLine, classify_line},
    kinds::EmbedKind,
    types::EmbeddedBlock,
};

#[derive(Debug, Clone, Copy)]
enum ScanState {
    Outside,
    Embed {
        kind: EmbedKind,
        start_line: usize,
        start: usize,
        payload_start: usize,
        last_payload_end: Option<usize>,
    },
    /// Inside an ordinary fenced code block; nothing is recognized until it closes.
    Raw { start_line: usize },
}

/// A fence still open when the document ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenFence {
    pub line: usize,
    /// `None` for an ordinary code fence.
    pub kind: Option<EmbedKind>,
}

/// Line-at-a-time state machine that pairs embed openers with their closers.
///
/// An opener that is never closed swallows the rest of the document and
/// produces no block: with no closing fence left, nothing after it could
/// form a complete block either.
pub struct BlockScanner {
    state: ScanState,
    line_no: usize,
    out: Vec<EmbeddedBlock>,
}

impl Default for BlockScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockScanner {
    pub fn new() -> Self {
        Self {
            state: ScanState::Outside,
            line_no: 0,
            out: vec![],
        }
    }

    pub fn push(&mut self, line: &LineRef) {
        let class = classify_line(line.trimmed());

        match (self.state, class) {
            (ScanState::Outside, FenceLine::Open(kind)) => {
                self.state = ScanState::Embed {
                    kind,
                    start_line: self.line_no,
                    start: line.span.start,
                    payload_start: line.span.end,
                    last_payload_end: None,
                };
            }
            // A bare fence outside any block opens an unnamed code block.
            (ScanState::Outside, FenceLine::OtherFence | FenceLine::Close) => {
                self.state = ScanState::Raw {
                    start_line: self.line_no,
                };
            }
            (ScanState::Outside, FenceLine::Text) => {}
            (
                ScanState::Embed {
                    kind,
                    start_line,
                    start,
                    payload_start,
                    last_payload_end,
                },
                FenceLine::Close,
            ) => {
                let payload_span = match last_payload_end {
                    Some(end) => Span::new(payload_start, end),
                    None => Span::new(payload_start, payload_start),
                };
                self.out.push(EmbeddedBlock {
                    kind,
                    start_line,
                    end_line: self.line_no,
                    span: Span::new(start, line.content.end),
                    payload_span,
                });
                self.state = ScanState::Outside;
            }
            (ScanState::Embed { .. }, _) => {
                if let ScanState::Embed {
                    last_payload_end, ..
                } = &mut self.state
                {
                    *last_payload_end = Some(line.content.end);
                }
            }
            (ScanState::Raw { .. }, FenceLine::Close) => self.state = ScanState::Outside,
            (ScanState::Raw { .. }, _) => {}
        }

        self.line_no += 1;
    }

    pub fn finish(self) -> Vec<EmbeddedBlock> {
        self.finish_with_open().0
    }

    /// Completed blocks, plus the fence left open at the end, if any.
    pub fn finish_with_open(self) -> (Vec<EmbeddedBlock>, Option<OpenFence>) {
        let open = match self.state {
            ScanState::Outside => None,
            ScanState::Embed {
                kind, start_line, ..
            } => {
                log::debug!("unterminated {kind} block opened at line {start_line} ignored");
                Some(OpenFence {
                    line: start_line,
                    kind: Some(kind),
                })
            }
            ScanState::Raw { start_line } => Some(OpenFence {
                line: start_line,
                kind: None,
            }),
        };
        (self.out, open)
    }
}

fn scan(text: &str) -> (Vec<EmbeddedBlock>, Option<OpenFence>) {
    let rope = Rope::from(text);
    let mut scanner = BlockScanner::new();
    for line in lines_with_spans(&rope) {
        scanner.push(&line);
    }
    scanner.finish_with_open()
}

/// Scans the whole document top-down and returns every complete embedded
/// block in document order. Blocks never overlap.
pub fn scan_blocks(text: &str) -> Vec<EmbeddedBlock> {
    scan(text).0
}

/// The fence, embed or ordinary, that is still open when `text` ends.
///
/// Anything appended to such a document lands inside that fence.
pub fn open_fence_at_end(text: &str) -> Option<OpenFence> {
    scan(text).1
}

/// Every complete block of `kind`, in document order.
pub fn blocks_of_kind(text: &str, kind: EmbedKind) -> Vec<EmbeddedBlock> {
    scan_blocks(text)
        .into_iter()
        .filter(|b| b.kind == kind)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn summary(text: &str) -> Vec<(EmbedKind, usize, usize, String)> {
        scan_blocks(text)
            .iter()
            .map(|b| (b.kind, b.start_line, b.end_line, b.payload(text).to_string()))
            .collect()
    }

    #[test]
    fn finds_blocks_of_every_kind_in_order() {
        let doc = "intro\n```fabric\n{\"a\":1}\n```\ntext\n```yt\nabc123\n```\n```spreadsheet\n[]\n```\n";
        assert_eq!(
            summary(doc),
            vec![
                (EmbedKind::Fabric, 1, 3, "{\"a\":1}".to_string()),
                (EmbedKind::YouTube, 5, 7, "abc123".to_string()),
                (EmbedKind::Spreadsheet, 8, 10, "[]".to_string()),
            ]
        );
    }

    #[test]
    fn adjacent_same_kind_blocks_stay_separate() {
        let doc = "```fabric\nA\n```\n```fabric\nB\n```";
        let found = summary(doc);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].3, "A");
        assert_eq!(found[1].3, "B");
        assert_eq!((found[1].1, found[1].2), (3, 5));
    }

    #[test]
    fn unterminated_block_is_not_reported() {
        let doc = "```fabric\nA\n```\n```spreadsheet\n[1,2]\nno end";
        let found = summary(doc);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, EmbedKind::Fabric);
    }

    #[test]
    fn nothing_after_an_unterminated_opener_pairs_up() {
        let doc = "```fabric\nA\n```\n```rust\nfn main() {}\n```spreadsheet\n[1]";
        let found = summary(doc);
        assert_eq!(found, vec![(EmbedKind::Fabric, 0, 2, "A".to_string())]);
        assert_eq!(
            open_fence_at_end(doc),
            Some(OpenFence {
                line: 3,
                kind: None
            })
        );
    }

    #[test]
    fn open_fence_reports_kind_and_line() {
        assert_eq!(open_fence_at_end("```fabric\nA\n```\ntext"), None);
        assert_eq!(
            open_fence_at_end("intro\n```yt\nabc"),
            Some(OpenFence {
                line: 1,
                kind: Some(EmbedKind::YouTube)
            })
        );
        assert_eq!(
            open_fence_at_end("```\nstray"),
            Some(OpenFence {
                line: 0,
                kind: None
            })
        );
    }

    #[test]
    fn embed_openers_inside_code_fences_are_ignored() {
        let doc = "```markdown\n```fabric\n```\n\n```fabric\nreal\n```";
        let found = summary(doc);
        assert_eq!(found, vec![(EmbedKind::Fabric, 4, 6, "real".to_string())]);
    }

    #[test]
    fn empty_block_has_empty_payload_after_opener() {
        let doc = "```spreadsheet\n```";
        let blocks = scan_blocks(doc);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].payload(doc), "");
        assert_eq!(blocks[0].payload_span, Span::new(15, 15));
        assert_eq!(blocks[0].source(doc), doc);
    }

    #[test]
    fn multi_line_payload_keeps_inner_newlines() {
        let doc = "```web\r\nhttps://a.example\r\nsecond\r\n```\r\n";
        let blocks = scan_blocks(doc);
        assert_eq!(blocks[0].payload(doc), "https://a.example\r\nsecond");
        assert_eq!(blocks[0].source(doc), "```web\r\nhttps://a.example\r\nsecond\r\n```");
    }

    #[test]
    fn filter_by_kind() {
        let doc = "```fabric\nA\n```\n```spreadsheet\nS\n```\n```fabric\nB\n```";
        let fabrics = blocks_of_kind(doc, EmbedKind::Fabric);
        assert_eq!(fabrics.len(), 2);
        assert_eq!(fabrics[1].payload(doc), "B");
    }
}
