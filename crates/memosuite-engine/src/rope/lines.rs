use xi_rope::Rope;

use super::span::Span;

/// A reference to a single line in the rope with its byte span.
#[derive(Debug, Clone)]
pub struct LineRef {
    /// Byte span of this line in the rope (includes newline if present).
    pub span: Span,
    /// Byte span of the line content, without the `\n` or `\r\n` terminator.
    pub content: Span,
    /// The line text as a string, terminator included.
    pub text: String,
}

impl LineRef {
    /// Line text without its terminator.
    pub fn trimmed(&self) -> &str {
        self.text.trim_end_matches(['\r', '\n'])
    }
}

/// Returns an iterator over lines with their byte spans.
///
/// Uses `lines_raw` to preserve newline characters, so spans stay exact
/// when a block is spliced back into the document.
pub fn lines_with_spans(rope: &Rope) -> impl Iterator<Item = LineRef> + '_ {
    let mut offset = 0usize;
    rope.lines_raw(..).map(move |line| {
        let start = offset;
        let len = line.len();
        offset += len;
        let body = line.trim_end_matches(['\r', '\n']).len();
        LineRef {
            span: Span { start, end: offset },
            content: Span {
                start,
                end: start + body,
            },
            text: line.into_owned(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_cover_terminators() {
        let rope = Rope::from("a\r\nbc\nd");
        let lines: Vec<_> = lines_with_spans(&rope).collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].span, Span::new(0, 3));
        assert_eq!(lines[0].content, Span::new(0, 1));
        assert_eq!(lines[1].trimmed(), "bc");
        assert_eq!(lines[2].content, Span::new(6, 7));
    }
}
