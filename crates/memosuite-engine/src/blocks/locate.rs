use xi_rope::Rope;

use crate::rope::lines_with_spans;

use super::{
    classify::{FenceLine, classify_line},
    kinds::EmbedKind,
    scan::scan_blocks,
    types::BlockRange,
};

/// Finds the block of `kind` enclosing `cursor_line`.
///
/// Scans backward from the cursor for an opener of `kind`. A closing fence
/// met before the cursor line means the cursor sits after a block, not inside
/// one, and the lookup stops. From the opener, the first closing fence below
/// it ends the block. The block is returned only if it spans the cursor line;
/// unterminated blocks and cursors past the end yield `None`.
///
/// The backward scan cannot see ordinary code fences, so a candidate is
/// checked against [`scan_blocks`]: an opener quoted inside a ```` ```markdown ````
/// fence is not a block here either.
pub fn locate_at(text: &str, kind: EmbedKind, cursor_line: usize) -> Option<BlockRange> {
    let rope = Rope::from(text);
    let lines: Vec<FenceLine> = lines_with_spans(&rope)
        .map(|l| classify_line(l.trimmed()))
        .collect();

    if cursor_line >= lines.len() {
        return None;
    }

    let mut start = None;
    for i in (0..=cursor_line).rev() {
        match lines[i] {
            FenceLine::Open(k) if k == kind => {
                start = Some(i);
                break;
            }
            FenceLine::Close if i < cursor_line => return None,
            _ => {}
        }
    }
    let start_line = start?;

    let end_line = (start_line + 1..lines.len()).find(|&i| lines[i] == FenceLine::Close)?;

    let range = BlockRange {
        start_line,
        end_line,
    };
    if !range.contains(cursor_line) {
        return None;
    }
    scan_blocks(text)
        .iter()
        .any(|b| b.kind == kind && b.range() == range)
        .then_some(range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const DOC: &str = "```fabric\nX\n```\nY";

    #[rstest]
    #[case(0, Some((0, 2)))]
    #[case(1, Some((0, 2)))]
    #[case(2, Some((0, 2)))]
    #[case(3, None)]
    #[case(9, None)]
    fn locate_around_single_block(#[case] cursor: usize, #[case] expected: Option<(usize, usize)>) {
        let found = locate_at(DOC, EmbedKind::Fabric, cursor).map(|r| (r.start_line, r.end_line));
        assert_eq!(found, expected);
    }

    #[test]
    fn wrong_kind_is_not_found() {
        assert_eq!(locate_at(DOC, EmbedKind::Spreadsheet, 1), None);
    }

    #[test]
    fn each_same_kind_block_is_reachable_by_its_own_cursor() {
        let doc = "```spreadsheet\nA\n```\ntext\n```spreadsheet\nB\nB2\n```";
        assert_eq!(
            locate_at(doc, EmbedKind::Spreadsheet, 1),
            Some(BlockRange {
                start_line: 0,
                end_line: 2
            })
        );
        assert_eq!(
            locate_at(doc, EmbedKind::Spreadsheet, 6),
            Some(BlockRange {
                start_line: 4,
                end_line: 7
            })
        );
        assert_eq!(locate_at(doc, EmbedKind::Spreadsheet, 3), None);
    }

    #[test]
    fn opener_quoted_in_code_fence_is_not_found() {
        let doc = "```markdown\n```fabric\nX\n```\n```";
        assert_eq!(locate_at(doc, EmbedKind::Fabric, 2), None);
        assert!(scan_blocks(doc).is_empty());
    }

    #[test]
    fn block_after_a_closed_code_fence_is_found() {
        let doc = "```rust\nlet x = 1;\n```\n```fabric\nX\n```";
        assert_eq!(
            locate_at(doc, EmbedKind::Fabric, 4),
            Some(BlockRange {
                start_line: 3,
                end_line: 5
            })
        );
    }

    #[test]
    fn unterminated_block_is_not_found() {
        assert_eq!(locate_at("```fabric\nX\nY", EmbedKind::Fabric, 1), None);
    }
}
