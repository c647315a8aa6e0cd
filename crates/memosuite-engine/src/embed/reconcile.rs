use crate::blocks::{EmbedFence, EmbedKind, EmbeddedBlock, blocks_of_kind, open_fence_at_end};

use super::serialize::{payload_has_terminator, serialize_block};

/// Which rule placed the new payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Replaced the `index`-th block of the kind, whose payload equalled the checkpoint.
    ExactMatch { index: usize },
    /// No match, but the document held exactly one block of the kind.
    SoleBlock,
    /// Filled the `index`-th block of the kind, a placeholder with an empty payload.
    EmptyBlock { index: usize },
    /// No suitable block; the new block was added at the end.
    Appended,
}

/// Result of merging an edited payload into a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub text: String,
    pub outcome: ReconcileOutcome,
}

/// Normal form used to compare payloads: carriage returns removed and
/// surrounding whitespace trimmed.
pub fn normalize_payload(payload: &str) -> String {
    payload.replace('\r', "").trim().to_string()
}

/// Merges `new_payload` into `document` as a block of `kind`.
///
/// `checkpoint` is the raw payload loaded into the editor when the session
/// began, or `None` for a brand-new embed. Rules, first hit wins:
///
/// 1. replace the first block whose normalized payload equals the checkpoint
/// 2. replace the only block of `kind`, if there is exactly one
/// 3. replace the first block of `kind` with an empty payload
/// 4. append a new block at the end of the document
///
/// Only the chosen block's bytes change, with one exception: when no existing
/// block is chosen and the document ends inside an unclosed fence, a closing
/// fence line is added first and rules 1 to 3 are tried again, so the edit
/// never disappears into the open fence. Never fails.
pub fn reconcile(
    document: &str,
    kind: EmbedKind,
    new_payload: &str,
    checkpoint: Option<&str>,
) -> Reconciled {
    let checkpoints: Vec<&str> = checkpoint.into_iter().collect();
    reconcile_with(document, kind, new_payload, &checkpoints)
}

/// [`reconcile`] with several acceptable checkpoints, tried in order for the
/// exact-match rule.
pub(crate) fn reconcile_with(
    document: &str,
    kind: EmbedKind,
    new_payload: &str,
    checkpoints: &[&str],
) -> Reconciled {
    if payload_has_terminator(new_payload) {
        log::warn!("{kind} payload contains a closing fence line and will not round-trip");
    }

    let block_text = serialize_block(kind, new_payload);

    let blocks = blocks_of_kind(document, kind);
    if let Some((block, outcome)) = choose_target(document, &blocks, checkpoints) {
        return splice(document, kind, block, &block_text, outcome);
    }

    // A fence left open at the end would swallow an appended block.
    let closed;
    let mut document = document;
    if let Some(open) = open_fence_at_end(document) {
        log::warn!("closing fence left open at line {} before adding {kind} block", open.line);
        closed = close_open_fence(document);
        document = closed.as_str();

        let blocks = blocks_of_kind(document, kind);
        if let Some((block, outcome)) = choose_target(document, &blocks, checkpoints) {
            return splice(document, kind, block, &block_text, outcome);
        }
    }

    log::debug!("no {kind} block to replace, appending");
    Reconciled {
        text: append_block(document, &block_text),
        outcome: ReconcileOutcome::Appended,
    }
}

fn splice(
    document: &str,
    kind: EmbedKind,
    block: &EmbeddedBlock,
    block_text: &str,
    outcome: ReconcileOutcome,
) -> Reconciled {
    log::debug!(
        "replacing {kind} block at lines {}..={} ({outcome:?})",
        block.start_line,
        block.end_line
    );

    let mut text = String::with_capacity(document.len() + block_text.len());
    text.push_str(&document[..block.span.start]);
    text.push_str(block_text);
    text.push_str(&document[block.span.end..]);

    Reconciled { text, outcome }
}

fn choose_target<'b>(
    document: &str,
    blocks: &'b [EmbeddedBlock],
    checkpoints: &[&str],
) -> Option<(&'b EmbeddedBlock, ReconcileOutcome)> {
    for checkpoint in checkpoints {
        let wanted = normalize_payload(checkpoint);
        if let Some((index, block)) = blocks
            .iter()
            .enumerate()
            .find(|(_, b)| normalize_payload(b.payload(document)) == wanted)
        {
            return Some((block, ReconcileOutcome::ExactMatch { index }));
        }
    }

    if let [only] = blocks {
        return Some((only, ReconcileOutcome::SoleBlock));
    }

    blocks
        .iter()
        .enumerate()
        .find(|(_, b)| b.payload(document).trim().is_empty())
        .map(|(index, block)| (block, ReconcileOutcome::EmptyBlock { index }))
}

fn close_open_fence(document: &str) -> String {
    let mut text = document.to_string();
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text.push_str(EmbedFence::BACKTICKS);
    text
}

fn append_block(document: &str, block_text: &str) -> String {
    if document.trim().is_empty() {
        return block_text.to_string();
    }

    let mut text = String::with_capacity(document.len() + block_text.len() + 2);
    text.push_str(document);
    if !text.ends_with("\n\n") {
        text.push_str(if text.ends_with('\n') { "\n" } else { "\n\n" });
    }
    text.push_str(block_text);
    text
}
