use crate::blocks::{EmbedKind, EmbeddedBlock, locate_at, scan_blocks};

use super::reconcile::{Reconciled, reconcile_with};

/// An open external-editor session over one embedded block.
///
/// The session remembers the payload the editor was opened with. Periodic
/// autosaves reconcile into a private snapshot instead of the caller's
/// document, so a timer tick never forces a re-render. A document that
/// already carries an autosaved payload is still matched, because the last
/// written payload is accepted as a second checkpoint.
#[derive(Debug, Clone)]
pub struct EditSession {
    kind: EmbedKind,
    checkpoint: Option<String>,
    last_written: Option<String>,
    snapshot: Option<Reconciled>,
}

impl EditSession {
    /// Opens a session for `kind`. `checkpoint` is the raw payload handed to
    /// the editor, `None` when the editor starts from scratch.
    pub fn open(kind: EmbedKind, checkpoint: Option<&str>) -> Self {
        Self {
            kind,
            checkpoint: checkpoint.map(str::to_string),
            last_written: None,
            snapshot: None,
        }
    }

    /// Opens a session on the block of `kind` under `cursor_line`, or a
    /// fresh-insert session when the cursor is not inside one.
    pub fn open_at(document: &str, kind: EmbedKind, cursor_line: usize) -> Self {
        let block = block_at(document, kind, cursor_line);
        Self::open(kind, block.as_ref().map(|b| b.payload(document)))
    }

    pub fn kind(&self) -> EmbedKind {
        self.kind
    }

    pub fn checkpoint(&self) -> Option<&str> {
        self.checkpoint.as_deref()
    }

    /// Reconciles an in-progress payload into a snapshot of `document`.
    /// Returns the snapshot text; the caller's document is not modified.
    pub fn autosave(&mut self, document: &str, payload: &str) -> &str {
        let merged = self.merge(document, payload);
        self.last_written = Some(payload.to_string());
        &self.snapshot.insert(merged).text
    }

    /// Text of the most recent autosave, if any.
    pub fn snapshot(&self) -> Option<&str> {
        self.snapshot.as_ref().map(|s| s.text.as_str())
    }

    /// Final reconciliation when the editor saves and closes.
    pub fn commit(self, document: &str, payload: &str) -> Reconciled {
        self.merge(document, payload)
    }

    fn merge(&self, document: &str, payload: &str) -> Reconciled {
        let checkpoints: Vec<&str> = self
            .checkpoint
            .as_deref()
            .into_iter()
            .chain(self.last_written.as_deref())
            .collect();
        reconcile_with(document, self.kind, payload, &checkpoints)
    }
}

/// The complete block of `kind` that encloses `cursor_line`.
pub fn block_at(document: &str, kind: EmbedKind, cursor_line: usize) -> Option<EmbeddedBlock> {
    let range = locate_at(document, kind, cursor_line)?;
    scan_blocks(document)
        .into_iter()
        .find(|b| b.kind == kind && b.range() == range)
}
