use std::time::Duration;

use chrono::{DateTime, Utc};

use super::store::{DraftStore, MAX_DRAFTS, StoreError, prune};
use super::types::{CommentDraft, Draft, DraftId, MemoId};

/// How often an open editor is checked for unsaved changes.
pub const AUTOSAVE_INTERVAL: Duration = Duration::from_secs(7);

/// What the editor currently holds.
///
/// `tags` is the raw comma-separated input as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditState {
    pub title: String,
    pub content: String,
    pub tags: String,
    pub comment_draft: Option<CommentDraft>,
}

impl EditState {
    /// Split the tag input on commas, dropping blanks.
    pub fn tag_list(&self) -> Vec<String> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// True when there is nothing worth keeping.
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty()
            && self.content.trim().is_empty()
            && self.comment_draft.is_none()
    }

    fn differs_from(&self, other: &EditState) -> bool {
        self.title != other.title
            || self.content != other.content
            || self.tag_list() != other.tag_list()
            || self.comment_draft != other.comment_draft
    }
}

/// Per-editor autosave policy on top of a [`DraftStore`].
///
/// One draft row is kept per editing session. The first save for an existing
/// memo clears drafts left behind by earlier sessions; later saves update the
/// same row.
#[derive(Debug)]
pub struct Autosaver {
    original_id: Option<MemoId>,
    draft_id: Option<DraftId>,
    last_saved: EditState,
    keep: usize,
}

impl Autosaver {
    /// Start tracking an editor whose persisted state is `initial`.
    pub fn new(original_id: Option<MemoId>, initial: EditState) -> Self {
        Self {
            original_id,
            draft_id: None,
            last_saved: initial,
            keep: MAX_DRAFTS,
        }
    }

    pub fn with_limit(mut self, keep: usize) -> Self {
        self.keep = keep;
        self
    }

    pub fn original_id(&self) -> Option<MemoId> {
        self.original_id
    }

    pub fn draft_id(&self) -> Option<DraftId> {
        self.draft_id
    }

    /// Timer predicate: has `interval` elapsed since `last`?
    pub fn due(last: Option<DateTime<Utc>>, now: DateTime<Utc>, interval: Duration) -> bool {
        match last {
            None => true,
            Some(last) => (now - last)
                .to_std()
                .map(|elapsed| elapsed >= interval)
                .unwrap_or(false),
        }
    }

    /// Snapshot `state` if it changed since the last save.
    ///
    /// Returns the id of the written draft, or `None` when nothing was saved.
    pub fn tick<S: DraftStore + ?Sized>(
        &mut self,
        store: &mut S,
        state: &EditState,
        now: DateTime<Utc>,
    ) -> Result<Option<DraftId>, StoreError> {
        if !state.differs_from(&self.last_saved) || state.is_blank() {
            return Ok(None);
        }

        if self.draft_id.is_none() {
            if let Some(original_id) = self.original_id {
                let stale = store.delete_by_original_id(original_id)?;
                if stale > 0 {
                    log::debug!("Cleared {stale} stale drafts for memo {original_id}");
                }
            }
        }

        let draft = Draft {
            id: self.draft_id,
            original_id: self.original_id,
            title: state.title.clone(),
            content: state.content.clone(),
            tags: state.tag_list(),
            comment_draft: state.comment_draft.clone(),
            created_at: now,
        };

        let id = store.put(draft)?;
        self.draft_id = Some(id);
        self.last_saved = state.clone();
        prune(store, self.keep)?;

        log::debug!("Autosaved draft {id} for {:?}", self.original_id);
        Ok(Some(id))
    }

    /// The memo was saved explicitly; its drafts are no longer needed.
    pub fn finish_save<S: DraftStore + ?Sized>(
        &mut self,
        store: &mut S,
        saved_id: MemoId,
        saved: EditState,
    ) -> Result<(), StoreError> {
        self.clear(store)?;
        // A new memo now has an identity of its own
        self.original_id = Some(saved_id);
        store.delete_by_original_id(saved_id)?;
        self.last_saved = saved;
        Ok(())
    }

    /// The user threw their edits away.
    pub fn discard<S: DraftStore + ?Sized>(&mut self, store: &mut S) -> Result<(), StoreError> {
        self.clear(store)
    }

    fn clear<S: DraftStore + ?Sized>(&mut self, store: &mut S) -> Result<(), StoreError> {
        match self.original_id {
            Some(original_id) => {
                store.delete_by_original_id(original_id)?;
            }
            None => {
                store.delete_unowned()?;
            }
        }
        self.draft_id = None;
        Ok(())
    }
}

/// Most recent draft to offer for restore when an editor opens.
pub fn latest_for<S: DraftStore + ?Sized>(
    store: &S,
    original_id: Option<MemoId>,
) -> Result<Option<Draft>, StoreError> {
    Ok(store
        .ordered_by_created_at()?
        .into_iter()
        .filter(|d| d.original_id == original_id)
        .next_back())
}
