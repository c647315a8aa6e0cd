use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::types::{Draft, DraftId, MemoId};
use crate::io::IoError;

/// Row limit applied to the whole draft store after every save.
pub const MAX_DRAFTS: usize = 20;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Io(#[from] IoError),
}

/// Persistent table of autosave drafts.
///
/// Ids are assigned by the store on `add`; `put` upserts a draft carrying an id
/// (and behaves like `add` when it carries none).
pub trait DraftStore {
    fn add(&mut self, draft: Draft) -> Result<DraftId, StoreError>;
    fn put(&mut self, draft: Draft) -> Result<DraftId, StoreError>;
    fn get(&self, id: DraftId) -> Result<Option<Draft>, StoreError>;
    fn by_original_id(&self, original_id: MemoId) -> Result<Vec<Draft>, StoreError>;
    fn delete_by_original_id(&mut self, original_id: MemoId) -> Result<usize, StoreError>;
    /// Delete drafts of memos that were never saved.
    fn delete_unowned(&mut self) -> Result<usize, StoreError>;
    /// Oldest first; equal timestamps fall back to id order.
    fn ordered_by_created_at(&self) -> Result<Vec<Draft>, StoreError>;
    fn bulk_delete(&mut self, ids: &[DraftId]) -> Result<(), StoreError>;
    fn count(&self) -> Result<usize, StoreError>;
}

/// Delete the oldest drafts until at most `keep` remain. Returns how many were removed.
pub fn prune<S: DraftStore + ?Sized>(store: &mut S, keep: usize) -> Result<usize, StoreError> {
    let total = store.count()?;
    if total <= keep {
        return Ok(0);
    }

    let excess = total - keep;
    let ids: Vec<DraftId> = store
        .ordered_by_created_at()?
        .into_iter()
        .take(excess)
        .filter_map(|draft| draft.id)
        .collect();

    store.bulk_delete(&ids)?;
    log::debug!("Pruned {} autosave drafts (kept {})", ids.len(), keep);
    Ok(ids.len())
}

/// In-memory draft table shared by the concrete stores.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DraftTable {
    next_id: DraftId,
    drafts: BTreeMap<DraftId, Draft>,
}

impl DraftTable {
    fn allocate(&mut self) -> DraftId {
        // Ids start at 1 like an auto-increment key
        self.next_id = self.next_id.max(self.drafts.keys().last().copied().unwrap_or(0)) + 1;
        self.next_id
    }

    pub(crate) fn add(&mut self, draft: Draft) -> DraftId {
        let id = self.allocate();
        self.drafts.insert(id, draft.with_id(id));
        id
    }

    pub(crate) fn put(&mut self, draft: Draft) -> DraftId {
        match draft.id {
            Some(id) => {
                self.next_id = self.next_id.max(id);
                self.drafts.insert(id, draft);
                id
            }
            None => self.add(draft),
        }
    }

    pub(crate) fn get(&self, id: DraftId) -> Option<Draft> {
        self.drafts.get(&id).cloned()
    }

    pub(crate) fn by_original_id(&self, original_id: MemoId) -> Vec<Draft> {
        self.drafts
            .values()
            .filter(|d| d.original_id == Some(original_id))
            .cloned()
            .collect()
    }

    pub(crate) fn delete_where(&mut self, pred: impl Fn(&Draft) -> bool) -> usize {
        let before = self.drafts.len();
        self.drafts.retain(|_, draft| !pred(draft));
        before - self.drafts.len()
    }

    pub(crate) fn ordered_by_created_at(&self) -> Vec<Draft> {
        let mut drafts: Vec<Draft> = self.drafts.values().cloned().collect();
        // BTreeMap iteration is already id-ordered, so a stable sort keeps id as tie-breaker
        drafts.sort_by_key(|d| d.created_at);
        drafts
    }

    pub(crate) fn bulk_delete(&mut self, ids: &[DraftId]) {
        for id in ids {
            self.drafts.remove(id);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.drafts.len()
    }
}

/// Draft store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryDraftStore {
    table: DraftTable,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DraftStore for MemoryDraftStore {
    fn add(&mut self, draft: Draft) -> Result<DraftId, StoreError> {
        Ok(self.table.add(draft))
    }

    fn put(&mut self, draft: Draft) -> Result<DraftId, StoreError> {
        Ok(self.table.put(draft))
    }

    fn get(&self, id: DraftId) -> Result<Option<Draft>, StoreError> {
        Ok(self.table.get(id))
    }

    fn by_original_id(&self, original_id: MemoId) -> Result<Vec<Draft>, StoreError> {
        Ok(self.table.by_original_id(original_id))
    }

    fn delete_by_original_id(&mut self, original_id: MemoId) -> Result<usize, StoreError> {
        Ok(self
            .table
            .delete_where(|d| d.original_id == Some(original_id)))
    }

    fn delete_unowned(&mut self) -> Result<usize, StoreError> {
        Ok(self.table.delete_where(|d| d.original_id.is_none()))
    }

    fn ordered_by_created_at(&self) -> Result<Vec<Draft>, StoreError> {
        Ok(self.table.ordered_by_created_at())
    }

    fn bulk_delete(&mut self, ids: &[DraftId]) -> Result<(), StoreError> {
        self.table.bulk_delete(ids);
        Ok(())
    }

    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.table.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(seconds)
    }

    fn draft(original_id: Option<MemoId>, seconds: i64) -> Draft {
        let mut draft = Draft::new(original_id, at(seconds));
        draft.title = format!("draft at {seconds}");
        draft
    }

    #[test]
    fn test_add_assigns_increasing_ids() {
        let mut store = MemoryDraftStore::new();
        let first = store.add(draft(None, 0)).unwrap();
        let second = store.add(draft(None, 1)).unwrap();

        assert_eq!((first, second), (1, 2));
        assert_eq!(store.get(first).unwrap().unwrap().id, Some(1));
    }

    #[test]
    fn test_put_replaces_existing_row() {
        let mut store = MemoryDraftStore::new();
        let id = store.add(draft(Some(7), 0)).unwrap();

        let mut updated = store.get(id).unwrap().unwrap();
        updated.content = "edited".to_string();
        store.put(updated).unwrap();

        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.get(id).unwrap().unwrap().content, "edited");
    }

    #[test]
    fn test_ids_are_not_reused_after_delete() {
        let mut store = MemoryDraftStore::new();
        let first = store.add(draft(None, 0)).unwrap();
        store.bulk_delete(&[first]).unwrap();

        let second = store.add(draft(None, 1)).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_delete_by_original_id_and_unowned() {
        let mut store = MemoryDraftStore::new();
        store.add(draft(Some(1), 0)).unwrap();
        store.add(draft(Some(1), 1)).unwrap();
        store.add(draft(Some(2), 2)).unwrap();
        store.add(draft(None, 3)).unwrap();

        assert_eq!(store.by_original_id(1).unwrap().len(), 2);
        assert_eq!(store.delete_by_original_id(1).unwrap(), 2);
        assert_eq!(store.delete_unowned().unwrap(), 1);

        let remaining = store.ordered_by_created_at().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].original_id, Some(2));
    }

    #[test]
    fn test_prune_keeps_twenty_most_recent_of_twenty_five() {
        // Given 25 sequential inserts across a handful of memos
        let mut store = MemoryDraftStore::new();
        for i in 0..25 {
            store.add(draft(Some(i % 3), i as i64)).unwrap();
            prune(&mut store, MAX_DRAFTS).unwrap();
        }

        // Then exactly the 20 newest survive
        let remaining: Vec<i64> = store
            .ordered_by_created_at()
            .unwrap()
            .iter()
            .map(|d| (d.created_at - at(0)).num_seconds())
            .collect();
        assert_eq!(remaining, (5..25).collect::<Vec<_>>());
    }

    #[test]
    fn test_prune_breaks_timestamp_ties_by_id() {
        let mut store = MemoryDraftStore::new();
        let ids: Vec<DraftId> = (0..4)
            .map(|_| store.add(draft(None, 0)).unwrap())
            .collect();

        let removed = prune(&mut store, 2).unwrap();

        assert_eq!(removed, 2);
        assert!(store.get(ids[0]).unwrap().is_none());
        assert!(store.get(ids[1]).unwrap().is_none());
        assert!(store.get(ids[3]).unwrap().is_some());
    }

    #[test]
    fn test_prune_under_limit_is_noop() {
        let mut store = MemoryDraftStore::new();
        store.add(draft(None, 0)).unwrap();
        assert_eq!(prune(&mut store, MAX_DRAFTS).unwrap(), 0);
        assert_eq!(store.count().unwrap(), 1);
    }
}
