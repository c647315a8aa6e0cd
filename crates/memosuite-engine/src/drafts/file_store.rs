use std::path::{Path, PathBuf};

use super::store::{DraftStore, DraftTable, StoreError};
use super::types::{Draft, DraftId, MemoId};
use crate::io::{self, IoError};

/// File name of the draft table inside a data directory.
pub const DRAFTS_FILE: &str = "drafts.json";

/// Draft store persisted as a single JSON document.
///
/// The whole table is rewritten after every mutation; drafts are few and small.
#[derive(Debug)]
pub struct JsonFileDraftStore {
    path: PathBuf,
    table: DraftTable,
}

impl JsonFileDraftStore {
    /// Open the store in `data_dir`, starting empty if no file exists yet.
    ///
    /// A corrupt file is logged and replaced by an empty table on the next write.
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        let path = data_dir.join(DRAFTS_FILE);
        let table = match io::read_json::<DraftTable>(&path) {
            Ok(table) => table,
            Err(IoError::NotFound(_)) => DraftTable::default(),
            Err(IoError::Json { path, source }) => {
                log::warn!("Ignoring corrupt draft file {}: {}", path.display(), source);
                DraftTable::default()
            }
            Err(e) => return Err(e.into()),
        };
        log::debug!("Loaded {} drafts from {}", table.len(), path.display());
        Ok(Self { path, table })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), StoreError> {
        io::write_json(&self.path, &self.table)?;
        Ok(())
    }
}

impl DraftStore for JsonFileDraftStore {
    fn add(&mut self, draft: Draft) -> Result<DraftId, StoreError> {
        let id = self.table.add(draft);
        self.persist()?;
        Ok(id)
    }

    fn put(&mut self, draft: Draft) -> Result<DraftId, StoreError> {
        let id = self.table.put(draft);
        self.persist()?;
        Ok(id)
    }

    fn get(&self, id: DraftId) -> Result<Option<Draft>, StoreError> {
        Ok(self.table.get(id))
    }

    fn by_original_id(&self, original_id: MemoId) -> Result<Vec<Draft>, StoreError> {
        Ok(self.table.by_original_id(original_id))
    }

    fn delete_by_original_id(&mut self, original_id: MemoId) -> Result<usize, StoreError> {
        let removed = self
            .table
            .delete_where(|d| d.original_id == Some(original_id));
        if removed > 0 {
            self.persist()?;
        }
        Ok(removed)
    }

    fn delete_unowned(&mut self) -> Result<usize, StoreError> {
        let removed = self.table.delete_where(|d| d.original_id.is_none());
        if removed > 0 {
            self.persist()?;
        }
        Ok(removed)
    }

    fn ordered_by_created_at(&self) -> Result<Vec<Draft>, StoreError> {
        Ok(self.table.ordered_by_created_at())
    }

    fn bulk_delete(&mut self, ids: &[DraftId]) -> Result<(), StoreError> {
        if ids.is_empty() {
            return Ok(());
        }
        self.table.bulk_delete(ids);
        self.persist()
    }

    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.table.len())
    }
}
