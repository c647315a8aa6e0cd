use std::path::Path;

use serde::{Deserialize, Serialize};

use super::threads::{ThreadPlan, prepare_thread};
use super::types::{Comment, CommentId, Folder, FolderId, Memo, MemoId};
use crate::io::{self, IoError};

/// File name of the library inside a data directory.
pub const LIBRARY_FILE: &str = "library.json";

/// All folders, memos and comments of one app.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Library {
    #[serde(default)]
    pub folders: Vec<Folder>,
    #[serde(default)]
    pub memos: Vec<Memo>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

fn next_id(ids: impl Iterator<Item = Option<u64>>) -> u64 {
    ids.flatten().max().unwrap_or(0) + 1
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the library from `data_dir`, or start empty if it has none yet.
    pub fn load(data_dir: &Path) -> Result<Self, IoError> {
        match io::read_json(&data_dir.join(LIBRARY_FILE)) {
            Err(IoError::NotFound(_)) => Ok(Self::default()),
            other => other,
        }
    }

    pub fn save(&self, data_dir: &Path) -> Result<(), IoError> {
        io::write_json(&data_dir.join(LIBRARY_FILE), self)
    }

    pub fn add_folder(&mut self, mut folder: Folder) -> FolderId {
        let id = next_id(self.folders.iter().map(|f| f.id));
        folder.id = Some(id);
        self.folders.push(folder);
        id
    }

    pub fn add_memo(&mut self, mut memo: Memo) -> MemoId {
        let id = next_id(self.memos.iter().map(|m| m.id));
        memo.id = Some(id);
        self.memos.push(memo);
        id
    }

    pub fn add_comment(&mut self, mut comment: Comment) -> CommentId {
        let id = next_id(self.comments.iter().map(|c| c.id));
        comment.id = Some(id);
        self.comments.push(comment);
        id
    }

    pub fn memo(&self, id: MemoId) -> Option<&Memo> {
        self.memos.iter().find(|m| m.id == Some(id))
    }

    pub fn memo_mut(&mut self, id: MemoId) -> Option<&mut Memo> {
        self.memos.iter_mut().find(|m| m.id == Some(id))
    }

    pub fn folder_by_name(&self, name: &str) -> Option<&Folder> {
        self.folders.iter().find(|f| f.name == name)
    }

    /// Folder that receives memos whose folder is unknown.
    pub fn default_folder_id(&self) -> Option<FolderId> {
        self.folders.first().and_then(|f| f.id)
    }

    pub fn comments_for(&self, memo_id: MemoId) -> impl Iterator<Item = &Comment> {
        self.comments.iter().filter(move |c| c.memo_id == memo_id)
    }

    /// Add `memo` as the next entry in the thread of `after`.
    ///
    /// Returns `None` when `after` does not exist.
    pub fn continue_thread(&mut self, after: MemoId, mut memo: Memo) -> Option<MemoId> {
        let plan: ThreadPlan = prepare_thread(self.memo(after)?, &self.memos);
        if let Some(anchor) = self.memo_mut(after) {
            plan.mark_anchor(anchor);
        }
        plan.apply(&mut memo);
        Some(self.add_memo(memo))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::thread_members;
    use crate::tests::{create_test_data_dir, create_test_file};
    use chrono::{TimeZone, Utc};

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 5, 5, 5, 5).unwrap()
    }

    #[test]
    fn test_ids_follow_highest_existing() {
        let mut library = Library::new();
        let mut imported = Memo::new("imported", "", now());
        imported.id = Some(10);
        library.memos.push(imported);

        assert_eq!(library.add_memo(Memo::new("next", "", now())), 11);
        assert_eq!(library.add_folder(Folder::new("Inbox", now())), 1);
    }

    #[test]
    fn test_continue_thread_threads_both_memos() {
        let mut library = Library::new();
        let folder = library.add_folder(Folder::new("Journal", now()));
        let mut first = Memo::new("Day 1", "", now());
        first.folder_id = Some(folder);
        let first = library.add_memo(first);

        let second = library
            .continue_thread(first, Memo::new("Day 2", "", now()))
            .unwrap();
        let third = library
            .continue_thread(second, Memo::new("Day 3", "", now()))
            .unwrap();

        let thread_id = library.memo(first).unwrap().thread_id.clone().unwrap();
        let titles: Vec<&str> = thread_members(&library.memos, &thread_id)
            .iter()
            .map(|m| m.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Day 1", "Day 2", "Day 3"]);
        assert_eq!(library.memo(third).unwrap().folder_id, Some(folder));
    }

    #[test]
    fn test_continue_thread_unknown_memo() {
        let mut library = Library::new();
        assert_eq!(library.continue_thread(99, Memo::new("x", "", now())), None);
        assert!(library.memos.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let data_dir = create_test_data_dir();
        assert_eq!(Library::load(data_dir.path()).unwrap(), Library::default());

        let mut library = Library::new();
        let memo_id = library.add_memo(Memo::new("Saved", "```yt\nabc\n```", now()));
        library.add_comment(Comment {
            id: None,
            memo_id,
            content: "nice".to_string(),
            created_at: now(),
            updated_at: now(),
        });
        library.save(data_dir.path()).unwrap();

        let loaded = Library::load(data_dir.path()).unwrap();
        assert_eq!(loaded, library);
        assert_eq!(loaded.comments_for(memo_id).count(), 1);
    }

    #[test]
    fn test_load_rejects_garbage() {
        let data_dir = create_test_data_dir();
        create_test_file(&data_dir, LIBRARY_FILE, "[1, 2");
        assert!(matches!(
            Library::load(data_dir.path()),
            Err(IoError::Json { .. })
        ));
    }
}
