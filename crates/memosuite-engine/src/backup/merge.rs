use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::BackupData;
use crate::models::{FolderId, Library, MemoId};

/// Timestamps closer than this are treated as the same record.
const SAME_RECORD_TOLERANCE_MS: i64 = 5_000;

fn same_moment(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    (a - b).num_milliseconds().abs() < SAME_RECORD_TOLERANCE_MS
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub folders_added: usize,
    pub memos_added: usize,
    pub memos_matched: usize,
    pub comments_added: usize,
    pub comments_skipped: usize,
}

impl Library {
    /// Merge a backup into this library without duplicating what is already here.
    ///
    /// Folders match by name. Memos match by title and a creation time within
    /// five seconds; new memos whose folder is unknown land in the first folder.
    /// Comments are dropped when their memo is unknown and skipped when an
    /// equal comment exists for the same memo.
    pub fn merge(&mut self, backup: BackupData) -> MergeReport {
        let mut report = MergeReport::default();

        let mut folder_ids: HashMap<FolderId, FolderId> = HashMap::new();
        for mut folder in backup.folders {
            let old_id = folder.id.take();
            let new_id = match self.folder_by_name(&folder.name).and_then(|f| f.id) {
                Some(existing) => existing,
                None => {
                    report.folders_added += 1;
                    self.add_folder(folder)
                }
            };
            if let Some(old_id) = old_id {
                folder_ids.insert(old_id, new_id);
            }
        }

        let default_folder = self.default_folder_id();
        let mut memo_ids: HashMap<MemoId, MemoId> = HashMap::new();
        for mut memo in backup.memos {
            let old_id = memo.id.take();
            let existing = self
                .memos
                .iter()
                .find(|m| m.title == memo.title && same_moment(m.created_at, memo.created_at))
                .and_then(|m| m.id);

            let new_id = match existing {
                Some(id) => {
                    report.memos_matched += 1;
                    id
                }
                None => {
                    memo.folder_id = memo
                        .folder_id
                        .and_then(|id| folder_ids.get(&id).copied())
                        .or(default_folder);
                    report.memos_added += 1;
                    self.add_memo(memo)
                }
            };
            if let Some(old_id) = old_id {
                memo_ids.insert(old_id, new_id);
            }
        }

        for mut comment in backup.comments {
            let Some(&memo_id) = memo_ids.get(&comment.memo_id) else {
                report.comments_skipped += 1;
                continue;
            };
            comment.id = None;
            comment.memo_id = memo_id;

            let duplicate = self.comments_for(memo_id).any(|existing| {
                existing.content == comment.content
                    && same_moment(existing.created_at, comment.created_at)
            });
            if duplicate {
                report.comments_skipped += 1;
            } else {
                report.comments_added += 1;
                self.add_comment(comment);
            }
        }

        log::info!("Merged backup: {report:?}");
        report
    }
}
