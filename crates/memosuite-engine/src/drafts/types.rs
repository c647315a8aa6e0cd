use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use crate::models::MemoId;

pub type DraftId = u64;

/// Unsent comment text kept alongside a memo draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<u64>,
    pub content: String,
    pub is_new: bool,
}

/// One autosave snapshot of an editor.
///
/// `original_id` is `None` while the memo has never been saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DraftId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_id: Option<MemoId>,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_draft: Option<CommentDraft>,
    pub created_at: DateTime<Utc>,
}

impl Draft {
    pub fn new(original_id: Option<MemoId>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: None,
            original_id,
            title: String::new(),
            content: String::new(),
            tags: Vec::new(),
            comment_draft: None,
            created_at,
        }
    }

    pub fn with_id(mut self, id: DraftId) -> Self {
        self.id = Some(id);
        self
    }
}
