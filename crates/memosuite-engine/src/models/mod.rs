//! Folders, memos and comments, plus memo threads.

pub mod library;
pub mod threads;
pub mod types;

pub use library::{LIBRARY_FILE, Library};
pub use threads::{ThreadPlan, prepare_thread, thread_members};
pub use types::{Comment, CommentId, Folder, FolderId, Memo, MemoId, MemoKind};
