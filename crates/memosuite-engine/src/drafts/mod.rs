//! Autosave drafts.
//!
//! Editors snapshot their unsaved state into a [`DraftStore`] on a timer so it
//! can be offered for restore after a crash or an accidental close. The store
//! as a whole is capped at [`MAX_DRAFTS`] rows, oldest dropped first.

pub mod autosave;
pub mod file_store;
pub mod store;
pub mod types;

pub use autosave::{AUTOSAVE_INTERVAL, Autosaver, EditState, latest_for};
pub use file_store::{DRAFTS_FILE, JsonFileDraftStore};
pub use store::{DraftStore, MAX_DRAFTS, MemoryDraftStore, StoreError, prune};
pub use types::{CommentDraft, Draft, DraftId, MemoId};
