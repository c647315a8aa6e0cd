pub mod backup;
pub mod blocks;
pub mod drafts;
pub mod embed;
pub mod guards;
pub mod io;
pub mod models;
pub mod players;
pub mod rope;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use backup::{
    BackupData, BackupError, BackupFile, MergeReport, export_backup, import_backup,
};
pub use blocks::{BlockRange, EmbedKind, EmbeddedBlock, locate_at, scan_blocks};
pub use drafts::{
    AUTOSAVE_INTERVAL, Autosaver, Draft, DraftId, DraftStore, EditState, JsonFileDraftStore,
    MAX_DRAFTS, MemoryDraftStore, StoreError, latest_for, prune,
};
pub use embed::{
    EditSession, EmbedError, EmbedPreview, Language, ReconcileOutcome, Reconciled, reconcile,
    render_block, render_document, serialize_block,
};
pub use guards::{ExitGuards, GuardDecision};
pub use io::*;
pub use models::{Comment, Folder, Library, Memo, MemoId, MemoKind, prepare_thread};
pub use players::PlayerRegistry;
