//! # Embedded Content
//!
//! Everything that happens to a block once the scanner has found it:
//!
//! - **`serialize`**: payload to fenced text
//! - **`reconcile`**: merging an edited payload back into its document
//! - **`session`**: an external editor session with non-reactive autosave
//! - **`spreadsheet`**, **`drawing`**, **`media`**: payload models for previews
//! - **`render`**: block to preview, with parse failures turned into
//!   localized error previews instead of errors

pub mod drawing;
pub mod media;
pub mod reconcile;
pub mod render;
pub mod serialize;
pub mod session;
pub mod spreadsheet;

pub use drawing::DrawingScene;
pub use media::{WebEmbed, YouTubeEmbed};
pub use reconcile::{ReconcileOutcome, Reconciled, normalize_payload, reconcile};
pub use render::{EmbedPreview, Language, RenderedBlock, render_block, render_document};
pub use serialize::{payload_has_terminator, serialize_block};
pub use session::{EditSession, block_at};
pub use spreadsheet::{CellValue, Grid, SpreadsheetData, column_label};

/// Errors from parsing an embed payload. These stop at the render boundary.
#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    #[error("Invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unexpected payload shape: {0}")]
    Shape(String),
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("No video id in payload")]
    MissingVideoId,
}
