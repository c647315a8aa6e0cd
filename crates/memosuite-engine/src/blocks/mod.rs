//! # Embedded Block Scanning
//!
//! Memos embed structured payloads (drawings, spreadsheets, video, link
//! previews) as fenced code blocks whose info string names the embed kind:
//!
//! ````text
//! ```spreadsheet
//! [{"name":"Sheet1","celldata":[...]}]
//! ```
//! ````
//!
//! Scanning is line based and never uses a document-wide regex, so adjacent
//! and repeated blocks of the same kind stay individually addressable.
//!
//! ## Modules
//!
//! - **`kinds`**: `EmbedKind` and the fence tokens that open and close a block
//! - **`classify`**: `FenceLine` classification of one line
//! - **`types`**: `BlockRange` and `EmbeddedBlock`
//! - **`locate`**: cursor-relative lookup of the enclosing block of a kind
//! - **`scan`**: full-document scan returning every block in order
//!
//! ## Key Invariants
//!
//! - Blocks never overlap; the first opener wins and consumes its lines
//! - An opener without a terminator is not a block
//! - Ordinary code fences are raw zones: embed openers inside them are ignored

pub mod classify;
pub mod kinds;
pub mod locate;
pub mod scan;
pub mod types;

pub use classify::{FenceLine, classify_line};
pub use kinds::{EmbedFence, EmbedKind, UnknownKind};
pub use locate::locate_at;
pub use scan::{OpenFence, blocks_of_kind, open_fence_at_end, scan_blocks};
pub use types::{BlockRange, EmbeddedBlock};
