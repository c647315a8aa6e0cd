use crate::blocks::{EmbedKind, EmbeddedBlock, scan_blocks};

use super::{
    drawing::DrawingScene,
    media::{WebEmbed, YouTubeEmbed},
    spreadsheet::{Grid, SpreadsheetData},
};

/// UI language for the few messages the renderer produces itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    En,
    Ko,
}

impl Language {
    pub fn from_code(code: &str) -> Self {
        if code.trim().to_ascii_lowercase().starts_with("ko") {
            Language::Ko
        } else {
            Language::En
        }
    }

    fn render_failed(self, kind: EmbedKind) -> &'static str {
        match (self, kind) {
            (Language::En, EmbedKind::Spreadsheet) => "Failed to render spreadsheet preview",
            (Language::Ko, EmbedKind::Spreadsheet) => "스프레드시트 미리보기를 표시할 수 없습니다",
            (Language::En, EmbedKind::Fabric) => "Failed to render drawing preview",
            (Language::Ko, EmbedKind::Fabric) => "그림 미리보기를 표시할 수 없습니다",
            (Language::En, EmbedKind::Web | EmbedKind::YouTube) => "Failed to render preview",
            (Language::Ko, EmbedKind::Web | EmbedKind::YouTube) => "미리보기를 표시할 수 없습니다",
        }
    }

    pub fn empty_spreadsheet(self) -> &'static str {
        match self {
            Language::En => "Spreadsheet (Empty)",
            Language::Ko => "스프레드시트 (비어 있음)",
        }
    }

    pub fn more_data(self) -> &'static str {
        match self {
            Language::En => "... more data available in editor ...",
            Language::Ko => "... 항목 더 있음 (편집기에서 확인 가능) ...",
        }
    }
}

/// What to show in place of an embedded block.
#[derive(Debug, Clone, PartialEq)]
pub enum EmbedPreview {
    Drawing(DrawingScene),
    Spreadsheet(Grid),
    EmptySpreadsheet { label: &'static str },
    YouTube(YouTubeEmbed),
    Web(WebEmbed),
    /// Payload shown as a plain code block.
    Code { language: &'static str, source: String },
    /// Localized message shown in place of a payload that failed to parse.
    Error { kind: EmbedKind, message: &'static str },
}

impl EmbedPreview {
    /// One-line description, for logs and the command line.
    pub fn summary(&self) -> String {
        match self {
            EmbedPreview::Drawing(scene) => format!(
                "drawing {}x{} with {} objects",
                scene.width, scene.height, scene.object_count
            ),
            EmbedPreview::Spreadsheet(grid) => format!(
                "spreadsheet {}x{}{}",
                grid.height(),
                grid.width(),
                if grid.truncated { " (truncated)" } else { "" }
            ),
            EmbedPreview::EmptySpreadsheet { label } => label.to_string(),
            EmbedPreview::YouTube(video) => format!("youtube {}", video.video_id),
            EmbedPreview::Web(web) => format!("web {}", web.url),
            EmbedPreview::Code { language, source } => {
                format!("code ({language}, {} bytes)", source.len())
            }
            EmbedPreview::Error { message, .. } => format!("error: {message}"),
        }
    }
}

/// A scanned block with its preview.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedBlock {
    pub block: EmbeddedBlock,
    pub preview: EmbedPreview,
}

/// Builds the preview for one block of `text`. Never fails: drawing and
/// spreadsheet payloads that do not parse become [`EmbedPreview::Error`],
/// and web or video payloads that do not parse fall back to plain code.
pub fn render_block(text: &str, block: &EmbeddedBlock, language: Language) -> EmbedPreview {
    let payload = block.payload(text);

    match block.kind {
        EmbedKind::Fabric => match DrawingScene::parse(payload) {
            Ok(scene) => EmbedPreview::Drawing(scene),
            Err(e) => {
                log::warn!("drawing at line {} failed to parse: {e}", block.start_line);
                EmbedPreview::Error {
                    kind: block.kind,
                    message: language.render_failed(block.kind),
                }
            }
        },
        EmbedKind::Spreadsheet => match SpreadsheetData::parse(payload) {
            Ok(SpreadsheetData::Empty) => EmbedPreview::EmptySpreadsheet {
                label: language.empty_spreadsheet(),
            },
            Ok(data) => EmbedPreview::Spreadsheet(data.preview_grid()),
            Err(e) => {
                log::warn!("spreadsheet at line {} failed to parse: {e}", block.start_line);
                EmbedPreview::Error {
                    kind: block.kind,
                    message: language.render_failed(block.kind),
                }
            }
        },
        EmbedKind::Web => WebEmbed::parse(payload)
            .map(EmbedPreview::Web)
            .unwrap_or_else(|_| code(block.kind, payload)),
        EmbedKind::YouTube => YouTubeEmbed::parse(payload)
            .map(EmbedPreview::YouTube)
            .unwrap_or_else(|_| code(block.kind, payload)),
    }
}

fn code(kind: EmbedKind, payload: &str) -> EmbedPreview {
    EmbedPreview::Code {
        language: kind.token(),
        source: payload.to_string(),
    }
}

/// Previews for every embedded block in `text`, in document order.
pub fn render_document(text: &str, language: Language) -> Vec<RenderedBlock> {
    scan_blocks(text)
        .into_iter()
        .map(|block| {
            let preview = render_block(text, &block, language);
            RenderedBlock { block, preview }
        })
        .collect()
}
