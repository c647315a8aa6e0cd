use serde::Deserialize;

use super::EmbedError;

/// Marker separating the scene JSON from an optional cached SVG preview.
pub const SVG_PREVIEW_MARKER: &str = "\n<!--SVG_PREVIEW_START-->";

const DEFAULT_WIDTH: f64 = 800.0;
const DEFAULT_HEIGHT: f64 = 600.0;
const MIN_PREVIEW_HEIGHT: f64 = 200.0;
const PREVIEW_MARGIN: f64 = 60.0;

/// Splits a drawing payload into the scene JSON and the trailing SVG
/// preview, if one was cached.
pub fn split_preview(payload: &str) -> (&str, Option<&str>) {
    match payload.split_once(SVG_PREVIEW_MARKER) {
        Some((scene, svg)) => (scene, Some(svg.trim()).filter(|s| !s.is_empty())),
        None => (payload, None),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScene {
    #[serde(default)]
    objects: Vec<RawObject>,
    width: Option<f64>,
    height: Option<f64>,
    background_config: Option<RawBackground>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawObject {
    top: Option<f64>,
    height: Option<f64>,
    scale_y: Option<f64>,
    #[serde(default)]
    is_page_background: bool,
    #[serde(default)]
    exclude_from_export: bool,
}

#[derive(Debug, Deserialize)]
struct RawBackground {
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// Summary of a drawing canvas scene, enough to size and label a preview.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingScene {
    pub width: f64,
    pub height: f64,
    /// Objects drawn by the user; page backgrounds and export-excluded
    /// helpers are not counted.
    pub object_count: usize,
    /// Lowest edge of any drawn object.
    pub content_bottom: f64,
    /// Background pattern type (`lines`, `grid`, `image`, ...), if configured.
    pub background: Option<String>,
    pub svg_preview: Option<String>,
}

impl DrawingScene {
    pub fn parse(payload: &str) -> Result<Self, EmbedError> {
        let (scene, svg) = split_preview(payload);
        let raw: RawScene = serde_json::from_str(scene)?;

        let drawn: Vec<&RawObject> = raw
            .objects
            .iter()
            .filter(|o| !o.is_page_background && !o.exclude_from_export)
            .collect();
        let content_bottom = drawn
            .iter()
            .map(|o| o.top.unwrap_or(0.0) + o.height.unwrap_or(0.0) * o.scale_y.unwrap_or(1.0))
            .fold(0.0, f64::max);

        Ok(Self {
            width: raw.width.filter(|w| *w > 0.0).unwrap_or(DEFAULT_WIDTH),
            height: raw.height.filter(|h| *h > 0.0).unwrap_or(DEFAULT_HEIGHT),
            object_count: drawn.len(),
            content_bottom,
            background: raw.background_config.and_then(|b| b.kind),
            svg_preview: svg.map(str::to_string),
        })
    }

    /// Height of a preview cropped to the drawn content plus a margin, never
    /// shorter than the minimum preview height nor taller than the canvas.
    pub fn preview_height(&self) -> f64 {
        self.height
            .min((self.content_bottom + PREVIEW_MARGIN).max(MIN_PREVIEW_HEIGHT))
    }

    pub fn is_blank(&self) -> bool {
        self.object_count == 0
    }
}
