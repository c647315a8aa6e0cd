//! Render-only embeds: YouTube players and web link previews.

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use super::EmbedError;

fn video_id_regex() -> &'static Regex {
    static VIDEO_ID_REGEX: OnceLock<Regex> = OnceLock::new();
    VIDEO_ID_REGEX.get_or_init(|| {
        Regex::new(r"(?:youtube\.com/(?:watch\?(?:.*&)?v=|shorts/|embed/)|youtu\.be/)([A-Za-z0-9_-]+)")
            .expect("Invalid video id regex")
    })
}

/// A YouTube player embed.
///
/// The first payload line is a video URL or a bare video id. Further lines
/// may carry `start=<seconds>` and a `short` flag for vertical players.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YouTubeEmbed {
    pub video_id: String,
    pub start_seconds: Option<u32>,
    pub is_short: bool,
}

impl YouTubeEmbed {
    pub fn parse(payload: &str) -> Result<Self, EmbedError> {
        let mut lines = payload.lines().map(str::trim);
        let first = lines.next().unwrap_or("");

        let video_id = match video_id_regex().captures(first) {
            Some(caps) => caps[1].to_string(),
            None => first.to_string(),
        };
        if video_id.is_empty() || video_id.contains(char::is_whitespace) {
            return Err(EmbedError::MissingVideoId);
        }

        let rest: Vec<&str> = lines.collect();
        let start_seconds = rest
            .iter()
            .find_map(|l| l.strip_prefix("start="))
            .and_then(|s| s.trim().parse().ok());
        let is_short = first.contains("/shorts/") || rest.iter().any(|l| l.contains("short"));

        Ok(Self {
            video_id,
            start_seconds,
            is_short,
        })
    }

    /// Player embed URL, honouring the start offset.
    pub fn embed_url(&self) -> String {
        match self.start_seconds {
            Some(start) => format!("https://www.youtube.com/embed/{}?start={start}", self.video_id),
            None => format!("https://www.youtube.com/embed/{}", self.video_id),
        }
    }
}

/// A web link preview embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebEmbed {
    pub url: Url,
}

impl WebEmbed {
    /// The trimmed payload must be an absolute URL.
    pub fn parse(payload: &str) -> Result<Self, EmbedError> {
        let url = Url::parse(payload.trim())?;
        Ok(Self { url })
    }

    pub fn host(&self) -> Option<&str> {
        self.url.host_str()
    }
}
