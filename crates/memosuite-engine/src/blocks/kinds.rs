use std::fmt;
use std::str::FromStr;

/// The kind of payload carried by an embedded block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EmbedKind {
    /// Drawing canvas scene (``` ```fabric ```).
    Fabric,
    /// Spreadsheet workbook JSON (``` ```spreadsheet ```).
    Spreadsheet,
    /// Web link preview (``` ```web ```), render only.
    Web,
    /// YouTube player (``` ```youtube ``` or ``` ```yt ```), render only.
    YouTube,
}

impl EmbedKind {
    pub const ALL: [EmbedKind; 4] = [
        EmbedKind::Fabric,
        EmbedKind::Spreadsheet,
        EmbedKind::Web,
        EmbedKind::YouTube,
    ];

    /// Info-string tokens that open a block of this kind. The first one is
    /// what the serializer writes.
    pub fn tokens(self) -> &'static [&'static str] {
        match self {
            EmbedKind::Fabric => &["fabric"],
            EmbedKind::Spreadsheet => &["spreadsheet"],
            EmbedKind::Web => &["web"],
            EmbedKind::YouTube => &["youtube", "yt"],
        }
    }

    /// Canonical info-string token.
    pub fn token(self) -> &'static str {
        self.tokens()[0]
    }

    /// Whether an external editor writes this kind back into the document.
    pub fn is_editable(self) -> bool {
        matches!(self, EmbedKind::Fabric | EmbedKind::Spreadsheet)
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.tokens().contains(&token))
    }
}

impl fmt::Display for EmbedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown embed kind: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for EmbedKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(s.trim()).ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// Fence delimiters for embedded blocks.
pub struct EmbedFence;

impl EmbedFence {
    pub const BACKTICKS: &'static str = "```";

    /// Returns the embed kind opened by `line`, if any.
    ///
    /// The trimmed line must start with the backtick fence immediately
    /// followed by a kind token, and the token must end the line or be
    /// followed by whitespace, so ``` ```fabricx ``` opens nothing.
    pub fn opens(line: &str) -> Option<EmbedKind> {
        let rest = line.trim().strip_prefix(Self::BACKTICKS)?;
        let token_end = rest
            .find(|c: char| c.is_whitespace())
            .unwrap_or(rest.len());
        EmbedKind::from_token(&rest[..token_end])
    }

    /// Whether `line` is a closing fence: exactly three backticks once the
    /// line terminator and surrounding whitespace are removed.
    pub fn closes(line: &str) -> bool {
        line.trim() == Self::BACKTICKS
    }

    /// Whether `line` opens some fenced code block that is not an embed.
    pub fn opens_other(line: &str) -> bool {
        let t = line.trim();
        t.starts_with(Self::BACKTICKS) && !Self::closes(t) && Self::opens(t).is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("```fabric", Some(EmbedKind::Fabric))]
    #[case("  ```spreadsheet  ", Some(EmbedKind::Spreadsheet))]
    #[case("```yt", Some(EmbedKind::YouTube))]
    #[case("```youtube", Some(EmbedKind::YouTube))]
    #[case("```web\r\n", Some(EmbedKind::Web))]
    #[case("```fabric extra", Some(EmbedKind::Fabric))]
    #[case("```fabricx", None)]
    #[case("```rust", None)]
    #[case("```", None)]
    #[case("fabric", None)]
    fn detect_openers(#[case] line: &str, #[case] expected: Option<EmbedKind>) {
        assert_eq!(EmbedFence::opens(line), expected);
    }

    #[test]
    fn closing_fence_is_exact() {
        assert!(EmbedFence::closes("```"));
        assert!(EmbedFence::closes("```\r\n"));
        assert!(EmbedFence::closes("  ```  "));
        assert!(!EmbedFence::closes("````"));
        assert!(!EmbedFence::closes("```fabric"));
    }

    #[test]
    fn other_fences() {
        assert!(EmbedFence::opens_other("```rust"));
        assert!(!EmbedFence::opens_other("```"));
        assert!(!EmbedFence::opens_other("```spreadsheet"));
    }

    #[test]
    fn parse_kind_names() {
        assert_eq!("yt".parse::<EmbedKind>(), Ok(EmbedKind::YouTube));
        assert_eq!("fabric".parse::<EmbedKind>(), Ok(EmbedKind::Fabric));
        assert!("mermaid".parse::<EmbedKind>().is_err());
        assert_eq!(EmbedKind::YouTube.to_string(), "youtube");
    }

    #[test]
    fn only_drawings_and_sheets_are_editable() {
        assert!(EmbedKind::Fabric.is_editable());
        assert!(EmbedKind::Spreadsheet.is_editable());
        assert!(!EmbedKind::Web.is_editable());
        assert!(!EmbedKind::YouTube.is_editable());
    }
}
