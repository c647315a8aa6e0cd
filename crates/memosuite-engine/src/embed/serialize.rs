use crate::blocks::{EmbedFence, EmbedKind};

/// Renders a payload as a fenced embedded block.
///
/// The payload is written verbatim between the opening and closing fence
/// lines; nothing is escaped and no trailing newline is added.
pub fn serialize_block(kind: EmbedKind, payload: &str) -> String {
    format!(
        "{fence}{token}\n{payload}\n{fence}",
        fence = EmbedFence::BACKTICKS,
        token = kind.token()
    )
}

/// Whether some payload line would be read back as the closing fence.
///
/// Such a payload cannot round-trip: the block would end early.
pub fn payload_has_terminator(payload: &str) -> bool {
    payload.lines().any(EmbedFence::closes)
}
