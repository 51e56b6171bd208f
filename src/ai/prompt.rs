//! The digest instruction template and response layout.
//!
//! The model is told to structure its answer with explicit marker lines so
//! the response can be parsed without guessing at free-text headings:
//!
//! ```text
//! ===OVERALL===
//! <digest across all channels>
//! ===CHANNEL: <label>===
//! <digest for that channel>
//! ```

use crate::core::models::{ChannelSection, Digest};
use crate::errors::DigestError;

/// Marker line opening the overall digest section.
pub const OVERALL_MARKER: &str = "===OVERALL===";
/// Prefix of a per-channel marker line; the channel label follows.
pub const CHANNEL_MARKER_PREFIX: &str = "===CHANNEL:";
const MARKER_SUFFIX: &str = "===";

/// The marker line the model must emit before a channel's section.
#[must_use]
pub fn channel_marker(label: &str) -> String {
    format!("{CHANNEL_MARKER_PREFIX} {label}{MARKER_SUFFIX}")
}

/// System instruction pinning the digest language and response layout.
#[must_use]
pub fn system_instruction(language: &str, channels: &[String]) -> String {
    let markers = channels
        .iter()
        .map(|label| channel_marker(label))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are an assistant that writes concise, structured news digests in {language}. \
         Keep the key facts, numbers and names; skip filler. \
         Use markdown bullet lists where they help. \
         The user message contains recent posts grouped per channel under '### <channel>' headers.\n\
         Respond in exactly this layout, emitting the marker lines verbatim, \
         with nothing before the first marker:\n\
         {OVERALL_MARKER}\n\
         <a short digest of the period across all channels>\n\
         {markers}\n\
         After each channel marker, summarise only that channel's posts."
    )
}

/// Parse the raw model response into a [`Digest`].
///
/// Text between `===OVERALL===` and the first channel marker becomes the
/// overall section; each `===CHANNEL: <label>===` line opens a section.
/// Channels the model skipped simply have no section; empty sections are
/// dropped.
///
/// # Errors
///
/// `DigestError::Format` when the overall marker is missing, is not the
/// first marker, or its section is empty.
pub fn parse_digest(raw: &str) -> Result<Digest, DigestError> {
    let lines: Vec<&str> = raw.lines().collect();

    // Marker positions: line index plus the channel label (None = overall).
    let mut marks: Vec<(usize, Option<String>)> = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        let line = line.trim();
        if line == OVERALL_MARKER {
            marks.push((i, None));
        } else if let Some(rest) = line.strip_prefix(CHANNEL_MARKER_PREFIX)
            && let Some(label) = rest.strip_suffix(MARKER_SUFFIX)
        {
            marks.push((i, Some(label.trim().to_string())));
        }
    }

    if !matches!(marks.first(), Some((_, None))) {
        return Err(DigestError::Format(format!(
            "missing leading {OVERALL_MARKER} marker"
        )));
    }

    let mut overall = None;
    let mut sections = Vec::new();
    for (k, (line_idx, label)) in marks.iter().enumerate() {
        let end = marks.get(k + 1).map_or(lines.len(), |(next, _)| *next);
        let body = lines[line_idx + 1..end].join("\n").trim().to_string();
        match label {
            None => overall = Some(body),
            Some(label) if !body.is_empty() => sections.push(ChannelSection {
                label: label.clone(),
                text: body,
            }),
            Some(_) => {}
        }
    }

    let overall = overall
        .filter(|s| !s.is_empty())
        .ok_or_else(|| DigestError::Format("empty overall section".to_string()))?;

    Ok(Digest { overall, sections })
}
