//! Splitting long text into ordered pieces under a size limit.

/// Telegram's hard per-message length limit, in characters.
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

/// Split `text` into ordered chunks of at most `max_chars` characters each.
///
/// Split points prefer paragraph breaks, then line breaks, then sentence
/// ends, then spaces; a hard cut is the last resort. Nothing is added or
/// dropped: concatenating the chunks reproduces `text` exactly.
#[must_use]
pub fn split_for_limit(text: &str, max_chars: usize) -> Vec<String> {
    assert!(max_chars > 0, "max_chars must be positive");

    if text.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut rest = text;
    loop {
        // Byte offset just past the max_chars-th character, if there is one.
        match rest.char_indices().nth(max_chars) {
            None => {
                chunks.push(rest.to_string());
                break;
            }
            Some((window_end, _)) => {
                let window = &rest[..window_end];
                let cut = find_cut(window);
                chunks.push(window[..cut].to_string());
                rest = &rest[cut..];
            }
        }
    }
    chunks
}

/// Pick a byte offset to cut `window` at, preferring natural boundaries.
/// The separator stays at the end of the leading piece so nothing is lost.
fn find_cut(window: &str) -> usize {
    if let Some(idx) = window.rfind("\n\n") {
        return idx + 2;
    }
    if let Some(idx) = window.rfind('\n') {
        return idx + 1;
    }
    if let Some(idx) = window.rfind(". ") {
        return idx + 2;
    }
    if let Some(idx) = window.rfind(' ') {
        return idx + 1;
    }
    window.len()
}
