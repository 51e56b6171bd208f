//! Markdown hygiene for Telegram's legacy `Markdown` parse mode.

use std::sync::LazyLock;

use regex::Regex;

static BOLD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("static regex"));
static ITALIC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"__(.*?)__").expect("static regex"));
static MD_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[*_`\[\]()]").expect("static regex"));

/// Reduce model markdown to the subset Telegram's legacy parser accepts.
///
/// `**bold**`/`__italic__` collapse to single markers, and any line left with
/// unbalanced `*` or `_` has those characters removed entirely.
#[must_use]
pub fn clean_markdown(text: &str) -> String {
    let text = BOLD_RE.replace_all(text, "*$1*");
    let text = ITALIC_RE.replace_all(&text, "_$1_");

    text.split('\n')
        .map(|line| {
            if line.matches('*').count() % 2 == 0 && line.matches('_').count() % 2 == 0 {
                line.to_string()
            } else {
                line.replace(['*', '_'], "")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Remove all markdown control characters for a plain-text fallback send.
#[must_use]
pub fn strip_markdown(text: &str) -> String {
    MD_CHARS_RE.replace_all(text, "").into_owned()
}
