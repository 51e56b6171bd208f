use chrono::{DateTime, Utc};

/// Identifier for a source channel, as written in the channel list file.
///
/// Accepts `@name`, bare `name`, `t.me/name` and `https://t.me/name` forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRef {
    raw: String,
}

impl ChannelRef {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// Bare username, with any `@` or `t.me` link prefix removed.
    #[must_use]
    pub fn username(&self) -> &str {
        let s = self.raw.as_str();
        let s = s
            .strip_prefix("https://")
            .or_else(|| s.strip_prefix("http://"))
            .unwrap_or(s);
        let s = s.strip_prefix("t.me/").unwrap_or(s);
        let s = s.strip_prefix('@').unwrap_or(s);
        s.trim_end_matches('/')
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl std::fmt::Display for ChannelRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// One message pulled from a source channel. Read-only after collection.
#[derive(Debug, Clone)]
pub struct CollectedMessage {
    /// Display label of the channel the message came from.
    pub channel: String,
    pub id: i32,
    pub date: DateTime<Utc>,
    pub text: String,
    /// `https://t.me/<username>/<id>` when the channel has a public username.
    pub link: Option<String>,
    /// View counter as reported by Telegram; 0 when absent.
    pub views: u32,
}

/// Everything collected from a single channel, oldest first.
#[derive(Debug, Clone)]
pub struct ChannelFeed {
    pub label: String,
    pub messages: Vec<CollectedMessage>,
}

/// The processor's output: one combined prompt plus the channels that
/// contributed to it, in input order.
#[derive(Debug, Clone)]
pub struct Selection {
    pub prompt: String,
    pub channels: Vec<String>,
}

/// A per-channel section of the parsed digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSection {
    pub label: String,
    pub text: String,
}

/// The parsed model response, consumed once by the publisher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub overall: String,
    pub sections: Vec<ChannelSection>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_forms() {
        assert_eq!(ChannelRef::new("@rustlang").username(), "rustlang");
        assert_eq!(ChannelRef::new("rustlang").username(), "rustlang");
        assert_eq!(ChannelRef::new("t.me/rustlang").username(), "rustlang");
        assert_eq!(
            ChannelRef::new("https://t.me/rustlang/").username(),
            "rustlang"
        );
    }

    #[test]
    fn test_display_keeps_raw_form() {
        assert_eq!(ChannelRef::new("@rustlang").to_string(), "@rustlang");
    }
}
