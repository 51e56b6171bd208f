//! Top-K selection and prompt rendering (the processor stage).

use std::collections::HashSet;

use crate::core::models::{ChannelFeed, CollectedMessage, Selection};

/// Character budget for one channel's rendered prompt block.
pub const MAX_PROMPT_CHARS_PER_CHANNEL: usize = 3500;

/// Order messages by views (descending), ties broken by date (most recent
/// first), and keep at most `top_k`. The sort is stable for equal keys.
#[must_use]
pub fn rank_messages(mut messages: Vec<CollectedMessage>, top_k: usize) -> Vec<CollectedMessage> {
    messages.sort_by(|a, b| b.views.cmp(&a.views).then_with(|| b.date.cmp(&a.date)));
    messages.truncate(top_k);
    messages
}

fn format_message(msg: &CollectedMessage) -> String {
    let views_part = if msg.views > 0 {
        format!(" [views: {}]", msg.views)
    } else {
        String::new()
    };
    let link_part = msg
        .link
        .as_deref()
        .map(|link| format!(" (link: {link})"))
        .unwrap_or_default();
    format!(
        "- [{}]{views_part}{link_part}\n{}",
        msg.date.format("%d.%m %H:%M"),
        msg.text.trim()
    )
}

/// Render one channel's ranked messages under the prompt budget.
///
/// Entries past the budget are dropped, but the first entry is always kept
/// so a channel with one oversized post still contributes something.
#[must_use]
pub fn render_channel_block(label: &str, ranked: &[CollectedMessage]) -> String {
    let mut block = format!("### {label}\n");
    let mut used = 0usize;
    for msg in ranked {
        let formatted = format_message(msg);
        let candidate = used + formatted.chars().count() + 2;
        if candidate > MAX_PROMPT_CHARS_PER_CHANNEL && used > 0 {
            break;
        }
        block.push_str(&formatted);
        block.push_str("\n\n");
        used = candidate;
    }
    block
}

/// Build the combined prompt from all channel feeds.
///
/// Duplicate message ids within a feed are dropped, channels with no
/// messages in the window are omitted, and the remaining channels appear in
/// input order. An empty [`Selection::channels`] means there is nothing to
/// summarise this run.
#[must_use]
pub fn build_selection(feeds: &[ChannelFeed], top_k: usize) -> Selection {
    let mut blocks = Vec::new();
    let mut channels = Vec::new();

    for feed in feeds {
        let mut seen = HashSet::new();
        let deduped: Vec<CollectedMessage> = feed
            .messages
            .iter()
            .filter(|msg| seen.insert(msg.id))
            .cloned()
            .collect();
        if deduped.is_empty() {
            continue;
        }

        let ranked = rank_messages(deduped, top_k);
        blocks.push(render_channel_block(&feed.label, &ranked));
        channels.push(feed.label.clone());
    }

    Selection {
        prompt: blocks.join("\n"),
        channels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn message(id: i32, views: u32, age_hours: i64) -> CollectedMessage {
        CollectedMessage {
            channel: "Test".to_string(),
            id,
            date: Utc::now() - Duration::hours(age_hours),
            text: "long enough message text to look like a real post".to_string(),
            link: None,
            views,
        }
    }

    #[test]
    fn test_rank_orders_by_views_then_recency() {
        let ranked = rank_messages(
            vec![message(1, 10, 5), message(2, 30, 10), message(3, 30, 1)],
            10,
        );
        let ids: Vec<i32> = ranked.iter().map(|m| m.id).collect();
        assert_eq!(ids, [3, 2, 1]);
    }

    #[test]
    fn test_rank_respects_top_k() {
        let messages = (0..40).map(|i| message(i, i as u32, 0)).collect();
        assert_eq!(rank_messages(messages, 25).len(), 25);
    }

    #[test]
    fn test_empty_channels_are_omitted() {
        let feeds = vec![
            ChannelFeed {
                label: "Quiet".to_string(),
                messages: vec![],
            },
            ChannelFeed {
                label: "Busy".to_string(),
                messages: vec![message(1, 5, 1)],
            },
        ];
        let selection = build_selection(&feeds, 25);

        assert_eq!(selection.channels, ["Busy"]);
        assert!(selection.prompt.contains("### Busy"));
        assert!(!selection.prompt.contains("Quiet"));
    }

    #[test]
    fn test_duplicate_ids_are_dropped() {
        let feeds = vec![ChannelFeed {
            label: "Dup".to_string(),
            messages: vec![message(7, 5, 1), message(7, 5, 1), message(8, 1, 2)],
        }];
        let selection = build_selection(&feeds, 25);
        assert_eq!(selection.prompt.matches("- [").count(), 2);
    }

    #[test]
    fn test_block_stays_under_budget() {
        let mut msg = message(1, 100, 1);
        msg.text = "x".repeat(600);
        let ranked: Vec<CollectedMessage> = (0..20)
            .map(|i| {
                let mut m = msg.clone();
                m.id = i;
                m
            })
            .collect();

        let block = render_channel_block("Big", &ranked);
        assert!(block.chars().count() <= MAX_PROMPT_CHARS_PER_CHANNEL + 64);
    }

    #[test]
    fn test_oversized_first_entry_is_kept() {
        let mut msg = message(1, 100, 1);
        msg.text = "y".repeat(MAX_PROMPT_CHARS_PER_CHANNEL + 100);
        let block = render_channel_block("Huge", &[msg]);
        assert!(block.contains("yyy"));
    }
}
