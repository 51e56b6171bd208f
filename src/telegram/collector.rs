//! Channel history collection over MTProto.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use grammers_client::types::Chat;
use tracing::debug;

use super::TelegramClient;
use crate::core::models::{ChannelFeed, ChannelRef, CollectedMessage};
use crate::errors::DigestError;
use crate::pipeline::MessageSource;

/// Posts shorter than this are pinned headers or spam; skip them.
const MIN_MESSAGE_CHARS: usize = 50;

/// True when `date` falls inside the trailing `days_back` window ending at
/// `now`.
#[must_use]
pub fn within_window(date: DateTime<Utc>, now: DateTime<Utc>, days_back: i64) -> bool {
    let cutoff = now - Duration::days(days_back);
    date >= cutoff && date <= now
}

fn fetch_error(channel: &ChannelRef, reason: impl std::fmt::Display) -> DigestError {
    DigestError::ChannelFetch {
        channel: channel.to_string(),
        reason: reason.to_string(),
    }
}

fn channel_label(chat: &Chat, fallback: &ChannelRef) -> String {
    let name = chat.name();
    if !name.is_empty() {
        return name.to_string();
    }
    chat.username()
        .map_or_else(|| fallback.to_string(), ToString::to_string)
}

impl TelegramClient {
    /// Collect a channel's messages within the trailing window, oldest
    /// first. History is walked newest-first and the walk stops at the
    /// first message older than the cutoff.
    ///
    /// # Errors
    ///
    /// `DigestError::ChannelFetch` when the channel cannot be resolved or a
    /// history request fails; the pipeline treats this as skip-and-continue.
    pub async fn fetch_channel_messages(
        &self,
        channel: &ChannelRef,
        days_back: i64,
    ) -> Result<ChannelFeed, DigestError> {
        let chat = self
            .client()
            .resolve_username(channel.username())
            .await
            .map_err(|e| fetch_error(channel, e))?
            .ok_or_else(|| fetch_error(channel, "channel not found"))?;

        let label = channel_label(&chat, channel);
        let now = Utc::now();
        let cutoff = now - Duration::days(days_back);

        let mut collected = Vec::new();
        let mut history = self.client().iter_messages(&chat);
        while let Some(message) = history.next().await.map_err(|e| fetch_error(channel, e))? {
            let date = message.date();
            if date < cutoff {
                // History is newest-first, so everything past this point is
                // older still.
                break;
            }
            if !within_window(date, now, days_back) {
                // A scheduled post dated in the future; keep walking.
                continue;
            }

            let text = message.text().trim().to_string();
            if text.chars().count() < MIN_MESSAGE_CHARS {
                continue;
            }

            let link = chat
                .username()
                .map(|u| format!("https://t.me/{u}/{}", message.id()));
            collected.push(CollectedMessage {
                channel: label.clone(),
                id: message.id(),
                date,
                text,
                link,
                views: message
                    .view_count()
                    .and_then(|v| u32::try_from(v).ok())
                    .unwrap_or(0),
            });
        }

        collected.reverse();
        debug!(channel = %channel, collected = collected.len(), "channel history walked");
        Ok(ChannelFeed {
            label,
            messages: collected,
        })
    }
}

#[async_trait]
impl MessageSource for TelegramClient {
    async fn fetch_channel(
        &self,
        channel: &ChannelRef,
        days_back: i64,
    ) -> Result<ChannelFeed, DigestError> {
        self.fetch_channel_messages(channel, days_back).await
    }
}
