//! The linear digest pipeline: collect, select, summarise, publish.
//!
//! Each stage runs exactly once per invocation. The only recovered failure
//! is a per-channel fetch error; everything else aborts the run.

pub mod publish;
pub mod select;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{info, warn};

use crate::ai::prompt;
use crate::core::config::AppConfig;
use crate::core::models::{ChannelFeed, ChannelRef};
use crate::errors::DigestError;

/// Capability to fetch one channel's messages within a trailing day window.
#[async_trait]
pub trait MessageSource {
    async fn fetch_channel(
        &self,
        channel: &ChannelRef,
        days_back: i64,
    ) -> Result<ChannelFeed, DigestError>;
}

/// Capability to turn an instruction plus prompt into completion text.
#[async_trait]
pub trait Summarizer {
    async fn summarize(&self, instruction: &str, prompt: &str) -> Result<String, DigestError>;
}

/// Capability to deliver one message to a destination chat.
#[async_trait]
pub trait TextSink {
    async fn send(&self, chat_id: &str, text: &str) -> Result<(), DigestError>;
}

/// Run the whole digest pipeline once.
///
/// Channel fetches are issued as a concurrent fan-out and joined before
/// processing; a failed channel is logged and skipped. When no channel has
/// messages in the window the run ends successfully without contacting the
/// model or the publisher.
///
/// # Errors
///
/// Summarizer, digest-format and publisher failures propagate unchanged.
pub async fn run<S, M, P>(
    config: &AppConfig,
    channels: &[ChannelRef],
    source: &S,
    summarizer: &M,
    sink: &P,
) -> Result<(), DigestError>
where
    S: MessageSource + Sync,
    M: Summarizer + Sync,
    P: TextSink + Sync,
{
    info!(channels = channels.len(), "collecting channel messages");

    let fetches = channels.iter().map(|channel| async move {
        (channel, source.fetch_channel(channel, config.days_back).await)
    });

    let mut feeds: Vec<ChannelFeed> = Vec::new();
    for (channel, result) in join_all(fetches).await {
        match result {
            Ok(feed) => {
                info!(channel = %channel, messages = feed.messages.len(), "collected channel");
                feeds.push(feed);
            }
            Err(err) => warn!(channel = %channel, "skipping channel: {err}"),
        }
    }

    let selection = select::build_selection(&feeds, config.top_k);
    if selection.channels.is_empty() {
        info!("no messages in the window for any channel; nothing to publish");
        return Ok(());
    }

    info!(
        channels = selection.channels.len(),
        "requesting digest from the model"
    );
    let instruction = prompt::system_instruction(&config.llm.language, &selection.channels);
    let raw = summarizer.summarize(&instruction, &selection.prompt).await?;
    let digest = prompt::parse_digest(&raw)?;

    publish::publish_digest(sink, &config.telegram.report_channel_id, &digest).await?;
    info!("digest published");
    Ok(())
}
