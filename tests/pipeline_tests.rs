use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use tg_digest::core::config::{AppConfig, LlmConfig, TelegramConfig};
use tg_digest::core::models::{ChannelFeed, ChannelRef, CollectedMessage};
use tg_digest::errors::{DigestError, Service};
use tg_digest::pipeline::{self, MessageSource, Summarizer, TextSink};

fn test_config() -> AppConfig {
    AppConfig {
        telegram: TelegramConfig {
            api_id: 1,
            api_hash: "hash".into(),
            phone: None,
            session_name: "test".into(),
            bot_token: "token".into(),
            report_channel_id: "-100123".into(),
        },
        llm: LlmConfig {
            api_key: "key".into(),
            model: "deepseek-chat".into(),
            language: "en".into(),
        },
        channels_file: "channels.txt".into(),
        days_back: 7,
        top_k: 25,
    }
}

fn post(label: &str, id: i32, views: u32) -> CollectedMessage {
    CollectedMessage {
        channel: label.to_string(),
        id,
        date: Utc::now() - Duration::hours(2),
        text: "a post that is comfortably longer than the spam threshold".to_string(),
        link: None,
        views,
    }
}

/// Returns one post per channel; channels listed in `failing` error out.
struct FakeSource {
    failing: Vec<&'static str>,
}

#[async_trait]
impl MessageSource for FakeSource {
    async fn fetch_channel(
        &self,
        channel: &ChannelRef,
        _days_back: i64,
    ) -> Result<ChannelFeed, DigestError> {
        let username = channel.username().to_string();
        if self.failing.contains(&username.as_str()) {
            return Err(DigestError::ChannelFetch {
                channel: channel.to_string(),
                reason: "network error".into(),
            });
        }
        Ok(ChannelFeed {
            label: username.clone(),
            messages: vec![post(&username, 1, 120)],
        })
    }
}

/// Source whose channels have no messages in the window.
struct EmptySource;

#[async_trait]
impl MessageSource for EmptySource {
    async fn fetch_channel(
        &self,
        channel: &ChannelRef,
        _days_back: i64,
    ) -> Result<ChannelFeed, DigestError> {
        Ok(ChannelFeed {
            label: channel.username().to_string(),
            messages: vec![],
        })
    }
}

/// Replays a canned reply, or fails like an HTTP 500 when `reply` is `None`.
struct FakeModel {
    reply: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl FakeModel {
    fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Summarizer for FakeModel {
    async fn summarize(&self, _instruction: &str, prompt: &str) -> Result<String, DigestError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => Err(DigestError::external(
                Service::Summarizer,
                "HTTP 500 Internal Server Error",
            )),
        }
    }
}

struct RecordingSink {
    sent: Mutex<Vec<String>>,
}

impl RecordingSink {
    fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TextSink for RecordingSink {
    async fn send(&self, _chat_id: &str, text: &str) -> Result<(), DigestError> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

#[tokio::test]
async fn test_failed_channel_is_skipped_and_run_completes() {
    let config = test_config();
    let channels = vec![ChannelRef::new("@good"), ChannelRef::new("@broken")];
    let source = FakeSource {
        failing: vec!["broken"],
    };
    let model = FakeModel::replying("===OVERALL===\nbusy week\n===CHANNEL: good===\nchannel news");
    let sink = RecordingSink::new();

    pipeline::run(&config, &channels, &source, &model, &sink)
        .await
        .unwrap();

    let prompts = model.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("### good"));
    assert!(!prompts[0].contains("broken"));

    let sent = sink.sent.lock().unwrap();
    assert!(!sent.is_empty());
    assert!(sent[0].contains("busy week"));
}

#[tokio::test]
async fn test_summarizer_failure_aborts_before_publish() {
    let config = test_config();
    let channels = vec![ChannelRef::new("@good")];
    let source = FakeSource { failing: vec![] };
    let model = FakeModel::failing();
    let sink = RecordingSink::new();

    let err = pipeline::run(&config, &channels, &source, &model, &sink)
        .await
        .unwrap_err();

    assert_eq!(err.exit_code(), 3);
    assert!(sink.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_digest_aborts_before_publish() {
    let config = test_config();
    let channels = vec![ChannelRef::new("@good")];
    let source = FakeSource { failing: vec![] };
    let model = FakeModel::replying("here is a summary without any markers");
    let sink = RecordingSink::new();

    let err = pipeline::run(&config, &channels, &source, &model, &sink)
        .await
        .unwrap_err();

    assert!(matches!(err, DigestError::Format(_)));
    assert!(sink.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_no_messages_skips_model_and_publish() {
    let config = test_config();
    let channels = vec![ChannelRef::new("@quiet")];
    let model = FakeModel::replying("===OVERALL===\nunused");
    let sink = RecordingSink::new();

    pipeline::run(&config, &channels, &EmptySource, &model, &sink)
        .await
        .unwrap();

    assert!(model.prompts.lock().unwrap().is_empty());
    assert!(sink.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_all_channels_failing_still_completes() {
    let config = test_config();
    let channels = vec![ChannelRef::new("@a"), ChannelRef::new("@b")];
    let source = FakeSource {
        failing: vec!["a", "b"],
    };
    let model = FakeModel::replying("===OVERALL===\nunused");
    let sink = RecordingSink::new();

    pipeline::run(&config, &channels, &source, &model, &sink)
        .await
        .unwrap();

    assert!(model.prompts.lock().unwrap().is_empty());
    assert!(sink.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_digest_sections_publish_in_order() {
    let config = test_config();
    let channels = vec![ChannelRef::new("@one"), ChannelRef::new("@two")];
    let source = FakeSource { failing: vec![] };
    let model = FakeModel::replying(
        "===OVERALL===\neverything at a glance\n===CHANNEL: one===\nfirst news\n===CHANNEL: two===\nsecond news",
    );
    let sink = RecordingSink::new();

    pipeline::run(&config, &channels, &source, &model, &sink)
        .await
        .unwrap();

    let sent = sink.sent.lock().unwrap();
    assert_eq!(sent.len(), 3);
    assert!(sent[0].contains("everything at a glance"));
    assert!(sent[1].contains("first news"));
    assert!(sent[2].contains("second news"));
}
