//! Report delivery over the Telegram Bot API.
//!
//! A minimal `sendMessage` client: markdown is cleaned before sending, and
//! if Telegram still rejects the entities the chunk is re-sent once as plain
//! text. Authentication and rate-limit failures are fatal; nothing is
//! retried.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::warn;

use crate::errors::{DigestError, Service};
use crate::pipeline::TextSink;
use crate::utils::markdown::{clean_markdown, strip_markdown};

static HTTP_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(90))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .unwrap_or_else(|_| Client::new())
});

/// Build the `sendMessage` payload for a markdown chunk.
#[must_use]
fn build_markdown_payload(chat_id: &str, text: &str) -> Value {
    json!({
        "chat_id": chat_id,
        "text": text,
        "parse_mode": "Markdown",
        "disable_web_page_preview": true,
    })
}

/// Plain-text payload used when Telegram rejects the markdown entities.
#[must_use]
fn build_plain_payload(chat_id: &str, text: &str) -> Value {
    json!({
        "chat_id": chat_id,
        "text": text,
        "disable_web_page_preview": true,
    })
}

fn is_markup_error(description: &str) -> bool {
    let lowered = description.to_lowercase();
    lowered.contains("parse") || lowered.contains("entit") || lowered.contains("markdown")
}

fn publish_error(reason: String) -> DigestError {
    DigestError::ExternalService {
        service: Service::Publisher,
        reason,
    }
}

enum Delivery {
    Sent,
    BadMarkup(String),
}

/// Minimal Telegram Bot API client for posting the digest.
pub struct BotPublisher {
    token: String,
}

impl BotPublisher {
    #[must_use]
    pub fn new(token: String) -> Self {
        Self { token }
    }

    fn endpoint(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{method}", self.token)
    }

    /// Send one markdown chunk, degrading to plain text when Telegram
    /// rejects the markup.
    ///
    /// # Errors
    ///
    /// `DigestError::ExternalService` for authentication, rate-limit and any
    /// other Bot API failure. Never retried.
    pub async fn send_markdown(&self, chat_id: &str, text: &str) -> Result<(), DigestError> {
        let payload = build_markdown_payload(chat_id, &clean_markdown(text));
        match self.call(&payload).await? {
            Delivery::Sent => Ok(()),
            Delivery::BadMarkup(description) => {
                warn!("markdown rejected ({description}); resending as plain text");
                let plain = build_plain_payload(chat_id, &strip_markdown(text));
                match self.call(&plain).await? {
                    Delivery::Sent => Ok(()),
                    Delivery::BadMarkup(description) => {
                        Err(publish_error(format!("sendMessage failed: {description}")))
                    }
                }
            }
        }
    }

    async fn call(&self, payload: &Value) -> Result<Delivery, DigestError> {
        let resp = HTTP_CLIENT
            .post(self.endpoint("sendMessage"))
            .json(payload)
            .send()
            .await
            .map_err(|e| publish_error(format!("sendMessage request failed: {e}")))?;

        let status = resp.status();
        let body: Value = resp
            .json()
            .await
            .map_err(|e| publish_error(format!("sendMessage JSON parse error: {e}")))?;

        if status.is_success() && body.get("ok").and_then(Value::as_bool).unwrap_or(false) {
            return Ok(Delivery::Sent);
        }

        let description = body
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        if status == reqwest::StatusCode::BAD_REQUEST && is_markup_error(&description) {
            return Ok(Delivery::BadMarkup(description));
        }
        Err(publish_error(format!(
            "sendMessage HTTP {status}: {description}"
        )))
    }
}

#[async_trait]
impl TextSink for BotPublisher {
    async fn send(&self, chat_id: &str, text: &str) -> Result<(), DigestError> {
        self.send_markdown(chat_id, text).await
    }
}
