//! DeepSeek chat-completions client.
//!
//! One request per run, no streaming, no retries. Failures here are fatal
//! and abort before anything is published.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::config::LlmConfig;
use crate::errors::{DigestError, Service};
use crate::pipeline::Summarizer;

const API_URL: &str = "https://api.deepseek.com/v1/chat/completions";
const TEMPERATURE: f32 = 0.3;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage<'a>],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: String,
}

/// Client for the DeepSeek chat-completions endpoint.
pub struct DeepSeekClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl DeepSeekClient {
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self, DigestError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| service_error(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    /// Send one chat completion and return the raw completion text.
    ///
    /// # Errors
    ///
    /// `DigestError::ExternalService` on a non-success status, malformed
    /// JSON, or an empty completion. Never retried.
    pub async fn chat(&self, system: &str, user: &str) -> Result<String, DigestError> {
        let messages = [
            ChatMessage {
                role: "system",
                content: system,
            },
            ChatMessage {
                role: "user",
                content: user,
            },
        ];
        let request = ChatRequest {
            model: &self.model,
            messages: &messages,
            temperature: TEMPERATURE,
        };

        let resp = self
            .http
            .post(API_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| service_error(format!("request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read body>".to_string());
            return Err(service_error(format!("HTTP {status}: {body}")));
        }

        let parsed: ChatResponse = resp
            .json()
            .await
            .map_err(|e| service_error(format!("JSON parse error: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();
        let content = content.trim();
        if content.is_empty() {
            return Err(service_error("empty completion".to_string()));
        }
        Ok(content.to_string())
    }
}

fn service_error(reason: String) -> DigestError {
    DigestError::ExternalService {
        service: Service::Summarizer,
        reason,
    }
}

#[async_trait]
impl Summarizer for DeepSeekClient {
    async fn summarize(&self, instruction: &str, prompt: &str) -> Result<String, DigestError> {
        self.chat(instruction, prompt).await
    }
}
