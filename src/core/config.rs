use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::models::ChannelRef;
use crate::errors::DigestError;

pub const DEFAULT_SESSION_NAME: &str = "telegram_summary_session";
pub const DEFAULT_MODEL: &str = "deepseek-chat";
pub const DEFAULT_LANGUAGE: &str = "ru";
pub const DEFAULT_CHANNELS_FILE: &str = "channels.txt";
pub const DEFAULT_DAYS_BACK: i64 = 7;
pub const DEFAULT_TOP_K: usize = 25;

/// Access to the Telegram side: MTProto credentials for reading channels and
/// the bot token/chat used for publishing the report.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub api_id: i32,
    pub api_hash: String,
    pub phone: Option<String>,
    pub session_name: String,
    pub bot_token: String,
    pub report_channel_id: String,
}

impl TelegramConfig {
    /// Path of the session file the MTProto client reads and writes.
    #[must_use]
    pub fn session_file(&self) -> PathBuf {
        PathBuf::from(format!("{}.session", self.session_name))
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
    /// Language the digest is requested in.
    pub language: String,
}

/// Root configuration. Loaded once at startup, immutable afterwards.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub telegram: TelegramConfig,
    pub llm: LlmConfig,
    pub channels_file: PathBuf,
    pub days_back: i64,
    pub top_k: usize,
}

fn require(name: &str) -> Result<String, DigestError> {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| DigestError::Config(format!("{name} is not set")))
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, DigestError> {
    raw.parse()
        .map_err(|_| DigestError::Config(format!("{name} is not a valid number: {raw}")))
}

impl AppConfig {
    /// Read the full configuration from the environment.
    ///
    /// A `.env` file in the working directory is loaded first and never
    /// overrides variables that are already set.
    ///
    /// # Errors
    ///
    /// Returns `DigestError::Config` when a required variable is missing or a
    /// numeric variable does not parse.
    pub fn from_env() -> Result<Self, DigestError> {
        let _ = dotenvy::dotenv();

        let telegram = TelegramConfig {
            api_id: parse_number("TELEGRAM_API_ID", &require("TELEGRAM_API_ID")?)?,
            api_hash: require("TELEGRAM_API_HASH")?,
            phone: optional("TELEGRAM_PHONE"),
            session_name: optional("TELEGRAM_SESSION_NAME")
                .unwrap_or_else(|| DEFAULT_SESSION_NAME.to_string()),
            bot_token: require("TELEGRAM_BOT_TOKEN")?,
            report_channel_id: require("REPORT_CHANNEL_ID")?,
        };

        let llm = LlmConfig {
            api_key: require("DEEPSEEK_API_KEY")?,
            model: optional("DEEPSEEK_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            language: optional("SUMMARY_LANGUAGE").unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        };

        let days_back = match optional("DAYS_BACK") {
            Some(raw) => parse_number("DAYS_BACK", &raw)?,
            None => DEFAULT_DAYS_BACK,
        };
        let top_k = match optional("TOP_K") {
            Some(raw) => parse_number("TOP_K", &raw)?,
            None => DEFAULT_TOP_K,
        };

        Ok(Self {
            telegram,
            llm,
            channels_file: PathBuf::from(
                optional("CHANNELS_FILE").unwrap_or_else(|| DEFAULT_CHANNELS_FILE.to_string()),
            ),
            days_back,
            top_k,
        })
    }
}

/// Parse channel list lines: blank lines and `#` comments are skipped.
#[must_use]
pub fn parse_channel_lines<S: AsRef<str>>(lines: impl IntoIterator<Item = S>) -> Vec<ChannelRef> {
    lines
        .into_iter()
        .filter_map(|line| {
            let candidate = line.as_ref().trim();
            if candidate.is_empty() || candidate.starts_with('#') {
                None
            } else {
                Some(ChannelRef::new(candidate))
            }
        })
        .collect()
}

/// Load and parse the channel list file.
///
/// # Errors
///
/// Returns `DigestError::Config` when the file cannot be read or yields no
/// channels.
pub fn read_channels(path: &Path) -> Result<Vec<ChannelRef>, DigestError> {
    let contents = fs::read_to_string(path).map_err(|e| {
        DigestError::Config(format!("cannot read channel list {}: {e}", path.display()))
    })?;
    let channels = parse_channel_lines(contents.lines());
    if channels.is_empty() {
        return Err(DigestError::Config(format!(
            "channel list {} is empty",
            path.display()
        )));
    }
    Ok(channels)
}
