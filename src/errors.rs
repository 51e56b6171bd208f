use thiserror::Error;

/// Which external collaborator a fatal request failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Telegram,
    Summarizer,
    Publisher,
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Service::Telegram => write!(f, "Telegram"),
            Service::Summarizer => write!(f, "DeepSeek"),
            Service::Publisher => write!(f, "Telegram Bot API"),
        }
    }
}

#[derive(Debug, Error)]
pub enum DigestError {
    #[error("configuration error: {0}")]
    Config(String),

    /// Recovered per channel: logged and skipped, never fatal for the run.
    #[error("channel {channel}: {reason}")]
    ChannelFetch { channel: String, reason: String },

    #[error("{service} request failed: {reason}")]
    ExternalService { service: Service, reason: String },

    #[error("digest response did not match the expected layout: {0}")]
    Format(String),
}

impl DigestError {
    pub fn external(service: Service, reason: impl Into<String>) -> Self {
        DigestError::ExternalService {
            service,
            reason: reason.into(),
        }
    }

    /// Process exit code for unrecovered failures.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            DigestError::Config(_) | DigestError::ChannelFetch { .. } => 1,
            DigestError::ExternalService {
                service: Service::Publisher,
                ..
            } => 4,
            DigestError::ExternalService { .. } | DigestError::Format(_) => 3,
        }
    }
}
