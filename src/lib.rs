//! Weekly digest bot for public Telegram channels.
//!
//! One run of the binary walks a fixed pipeline: collect recent messages
//! from every configured channel, select the most significant ones per
//! channel, ask DeepSeek for a condensed digest in the target language, and
//! republish that digest to a report channel through the Bot API. Nothing
//! persists between runs except the MTProto session file managed by the
//! Telegram SDK; scheduling is left to cron.
//!
//! The external collaborators sit behind capability traits
//! ([`pipeline::MessageSource`], [`pipeline::Summarizer`],
//! [`pipeline::TextSink`]) so the orchestration in [`pipeline::run`] can be
//! exercised with fakes.

pub mod ai;
pub mod core;
pub mod errors;
pub mod pipeline;
pub mod telegram;
pub mod utils;

/// Configure structured logging for the CLI.
///
/// `RUST_LOG` controls the filter; the default level is `info`.
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}
