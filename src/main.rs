use tracing::{error, info};

use tg_digest::ai::client::DeepSeekClient;
use tg_digest::core::config::{self, AppConfig};
use tg_digest::errors::DigestError;
use tg_digest::pipeline;
use tg_digest::telegram::TelegramClient;
use tg_digest::telegram::publisher::BotPublisher;

#[tokio::main]
async fn main() {
    tg_digest::setup_logging();

    if let Err(err) = run().await {
        error!("digest run failed: {err}");
        std::process::exit(err.exit_code());
    }
}

async fn run() -> Result<(), DigestError> {
    let config = AppConfig::from_env()?;
    let channels = config::read_channels(&config.channels_file)?;
    info!(
        channels = channels.len(),
        days_back = config.days_back,
        "starting digest run"
    );

    let telegram = TelegramClient::connect(&config.telegram).await?;
    let summarizer = DeepSeekClient::new(&config.llm)?;
    let publisher = BotPublisher::new(config.telegram.bot_token.clone());

    pipeline::run(&config, &channels, &telegram, &summarizer, &publisher).await
}
