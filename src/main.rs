use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chat_relay::app::{self, Console};
use chat_relay::config::Config;
use chat_relay::forward::TokioPacer;
use chat_relay::platform::telegram::TelegramApi;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout belongs to the interactive report
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,chat_relay=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from: {}", config_path.display());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let mut stdout = io::stdout().lock();
    if !app::banner(&config, &mut stdout)? {
        stdout.flush()?;
        return Ok(());
    }

    let api = TelegramApi::new(&config.telegram.bot_token);
    let mut console = Console {
        input: io::stdin().lock(),
        output: stdout,
    };

    app::run(&config, &api, &TokioPacer, &mut console).await
}
