use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vk_wall_archiver::config::Config;
use vk_wall_archiver::progress::ConsoleProgress;
use vk_wall_archiver::run_archive;
use vk_wall_archiver::wall::VkClient;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    init_tracing()?;

    let config = Config::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    info!(
        domain = %config.domain,
        post_number = config.post_number,
        download_attachments = config.download_attachments,
        "Configuration loaded"
    );

    let client = VkClient::new(&config)?;
    let progress = ConsoleProgress::new();
    let summary = run_archive(&config, &client, &progress).await?;

    info!(
        base_dir = %summary.base_dir.display(),
        saved = summary.saved,
        examined = summary.examined,
        "Done"
    );
    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,vk_wall_archiver=info"));

    // Check if JSON logging is requested
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| matches!(v.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    if use_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    }

    Ok(())
}
