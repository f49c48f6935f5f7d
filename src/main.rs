//! PRICEWATCH: Flipkart/Amazon price tracker
//!
//! Entry point. Parses the command line, initialises structured logging,
//! loads the product list, and runs the check loop until Ctrl+C.

use anyhow::{Context, Result};
use clap::Parser;
use secrecy::SecretString;
use std::time::Duration;
use tracing::{error, info};

use pricewatch::cli::{Cli, WEBHOOK_ENV};
use pricewatch::config::ConfigSource;
use pricewatch::engine::scheduler::Scheduler;
use pricewatch::engine::tracker::Tracker;
use pricewatch::notify::discord::DiscordWebhook;
use pricewatch::notify::{DryRunNotifier, Notifier};
use pricewatch::sources::amazon::AmazonSource;
use pricewatch::sources::flipkart::FlipkartSource;
use pricewatch::types::TrackerError;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cli = Cli::parse();

    init_logging();

    // Missing webhook is fatal even in dry-run; the flag only suppresses delivery.
    let webhook = cli.webhook.clone().ok_or_else(|| {
        TrackerError::Config(format!(
            "Discord webhook URL not provided. Use --webhook or set {WEBHOOK_ENV} env var."
        ))
    })?;
    let discord = DiscordWebhook::new(SecretString::new(webhook))?;

    let notifier: Box<dyn Notifier> = if cli.dry_run {
        info!("Dry-run mode: messages will be logged, not posted");
        Box::new(DryRunNotifier)
    } else {
        Box::new(discord)
    };

    let tracker = Tracker::new(
        Box::new(FlipkartSource::new()?),
        Box::new(AmazonSource::new()?),
        notifier,
    )
    .with_concurrency(cli.concurrency as usize);

    // -- Initial load -----------------------------------------------------

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .context("Failed to build HTTP client for config")?;
    let source = ConfigSource::parse(&cli.config);

    info!("Running initial price check...");
    let config = match source.load(&http).await {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %e, source = %source, "Could not load the config. Exiting...");
            return Err(e);
        }
    };

    let scheduler = Scheduler::new(
        &tracker,
        source,
        http,
        Duration::from_secs(cli.interval_secs()),
    );

    if cli.once {
        scheduler.run_once(&config).await;
        return Ok(());
    }

    // -- Main loop ----------------------------------------------------------

    info!(
        interval_mins = cli.interval,
        concurrency = tracker.concurrency(),
        "Entering main loop"
    );

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };
    let ticks = scheduler.run(config, shutdown).await;

    info!(ticks, "PRICEWATCH shut down cleanly.");
    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pricewatch=info"));

    let json_logging = std::env::var("PRICEWATCH_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
