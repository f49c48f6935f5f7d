//! Command-line surface.

use clap::Parser;

use crate::config::DEFAULT_CONFIG;

/// Env var consulted when `--webhook` is not passed.
pub const WEBHOOK_ENV: &str = "DISCORD_WEBHOOK_URL";

/// Longest accepted `--interval`: one year, in minutes.
pub const MAX_INTERVAL_MINS: u64 = 525_600;

#[derive(Debug, Parser)]
#[command(name = "pricewatch", version, about = "📦 Price tracker for Flipkart & Amazon.")]
pub struct Cli {
    /// Path or URL to the YAML (or .toml) product list
    #[arg(long, default_value = DEFAULT_CONFIG)]
    pub config: String,

    /// Discord webhook URL
    #[arg(long, env = WEBHOOK_ENV, hide_env_values = true)]
    pub webhook: Option<String>,

    /// Check interval in minutes
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..=MAX_INTERVAL_MINS))]
    pub interval: u64,

    /// Run a single check and exit
    #[arg(long)]
    pub once: bool,

    /// Log messages instead of posting them
    #[arg(long)]
    pub dry_run: bool,

    /// Products fetched in parallel per tick
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..=16))]
    pub concurrency: u64,
}

impl Cli {
    pub fn interval_secs(&self) -> u64 {
        self.interval * 60
    }
}
