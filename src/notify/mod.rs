//! Notification sinks.
//!
//! Defines the `Notifier` trait and provides:
//! - Discord: webhook POST, success is HTTP 204
//! - Dry-run: logs the message instead of delivering it

pub mod discord;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

/// Abstraction over a destination for status messages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one message. An error means the message was not accepted.
    async fn send(&self, message: &str) -> Result<()>;

    /// Notifier name for logging.
    fn name(&self) -> &'static str;
}

/// Logs messages without sending them anywhere.
#[derive(Debug, Default)]
pub struct DryRunNotifier;

#[async_trait]
impl Notifier for DryRunNotifier {
    async fn send(&self, message: &str) -> Result<()> {
        info!(chars = message.chars().count(), "[DRY RUN] Would send:\n{message}");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "dry-run"
    }
}
