//! Discord webhook notifier.
//!
//! API docs: https://discord.com/developers/docs/resources/webhook#execute-webhook
//! Body: `{"content": "..."}`
//! Success: `204 No Content` (no `?wait=true`).

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

use super::Notifier;
use crate::types::TrackerError;

const NOTIFIER_NAME: &str = "discord";

/// Discord rejects `content` longer than this.
pub const MAX_CONTENT_CHARS: usize = 2000;

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
}

/// Posts messages to a Discord channel webhook.
pub struct DiscordWebhook {
    http: Client,
    /// Webhook URLs embed their own token; keep them out of logs.
    url: SecretString,
}

impl DiscordWebhook {
    /// Validate the webhook URL and build the client.
    pub fn new(url: SecretString) -> Result<Self> {
        let parsed = Url::parse(url.expose_secret())
            .map_err(|e| TrackerError::Config(format!("Invalid webhook URL: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(TrackerError::Config(format!(
                "Webhook URL must be http(s), got {}",
                parsed.scheme()
            ))
            .into());
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent("PRICEWATCH/0.1.0")
            .build()
            .context("Failed to build HTTP client for Discord")?;

        Ok(Self { http, url })
    }

    /// Trim to Discord's content limit on a char boundary.
    fn clamp(message: &str) -> &str {
        match message.char_indices().nth(MAX_CONTENT_CHARS) {
            Some((idx, _)) => &message[..idx],
            None => message,
        }
    }
}

#[async_trait]
impl Notifier for DiscordWebhook {
    async fn send(&self, message: &str) -> Result<()> {
        let content = Self::clamp(message);
        if content.len() < message.len() {
            debug!(limit = MAX_CONTENT_CHARS, "Message truncated to Discord limit");
        }

        let resp = self
            .http
            .post(self.url.expose_secret())
            .json(&WebhookPayload { content })
            .send()
            .await
            .context("Discord webhook request failed")?;

        let status = resp.status();
        if status != StatusCode::NO_CONTENT {
            let body = resp.text().await.unwrap_or_default();
            return Err(TrackerError::Notify(format!("Discord error: HTTP {status}: {body}")).into());
        }

        info!("Alert sent to Discord");
        Ok(())
    }

    fn name(&self) -> &'static str {
        NOTIFIER_NAME
    }
}
