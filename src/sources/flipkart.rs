//! Flipkart product page scraper.
//!
//! The listing price sits in a `div` carrying both `Nx9bqj` and `CxhGGd`
//! classes. Flipkart rotates these obfuscated class names every few
//! months, so the selector is overridable.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use scraper::Selector;
use tracing::debug;

use super::{extract_price, fetch_page, page_client, PriceSource};
use crate::types::TrackerError;

const SOURCE_NAME: &str = "Flipkart";

/// Current price selector on Flipkart product pages.
pub const DEFAULT_SELECTOR: &str = "div.Nx9bqj.CxhGGd";

pub struct FlipkartSource {
    http: Client,
    selector: Selector,
}

impl FlipkartSource {
    pub fn new() -> Result<Self> {
        Self::with_selector(page_client()?, DEFAULT_SELECTOR)
    }

    /// Build with a custom client and CSS selector.
    pub fn with_selector(http: Client, selector: &str) -> Result<Self> {
        let selector = Selector::parse(selector)
            .map_err(|e| anyhow!("Invalid Flipkart selector {selector:?}: {e}"))?;
        Ok(Self { http, selector })
    }

    fn parse(&self, html: &str) -> Result<Decimal, TrackerError> {
        extract_price(html, &self.selector, SOURCE_NAME)
    }
}

#[async_trait]
impl PriceSource for FlipkartSource {
    async fn fetch_price(&self, url: &str) -> Result<Decimal, TrackerError> {
        let body = fetch_page(&self.http, SOURCE_NAME, url).await?;
        let price = self.parse(&body)?;
        debug!(url, %price, "Flipkart price parsed");
        Ok(price)
    }

    fn name(&self) -> &'static str {
        SOURCE_NAME
    }
}
