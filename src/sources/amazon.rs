//! Amazon product page scraper.
//!
//! Amazon renders the buy-box price twice: a visual split of whole and
//! fraction spans, and an `a-offscreen` span holding the full string for
//! screen readers. We read the latter.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use scraper::Selector;
use tracing::debug;

use super::{extract_price, fetch_page, page_client, PriceSource};
use crate::types::TrackerError;

const SOURCE_NAME: &str = "Amazon";

pub const DEFAULT_SELECTOR: &str = "span.a-price .a-offscreen";

pub struct AmazonSource {
    http: Client,
    selector: Selector,
}

impl AmazonSource {
    pub fn new() -> Result<Self> {
        Self::with_selector(page_client()?, DEFAULT_SELECTOR)
    }

    pub fn with_selector(http: Client, selector: &str) -> Result<Self> {
        let selector = Selector::parse(selector)
            .map_err(|e| anyhow!("Invalid Amazon selector {selector:?}: {e}"))?;
        Ok(Self { http, selector })
    }

    fn parse(&self, html: &str) -> Result<Decimal, TrackerError> {
        extract_price(html, &self.selector, SOURCE_NAME)
    }
}

#[async_trait]
impl PriceSource for AmazonSource {
    async fn fetch_price(&self, url: &str) -> Result<Decimal, TrackerError> {
        let body = fetch_page(&self.http, SOURCE_NAME, url).await?;
        let price = self.parse(&body)?;
        debug!(url, %price, "Amazon price parsed");
        Ok(price)
    }

    fn name(&self) -> &'static str {
        SOURCE_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const PAGE: &str = r#"
        <div id="corePrice_feature_div">
          <span class="a-price aok-align-center">
            <span class="a-offscreen">₹1,099.00</span>
            <span aria-hidden="true">
              <span class="a-price-symbol">₹</span><span class="a-price-whole">1,099</span>
            </span>
          </span>
        </div>
        <span class="a-price a-text-price">
          <span class="a-offscreen">₹1,499.00</span>
        </span>
    "#;

    #[test]
    fn test_parse_buy_box_price() {
        let src = AmazonSource::new().unwrap();
        assert_eq!(src.parse(PAGE).unwrap(), dec!(1099.00));
    }

    #[test]
    fn test_offscreen_outside_price_ignored() {
        let src = AmazonSource::new().unwrap();
        let html = r#"<span class="a-offscreen">₹5</span>"#;
        assert!(matches!(
            src.parse(html),
            Err(TrackerError::PriceNotFound { .. })
        ));
    }

    #[test]
    fn test_unavailable_text_is_invalid() {
        let src = AmazonSource::new().unwrap();
        let html = r#"<span class="a-price"><span class="a-offscreen">Price not shown</span></span>"#;
        assert!(matches!(src.parse(html), Err(TrackerError::InvalidPrice(_))));
    }

    #[test]
    fn test_name() {
        assert_eq!(AmazonSource::new().unwrap().name(), "Amazon");
    }
}
