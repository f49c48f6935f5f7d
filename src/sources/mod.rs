//! Price source integrations.
//!
//! Defines the `PriceSource` trait and provides implementations for:
//! - Flipkart: product page `div.Nx9bqj.CxhGGd`
//! - Amazon: product page `span.a-price .a-offscreen`
//!
//! Site-specific selectors stay inside each source; the comparator only
//! ever sees a label and an optional price.

pub mod amazon;
pub mod flipkart;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use scraper::{Html, Selector};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

use crate::types::TrackerError;

/// Browser-like identifier; both sites reject obvious bot agents.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0";

/// Per-request timeout for product pages.
const FETCH_TIMEOUT_SECS: u64 = 30;

/// Abstraction over a site that can report a product's current price.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch the product page at `url` and extract its price.
    async fn fetch_price(&self, url: &str) -> Result<Decimal, TrackerError>;

    /// Label used in messages and logs.
    fn name(&self) -> &'static str;
}

/// Build the HTTP client shared by the page-scraping sources.
pub fn page_client() -> anyhow::Result<Client> {
    use anyhow::Context;

    Client::builder()
        .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
        .user_agent(BROWSER_USER_AGENT)
        .build()
        .context("Failed to build HTTP client for price sources")
}

/// GET a product page and return its body. Anything other than 200 is a
/// fetch failure.
pub(crate) async fn fetch_page(
    http: &Client,
    source_name: &str,
    url: &str,
) -> Result<String, TrackerError> {
    debug!(source = source_name, url, "Fetching product page");

    let request_err = |e: reqwest::Error| TrackerError::Request {
        source_name: source_name.to_string(),
        message: e.to_string(),
    };

    let resp = http.get(url).send().await.map_err(request_err)?;

    if resp.status() != StatusCode::OK {
        return Err(TrackerError::HttpStatus {
            source_name: source_name.to_string(),
            status: resp.status().as_u16(),
        });
    }

    resp.text().await.map_err(request_err)
}

/// Text of the first element matching `selector`, trimmed.
/// `None` when nothing matches or the match is empty.
pub fn select_text(html: &str, selector: &Selector) -> Option<String> {
    let document = Html::parse_document(html);
    let text: String = document.select(selector).next()?.text().collect();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Parse a displayed price such as `₹1,23,999.00` into a decimal.
///
/// Only the rupee sign, grouping commas and whitespace are dropped. Any other
/// character (letters, signs, `%`) makes the text unreadable.
pub fn parse_price_text(raw: &str) -> Result<Decimal, TrackerError> {
    let invalid = || TrackerError::InvalidPrice(raw.to_string());

    let cleaned: String = raw
        .chars()
        .filter(|c| *c != '₹' && *c != ',' && !c.is_whitespace())
        .collect();

    // `Decimal::from_str` tolerates signs and `_`; a scraped price has neither.
    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(invalid());
    }

    Decimal::from_str(&cleaned).map_err(|_| invalid())
}

/// Extract and parse the price from a page body.
pub(crate) fn extract_price(
    html: &str,
    selector: &Selector,
    source_name: &str,
) -> Result<Decimal, TrackerError> {
    let text = select_text(html, selector).ok_or_else(|| TrackerError::PriceNotFound {
        source_name: source_name.to_string(),
    })?;
    parse_price_text(&text)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
