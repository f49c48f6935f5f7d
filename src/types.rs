//! Shared types for the PRICEWATCH tracker.
//!
//! These types form the data model used across all modules.
//! Nothing here outlives a single tick: products are reloaded from
//! configuration, observations and messages are rebuilt from scratch.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fmt;

// ---------------------------------------------------------------------------
// Product
// ---------------------------------------------------------------------------

/// A product tracked on both sites.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Product {
    pub name: String,
    pub flipkart_url: String,
    pub amazon_url: String,
    /// Alert fires when the lowest observed price is at or below this.
    pub target_price: Decimal,
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (target: {})", self.name, self.target_price)
    }
}

impl Product {
    /// Helper to build a test/sample product with sensible defaults.
    #[cfg(test)]
    pub fn sample() -> Self {
        Product {
            name: "Pixel 9".to_string(),
            flipkart_url: "https://www.flipkart.com/pixel-9/p/itm123".to_string(),
            amazon_url: "https://www.amazon.in/dp/B0TEST".to_string(),
            target_price: rust_decimal_macros::dec!(60000),
        }
    }
}

// ---------------------------------------------------------------------------
// Observations
// ---------------------------------------------------------------------------

/// One source's view of a product's price for the current tick.
/// `price` is `None` when the fetch failed for any reason.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Human-readable source label ("Flipkart", "Amazon").
    pub source: String,
    pub price: Option<Decimal>,
}

impl Observation {
    pub fn found(source: &str, price: Decimal) -> Self {
        Self {
            source: source.to_string(),
            price: Some(price),
        }
    }

    pub fn missing(source: &str) -> Self {
        Self {
            source: source.to_string(),
            price: None,
        }
    }

    pub fn is_found(&self) -> bool {
        self.price.is_some()
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.price {
            Some(p) => write!(f, "{}: {p}", self.source),
            None => write!(f, "{}: not found", self.source),
        }
    }
}

/// Which of the two sources is cheaper. Only computed when both are found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    FirstCheaper,
    SecondCheaper,
    Tie,
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// A composed status message plus the decisions that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertMessage {
    pub product: String,
    pub text: String,
    pub verdict: Option<Verdict>,
    /// Whether the threshold alert line was appended.
    pub threshold_alert: bool,
    /// Lowest of the available prices, if any.
    pub lowest: Option<Decimal>,
}

/// Everything learned about one product during a tick.
#[derive(Debug, Clone)]
pub struct ProductCheck {
    pub first: Observation,
    pub second: Observation,
    pub message: AlertMessage,
}

impl ProductCheck {
    pub fn prices_found(&self) -> usize {
        usize::from(self.first.is_found()) + usize::from(self.second.is_found())
    }
}

// ---------------------------------------------------------------------------
// Tick report
// ---------------------------------------------------------------------------

/// Summary of one tick, logged at the end of the run.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub tick_number: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub products_checked: usize,
    pub prices_found: usize,
    pub prices_missing: usize,
    pub alerts_fired: usize,
    pub notifications_sent: usize,
    pub notifications_failed: usize,
}

impl TickReport {
    pub fn new(tick_number: u64) -> Self {
        let now = Utc::now();
        Self {
            tick_number,
            started_at: now,
            finished_at: now,
            products_checked: 0,
            prices_found: 0,
            prices_missing: 0,
            alerts_fired: 0,
            notifications_sent: 0,
            notifications_failed: 0,
        }
    }

    /// Fold one product's outcome into the counters.
    pub fn record(&mut self, check: &ProductCheck, delivered: bool) {
        self.products_checked += 1;
        self.prices_found += check.prices_found();
        self.prices_missing += 2 - check.prices_found();
        if check.message.threshold_alert {
            self.alerts_fired += 1;
        }
        if delivered {
            self.notifications_sent += 1;
        } else {
            self.notifications_failed += 1;
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Utc::now();
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

impl fmt::Display for TickReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tick #{}: {} products | {} prices found, {} missing | {} alerts | {} sent, {} failed",
            self.tick_number,
            self.products_checked,
            self.prices_found,
            self.prices_missing,
            self.alerts_fired,
            self.notifications_sent,
            self.notifications_failed,
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for PRICEWATCH.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("{source_name} returned HTTP {status}")]
    HttpStatus { source_name: String, status: u16 },

    #[error("{source_name} request failed: {message}")]
    Request { source_name: String, message: String },

    #[error("Price markup not found on {source_name} page")]
    PriceNotFound { source_name: String },

    #[error("Unparseable price text: {0:?}")]
    InvalidPrice(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Notification failed: {0}")]
    Notify(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
