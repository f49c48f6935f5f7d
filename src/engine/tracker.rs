//! Per-product checks and the body of a tick.
//!
//! For each product: fetch from both sources, compose the status message,
//! hand it to the notifier. Failures on any single source or delivery are
//! logged and folded into the tick report; they never abort the tick.

use futures::stream::{self, StreamExt};
use tracing::{debug, error, info_span, warn, Instrument};

use super::comparator;
use crate::config::TrackerConfig;
use crate::notify::Notifier;
use crate::sources::PriceSource;
use crate::types::{Observation, Product, ProductCheck, TickReport};

pub struct Tracker {
    /// Reads `Product::flipkart_url`.
    first: Box<dyn PriceSource>,
    /// Reads `Product::amazon_url`.
    second: Box<dyn PriceSource>,
    notifier: Box<dyn Notifier>,
    /// Products fetched at once. 1 keeps everything sequential.
    concurrency: usize,
}

impl Tracker {
    pub fn new(
        first: Box<dyn PriceSource>,
        second: Box<dyn PriceSource>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            first,
            second,
            notifier,
            concurrency: 1,
        }
    }

    /// Allow up to `n` products to be fetched in parallel.
    pub fn with_concurrency(mut self, n: usize) -> Self {
        self.concurrency = n.max(1);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    async fn observe(source: &dyn PriceSource, url: &str) -> Observation {
        match source.fetch_price(url).await {
            Ok(price) => Observation::found(source.name(), price),
            Err(e) => {
                warn!(source = source.name(), url, error = %e, "Price fetch failed");
                Observation::missing(source.name())
            }
        }
    }

    /// Fetch both prices for one product and build its message.
    pub async fn check_product(&self, product: &Product, currency: &str) -> ProductCheck {
        let first = Self::observe(self.first.as_ref(), &product.flipkart_url).await;
        let second = Self::observe(self.second.as_ref(), &product.amazon_url).await;

        let message = comparator::compose(
            &product.name,
            product.target_price,
            &first,
            &second,
            currency,
        );

        debug!(
            product = %product,
            first = %first,
            second = %second,
            verdict = ?message.verdict,
            alert = message.threshold_alert,
            "Product checked"
        );

        ProductCheck {
            first,
            second,
            message,
        }
    }

    /// Send one product's message. Returns whether it was accepted.
    pub async fn deliver(&self, check: &ProductCheck) -> bool {
        match self.notifier.send(&check.message.text).await {
            Ok(()) => true,
            Err(e) => {
                error!(
                    notifier = self.notifier.name(),
                    product = %check.message.product,
                    error = %e,
                    "Notification failed"
                );
                false
            }
        }
    }

    /// Run every product in `config` once.
    ///
    /// All messages for the tick are built before any is sent, and they are
    /// sent in configuration order whatever the concurrency.
    pub async fn run_tick(&self, config: &TrackerConfig, tick_number: u64) -> TickReport {
        let span = info_span!("tick", tick = tick_number, id = %uuid::Uuid::new_v4());

        async {
            let mut report = TickReport::new(tick_number);

            let checks: Vec<ProductCheck> = stream::iter(&config.products)
                .map(|product| self.check_product(product, &config.currency))
                .buffered(self.concurrency)
                .collect()
                .await;

            for check in &checks {
                let delivered = self.deliver(check).await;
                report.record(check, delivered);
            }

            report.finish();
            report
        }
        .instrument(span)
        .await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::MockNotifier;
    use crate::sources::MockPriceSource;
    use crate::types::{TrackerError, Verdict};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn source(name: &'static str, price: Option<Decimal>) -> Box<MockPriceSource> {
        let mut m = MockPriceSource::new();
        m.expect_name().return_const(name);
        m.expect_fetch_price().returning(move |_| {
            price.ok_or_else(|| TrackerError::HttpStatus {
                source_name: name.to_string(),
                status: 503,
            })
        });
        Box::new(m)
    }

    fn accepting_notifier(times: usize) -> Box<MockNotifier> {
        let mut n = MockNotifier::new();
        n.expect_name().return_const("mock");
        n.expect_send().times(times).returning(|_| Ok(()));
        Box::new(n)
    }

    fn config(products: Vec<Product>) -> TrackerConfig {
        TrackerConfig {
            currency: "₹".to_string(),
            products,
        }
    }

    fn product(name: &str, target: Decimal) -> Product {
        Product {
            name: name.to_string(),
            flipkart_url: format!("https://flipkart.test/{name}"),
            amazon_url: format!("https://amazon.test/{name}"),
            target_price: target,
        }
    }

    #[tokio::test]
    async fn test_check_product_routes_urls() {
        let mut first = MockPriceSource::new();
        first.expect_name().return_const("Flipkart");
        first
            .expect_fetch_price()
            .withf(|url| url.ends_with("flipkart.test/tv"))
            .times(1)
            .returning(|_| Ok(dec!(100)));

        let mut second = MockPriceSource::new();
        second.expect_name().return_const("Amazon");
        second
            .expect_fetch_price()
            .withf(|url| url.ends_with("amazon.test/tv"))
            .times(1)
            .returning(|_| Ok(dec!(90)));

        let tracker = Tracker::new(Box::new(first), Box::new(second), accepting_notifier(0));
        let check = tracker.check_product(&product("tv", dec!(95)), "₹").await;

        assert_eq!(check.first.price, Some(dec!(100)));
        assert_eq!(check.second.price, Some(dec!(90)));
        assert_eq!(check.message.verdict, Some(Verdict::SecondCheaper));
        assert!(check.message.threshold_alert);
    }

    #[tokio::test]
    async fn test_fetch_failure_becomes_missing() {
        let tracker = Tracker::new(
            source("Flipkart", None),
            source("Amazon", Some(dec!(500))),
            accepting_notifier(0),
        );
        let check = tracker.check_product(&product("x", dec!(600)), "₹").await;

        assert!(check.first.price.is_none());
        assert_eq!(check.prices_found(), 1);
        assert!(check.message.text.contains("⚠️ Flipkart price not found."));
        assert!(check.message.threshold_alert);
    }

    #[tokio::test]
    async fn test_tick_notifies_even_when_both_missing() {
        let mut notifier = MockNotifier::new();
        notifier.expect_name().return_const("mock");
        notifier
            .expect_send()
            .withf(|msg| {
                msg.contains("Flipkart price not found") && msg.contains("Amazon price not found")
            })
            .times(1)
            .returning(|_| Ok(()));

        let tracker = Tracker::new(
            source("Flipkart", None),
            source("Amazon", None),
            Box::new(notifier),
        );
        let report = tracker
            .run_tick(&config(vec![product("x", dec!(10))]), 1)
            .await;

        assert_eq!(report.products_checked, 1);
        assert_eq!(report.prices_missing, 2);
        assert_eq!(report.alerts_fired, 0);
        assert_eq!(report.notifications_sent, 1);
    }

    #[tokio::test]
    async fn test_tick_counts_delivery_failures() {
        let mut notifier = MockNotifier::new();
        notifier.expect_name().return_const("mock");
        notifier
            .expect_send()
            .times(2)
            .returning(|_| Err(anyhow::anyhow!("HTTP 429")));

        let tracker = Tracker::new(
            source("Flipkart", Some(dec!(1))),
            source("Amazon", Some(dec!(2))),
            Box::new(notifier),
        );
        let cfg = config(vec![product("a", dec!(5)), product("b", dec!(0))]);
        let report = tracker.run_tick(&cfg, 3).await;

        assert_eq!(report.tick_number, 3);
        assert_eq!(report.products_checked, 2);
        assert_eq!(report.prices_found, 4);
        assert_eq!(report.alerts_fired, 1);
        assert_eq!(report.notifications_sent, 0);
        assert_eq!(report.notifications_failed, 2);
    }

    #[tokio::test]
    async fn test_empty_config_sends_nothing() {
        let tracker = Tracker::new(
            source("Flipkart", Some(dec!(1))),
            source("Amazon", Some(dec!(1))),
            accepting_notifier(0),
        );
        let report = tracker.run_tick(&config(vec![]), 1).await;
        assert_eq!(report.products_checked, 0);
    }

    #[test]
    fn test_concurrency_floor() {
        let tracker = Tracker::new(
            source("Flipkart", None),
            source("Amazon", None),
            accepting_notifier(0),
        )
        .with_concurrency(0);
        assert_eq!(tracker.concurrency(), 1);
    }
}
