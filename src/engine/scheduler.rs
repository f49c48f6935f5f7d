//! Timed loop driving the tracker.
//!
//! The first tick fires immediately with the config loaded at startup.
//! Every later tick re-reads the config from its source, so edits to the
//! product list are picked up without a restart. A tick always runs to
//! completion before the loop looks at the interval or shutdown again.

use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use super::tracker::Tracker;
use crate::config::{ConfigSource, TrackerConfig};
use crate::types::TickReport;

pub struct Scheduler<'a> {
    tracker: &'a Tracker,
    source: ConfigSource,
    http: Client,
    every: Duration,
}

impl<'a> Scheduler<'a> {
    pub fn new(tracker: &'a Tracker, source: ConfigSource, http: Client, every: Duration) -> Self {
        Self {
            tracker,
            source,
            http,
            every,
        }
    }

    /// Run one tick with an already-loaded config.
    pub async fn run_once(&self, config: &TrackerConfig) -> TickReport {
        let report = self.tracker.run_tick(config, 1).await;
        log_tick_report(&report);
        report
    }

    /// Tick until `shutdown` resolves. Returns the number of ticks that ran.
    pub async fn run<F>(&self, initial: TrackerConfig, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        let mut interval = tokio::time::interval(self.every);
        // A slow tick pushes the schedule back rather than bursting.
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tokio::pin!(shutdown);

        let mut startup = Some(initial);
        let mut ticks_run = 0u64;

        info!(
            interval_secs = self.every.as_secs(),
            source = %self.source,
            "Tracker running. Press Ctrl+C to stop."
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let config = match startup.take() {
                        Some(cfg) => cfg,
                        None => match self.source.load(&self.http).await {
                            Ok(cfg) => cfg,
                            Err(e) => {
                                error!(error = %e, source = %self.source, "Config reload failed, skipping tick");
                                continue;
                            }
                        },
                    };

                    ticks_run += 1;
                    let report = self.tracker.run_tick(&config, ticks_run).await;
                    log_tick_report(&report);
                }
                _ = &mut shutdown => {
                    info!("Shutdown signal received.");
                    break;
                }
            }
        }

        ticks_run
    }
}

/// Log a human-readable tick summary.
fn log_tick_report(report: &TickReport) {
    info!(
        tick = report.tick_number,
        products = report.products_checked,
        found = report.prices_found,
        missing = report.prices_missing,
        alerts = report.alerts_fired,
        sent = report.notifications_sent,
        failed = report.notifications_failed,
        elapsed_ms = report.elapsed().num_milliseconds(),
        "Tick complete"
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::MockNotifier;
    use crate::sources::MockPriceSource;
    use crate::types::Product;
    use rust_decimal_macros::dec;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::Notify;

    const YAML: &str = "products:\n  - name: Mug\n    flipkart_url: https://f.test/mug\n    amazon_url: https://a.test/mug\n    target_price: 300\n";

    fn temp_path() -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("pricewatch_sched_{}.yaml", uuid::Uuid::new_v4()));
        p
    }

    fn priced(name: &'static str, price: rust_decimal::Decimal) -> Box<MockPriceSource> {
        let mut m = MockPriceSource::new();
        m.expect_name().return_const(name);
        m.expect_fetch_price().returning(move |_| Ok(price));
        Box::new(m)
    }

    /// Notifier that counts sends and fires `done` once `after` is reached.
    fn counting_notifier(sent: Arc<AtomicUsize>, done: Arc<Notify>, after: usize) -> Box<MockNotifier> {
        let mut n = MockNotifier::new();
        n.expect_name().return_const("mock");
        n.expect_send().returning(move |_| {
            if sent.fetch_add(1, Ordering::SeqCst) + 1 == after {
                done.notify_one();
            }
            Ok(())
        });
        Box::new(n)
    }

    fn initial() -> TrackerConfig {
        TrackerConfig {
            currency: "₹".to_string(),
            products: vec![Product {
                name: "Mug".to_string(),
                flipkart_url: "https://f.test/mug".to_string(),
                amazon_url: "https://a.test/mug".to_string(),
                target_price: dec!(300),
            }],
        }
    }

    #[tokio::test]
    async fn test_runs_immediately_then_repeats() {
        let path = temp_path();
        std::fs::write(&path, YAML).unwrap();

        let sent = Arc::new(AtomicUsize::new(0));
        let done = Arc::new(Notify::new());
        let tracker = Tracker::new(
            priced("Flipkart", dec!(250)),
            priced("Amazon", dec!(275)),
            counting_notifier(sent.clone(), done.clone(), 3),
        );

        let scheduler = Scheduler::new(
            &tracker,
            ConfigSource::Path(path.clone()),
            Client::new(),
            Duration::from_millis(5),
        );
        let ticks = scheduler
            .run(initial(), async move { done.notified().await })
            .await;

        assert!(ticks >= 3, "ticks = {ticks}");
        assert!(sent.load(Ordering::SeqCst) >= 3);

        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn test_reload_failure_skips_tick() {
        let sent = Arc::new(AtomicUsize::new(0));
        let done = Arc::new(Notify::new());
        let tracker = Tracker::new(
            priced("Flipkart", dec!(1)),
            priced("Amazon", dec!(1)),
            counting_notifier(sent.clone(), done, usize::MAX),
        );

        // Path never exists, so only the startup config produces a tick.
        let scheduler = Scheduler::new(
            &tracker,
            ConfigSource::Path(temp_path()),
            Client::new(),
            Duration::from_millis(5),
        );
        let ticks = scheduler
            .run(initial(), tokio::time::sleep(Duration::from_millis(60)))
            .await;

        assert_eq!(ticks, 1);
        assert_eq!(sent.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_run_once() {
        let sent = Arc::new(AtomicUsize::new(0));
        let tracker = Tracker::new(
            priced("Flipkart", dec!(10)),
            priced("Amazon", dec!(20)),
            counting_notifier(sent.clone(), Arc::new(Notify::new()), usize::MAX),
        );
        let scheduler = Scheduler::new(
            &tracker,
            ConfigSource::Path(temp_path()),
            Client::new(),
            Duration::from_secs(1800),
        );

        let report = scheduler.run_once(&initial()).await;
        assert_eq!(report.products_checked, 1);
        assert_eq!(report.alerts_fired, 1);
        assert_eq!(sent.load(Ordering::SeqCst), 1);
    }
}
