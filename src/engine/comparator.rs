//! Price comparison and message composition.
//!
//! Takes the two observations for a product plus its target price and
//! produces the status text sent to the webhook. Absent prices are a
//! normal input: they are reported as "not found" and excluded from the
//! cheaper-source verdict and the threshold check.

use rust_decimal::Decimal;

use crate::types::{AlertMessage, Observation, Verdict};

/// Currency symbol used when the config doesn't set one.
pub const DEFAULT_CURRENCY: &str = "₹";

/// Compare two found prices. Strict less-than; equal prices tie.
pub fn verdict(first: &Observation, second: &Observation) -> Option<Verdict> {
    let (a, b) = (first.price?, second.price?);
    Some(if a < b {
        Verdict::FirstCheaper
    } else if b < a {
        Verdict::SecondCheaper
    } else {
        Verdict::Tie
    })
}

/// Lowest of whichever prices are available.
pub fn lowest(first: &Observation, second: &Observation) -> Option<Decimal> {
    match (first.price, second.price) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

/// Build the status message for one product.
pub fn compose(
    name: &str,
    target_price: Decimal,
    first: &Observation,
    second: &Observation,
    currency: &str,
) -> AlertMessage {
    let mut text = format!("📦 **{name}**\n");

    let describe = |obs: &Observation| match obs.price {
        Some(p) => format!("{}: {currency}{p}", obs.source),
        None => format!("⚠️ {} price not found.", obs.source),
    };
    text.push_str(&describe(first));
    text.push_str(" | ");
    text.push_str(&describe(second));
    text.push('\n');

    let verdict = verdict(first, second);
    match verdict {
        Some(Verdict::FirstCheaper) => {
            text.push_str(&format!("✅ {} is cheaper.\n", first.source));
        }
        Some(Verdict::SecondCheaper) => {
            text.push_str(&format!("✅ {} is cheaper.\n", second.source));
        }
        Some(Verdict::Tie) => text.push_str("🤝 Prices are the same.\n"),
        None => {}
    }

    let lowest = lowest(first, second);
    let threshold_alert = lowest.is_some_and(|p| p <= target_price);
    if threshold_alert {
        text.push_str(&format!("🔔 **Dropped below {currency}{target_price}!**\n"));
    }

    AlertMessage {
        product: name.to_string(),
        text,
        verdict,
        threshold_alert,
        lowest,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
