//! Runtime configuration.
//!
//! Pricing constants and the cart record path, with environment overrides
//! (`MYNY_*`) falling back to the shipped defaults.

use rust_decimal::Decimal;
use std::path::PathBuf;

use crate::domain::value_objects::Money;
use crate::storage::CART_STORE_FILE;

/// Pricing constants shared by the cart engine and the shipping quotes.
#[derive(Clone, Debug)]
pub struct Pricing {
    /// Subtotal at or above which standard shipping is free.
    pub free_shipping_threshold: Money,
    /// Flat standard-shipping fee below the threshold.
    pub flat_shipping_rate: Money,
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            free_shipping_threshold: Money::usd(Decimal::new(250, 0)),
            flat_shipping_rate: Money::usd(Decimal::new(15, 0)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub pricing: Pricing,
    pub cart_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self { pricing: Pricing::default(), cart_path: PathBuf::from(CART_STORE_FILE) }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Pricing::default();
        let threshold = env_decimal("MYNY_FREE_SHIPPING_THRESHOLD")
            .map(Money::usd)
            .unwrap_or(defaults.free_shipping_threshold);
        let rate = env_decimal("MYNY_FLAT_SHIPPING_RATE")
            .map(Money::usd)
            .unwrap_or(defaults.flat_shipping_rate);
        let cart_path = std::env::var("MYNY_CART_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(CART_STORE_FILE));
        Self {
            pricing: Pricing { free_shipping_threshold: threshold, flat_shipping_rate: rate },
            cart_path,
        }
    }
}

fn env_decimal(key: &str) -> Option<Decimal> {
    let raw = std::env::var(key).ok()?;
    match raw.parse::<Decimal>() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("ignoring unparseable {key}={raw}: {e}");
            None
        }
    }
}
