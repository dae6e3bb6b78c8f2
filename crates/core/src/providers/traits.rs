use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::rate::{CurrencyCode, CurrencyKind, RatePoint};

/// Abstraction over exchange-rate / price APIs.
///
/// Each API (Frankfurter, CoinGecko) implements this trait. If an API stops
/// working or changes, only that implementation is replaced.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait RateProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Which currency kinds this provider can price.
    fn supported_kinds(&self) -> Vec<CurrencyKind>;

    /// Latest rate: units of `to` per one unit of `from`.
    async fn get_rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> Result<f64, CoreError>;

    /// Daily rates from `start` to `end` (inclusive), sorted by date.
    async fn get_history(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RatePoint>, CoreError>;
}
