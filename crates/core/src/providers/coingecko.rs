use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::rate::{CurrencyCode, CurrencyKind, RatePoint};
use super::traits::RateProvider;

const BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// CoinGecko API provider for cryptocurrency rates.
///
/// - **Free**: No API key required on the public tier.
/// - **Endpoints**: `/simple/price?ids=&vs_currencies=`,
///   `/coins/{id}/market_chart?vs_currency=&days=&interval=daily`
///
/// CoinGecko quotes a coin (`ids`, e.g. "bitcoin") in a `vs_currency`
/// (lower-cased ticker, e.g. "krw" or "eth"). A fiat → crypto rate is the
/// inverse of the crypto → fiat quote.
pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
}

impl CoinGeckoProvider {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn simple_price_url(&self, coin_id: &str, vs_currency: &str) -> String {
        format!(
            "{}/simple/price?ids={coin_id}&vs_currencies={vs_currency}",
            self.base_url
        )
    }

    pub fn market_chart_url(&self, coin_id: &str, vs_currency: &str, days: i64) -> String {
        format!(
            "{}/coins/{coin_id}/market_chart?vs_currency={vs_currency}&days={days}&interval=daily",
            self.base_url
        )
    }

    /// Pick the coin to quote, the currency to quote it in, and whether the
    /// quote must be inverted to read as `to` per one `from`.
    fn quote_pair(from: &CurrencyCode, to: &CurrencyCode) -> Result<Quote, CoreError> {
        if let Some(coin) = from.coingecko_id() {
            Ok(Quote {
                coin,
                vs: to.vs_currency(),
                invert: false,
            })
        } else if let Some(coin) = to.coingecko_id() {
            Ok(Quote {
                coin,
                vs: from.vs_currency(),
                invert: true,
            })
        } else {
            Err(CoreError::Unsupported(format!(
                "CoinGecko does not quote the fiat pair {from}/{to}"
            )))
        }
    }
}

impl Default for CoinGeckoProvider {
    fn default() -> Self {
        Self::new()
    }
}

struct Quote {
    coin: &'static str,
    vs: String,
    invert: bool,
}

// ── CoinGecko API response types ────────────────────────────────────

/// `{ "bitcoin": { "krw": 93000000.0 } }`
type SimplePriceResponse = HashMap<String, HashMap<String, f64>>;

#[derive(Deserialize)]
struct MarketChartResponse {
    /// `[[unix_millis, price], ...]`
    prices: Vec<(f64, f64)>,
}

/// Convert `market_chart` price pairs into daily points, one per date
/// (the last sample of a day wins), optionally inverted to `1/p`.
pub fn parse_market_chart(prices: &[(f64, f64)], invert: bool) -> Vec<RatePoint> {
    let mut by_date: std::collections::BTreeMap<NaiveDate, f64> = std::collections::BTreeMap::new();
    for &(millis, price) in prices {
        if !price.is_finite() || price <= 0.0 {
            continue;
        }
        let Some(dt) = chrono::DateTime::from_timestamp_millis(millis as i64) else {
            continue;
        };
        let rate = if invert { 1.0 / price } else { price };
        by_date.insert(dt.date_naive(), rate);
    }
    by_date
        .into_iter()
        .map(|(date, rate)| RatePoint { date, rate })
        .collect()
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl RateProvider for CoinGeckoProvider {
    fn name(&self) -> &str {
        "CoinGecko"
    }

    fn supported_kinds(&self) -> Vec<CurrencyKind> {
        vec![CurrencyKind::Crypto]
    }

    async fn get_rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> Result<f64, CoreError> {
        let quote = Self::quote_pair(from, to)?;

        let resp: SimplePriceResponse = self
            .client
            .get(self.simple_price_url(quote.coin, &quote.vs))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "CoinGecko".into(),
                message: format!("Failed to parse response for {from}/{to}: {e}"),
            })?;

        let price = resp
            .get(quote.coin)
            .and_then(|quotes| quotes.get(&quote.vs))
            .copied()
            .filter(|p| p.is_finite() && *p > 0.0)
            .ok_or_else(|| CoreError::RateNotAvailable {
                from: from.to_string(),
                to: to.to_string(),
            })?;

        Ok(if quote.invert { 1.0 / price } else { price })
    }

    async fn get_history(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RatePoint>, CoreError> {
        if from.is_crypto() && to.is_crypto() {
            return Err(CoreError::Unsupported(format!(
                "History between two cryptocurrencies ({from}/{to}) is not supported"
            )));
        }
        let quote = Self::quote_pair(from, to)?;
        let days = (end - start).num_days().max(1);

        let resp: MarketChartResponse = self
            .client
            .get(self.market_chart_url(quote.coin, &quote.vs, days))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "CoinGecko".into(),
                message: format!("Failed to parse market chart for {from}/{to}: {e}"),
            })?;

        Ok(parse_market_chart(&resp.prices, quote.invert)
            .into_iter()
            .filter(|p| p.date >= start && p.date <= end)
            .collect())
    }
}
