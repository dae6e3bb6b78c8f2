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

const BASE_URL: &str = "https://api.frankfurter.app";

/// Frankfurter API provider for fiat exchange rates.
///
/// - **Free**: No API key, open-source, European Central Bank data.
/// - **Endpoints**: `/latest?from=&to=`, `/{start}..{end}?from=&to=`
/// - Publishes working days only; weekends are absent from a series.
pub struct FrankfurterProvider {
    client: Client,
    base_url: String,
}

impl FrankfurterProvider {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    /// Point at another deployment (self-hosted Frankfurter, test server).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn latest_url(&self, from: &CurrencyCode, to: &CurrencyCode) -> String {
        format!("{}/latest?from={from}&to={to}", self.base_url)
    }

    pub fn series_url(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
        start: NaiveDate,
        end: NaiveDate,
    ) -> String {
        format!(
            "{}/{}..{}?from={from}&to={to}",
            self.base_url,
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        )
    }
}

impl Default for FrankfurterProvider {
    fn default() -> Self {
        Self::new()
    }
}

// ── Frankfurter API response types ──────────────────────────────────

#[derive(Deserialize)]
struct LatestResponse {
    rates: HashMap<String, f64>,
}

#[derive(Deserialize)]
struct SeriesResponse {
    rates: HashMap<String, HashMap<String, f64>>,
}

/// Turn a `{ "2024-01-02": { "KRW": 1300.5 }, ... }` map into sorted points.
pub fn parse_series(rates: &HashMap<String, HashMap<String, f64>>, to: &str) -> Vec<RatePoint> {
    let mut points: Vec<RatePoint> = rates
        .iter()
        .filter_map(|(date_str, day)| {
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok()?;
            let rate = *day.get(to)?;
            Some(RatePoint { date, rate })
        })
        .collect();
    points.sort_by_key(|p| p.date);
    points
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl RateProvider for FrankfurterProvider {
    fn name(&self) -> &str {
        "Frankfurter"
    }

    fn supported_kinds(&self) -> Vec<CurrencyKind> {
        vec![CurrencyKind::Fiat]
    }

    async fn get_rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> Result<f64, CoreError> {
        if from == to {
            return Ok(1.0);
        }

        let resp: LatestResponse = self
            .client
            .get(self.latest_url(from, to))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "Frankfurter".into(),
                message: format!("Failed to parse response for {from}/{to}: {e}"),
            })?;

        resp.rates
            .get(to.as_str())
            .copied()
            .ok_or_else(|| CoreError::RateNotAvailable {
                from: from.to_string(),
                to: to.to_string(),
            })
    }

    async fn get_history(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RatePoint>, CoreError> {
        let resp: SeriesResponse = self
            .client
            .get(self.series_url(from, to, start, end))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "Frankfurter".into(),
                message: format!("Failed to parse time series for {from}/{to}: {e}"),
            })?;

        Ok(parse_series(&resp.rates, to.as_str()))
    }
}
