use chrono::{Duration, NaiveDate};
use tracing::{debug, warn};

use crate::errors::CoreError;
use crate::models::rate::{Conversion, CurrencyCode, CurrencyKind, RatePoint};
use crate::providers::registry::RateProviderRegistry;

/// Default length of the historical series, in days.
pub const DEFAULT_HISTORY_DAYS: u32 = 30;

/// Converts amounts between fiat and crypto currencies and fetches
/// historical rate series.
///
/// Routing:
/// - fiat ↔ fiat → the `Fiat` providers (Frankfurter)
/// - anything involving crypto → the `Crypto` providers (CoinGecko)
///
/// Providers are tried in registration order; the first success wins.
/// No state is kept between calls.
pub struct ConverterService {
    registry: RateProviderRegistry,
}

impl ConverterService {
    pub fn new(registry: RateProviderRegistry) -> Self {
        Self { registry }
    }

    /// Which provider kind answers for this pair.
    pub fn route(from: &CurrencyCode, to: &CurrencyCode) -> CurrencyKind {
        if from.is_crypto() || to.is_crypto() {
            CurrencyKind::Crypto
        } else {
            CurrencyKind::Fiat
        }
    }

    pub fn has_provider_for(&self, kind: CurrencyKind) -> bool {
        self.registry.get_provider_for(kind).is_some()
    }

    /// Convert `amount` of `from` into `to`.
    ///
    /// The amount must be finite and positive. Converting a currency into
    /// itself is the identity and never touches the network.
    pub async fn convert(
        &self,
        amount: f64,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<Conversion, CoreError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(CoreError::Validation(format!(
                "Amount must be a positive number, got {amount}"
            )));
        }

        if from == to {
            return Ok(Conversion {
                amount,
                from: from.clone(),
                to: to.clone(),
                rate: 1.0,
                converted: amount,
            });
        }

        let rate = self.fetch_rate(from, to).await?;
        debug!(%from, %to, rate, "conversion rate fetched");

        Ok(Conversion {
            amount,
            from: from.clone(),
            to: to.clone(),
            rate,
            converted: amount * rate,
        })
    }

    /// Daily rates for the `days` days up to `today`.
    ///
    /// Same-currency and crypto ↔ crypto pairs have no chart.
    pub async fn history(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
        today: NaiveDate,
        days: u32,
    ) -> Result<Vec<RatePoint>, CoreError> {
        if from == to {
            return Err(CoreError::Unsupported(format!(
                "No rate history for the same currency ({from})"
            )));
        }
        if from.is_crypto() && to.is_crypto() {
            return Err(CoreError::Unsupported(format!(
                "History between two cryptocurrencies ({from}/{to}) is not supported"
            )));
        }

        let start = today - Duration::days(i64::from(days.max(1)));
        let kind = Self::route(from, to);
        let providers = self.registry.get_providers_for(kind);
        if providers.is_empty() {
            return Err(CoreError::NoProvider(kind.to_string()));
        }

        let mut last_error = None;
        for provider in &providers {
            match provider.get_history(from, to, start, today).await {
                Ok(points) => {
                    debug!(provider = provider.name(), %from, %to, points = points.len(), "rate history fetched");
                    return Ok(points);
                }
                Err(e) => {
                    warn!(provider = provider.name(), error = %e, "rate history failed, trying next provider");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CoreError::NoProvider(kind.to_string())))
    }

    /// Latest rate with provider fallback. Rates must be finite and positive.
    async fn fetch_rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> Result<f64, CoreError> {
        let kind = Self::route(from, to);
        let providers = self.registry.get_providers_for(kind);
        if providers.is_empty() {
            return Err(CoreError::NoProvider(kind.to_string()));
        }

        let mut last_error = None;
        for provider in &providers {
            match provider.get_rate(from, to).await {
                Ok(rate) if rate.is_finite() && rate > 0.0 => return Ok(rate),
                Ok(rate) => {
                    last_error = Some(CoreError::Api {
                        provider: provider.name().to_string(),
                        message: format!(
                            "Invalid rate returned for {from}/{to}: {rate} (must be finite and positive)"
                        ),
                    });
                }
                Err(e) => {
                    warn!(provider = provider.name(), error = %e, "rate lookup failed, trying next provider");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CoreError::NoProvider(kind.to_string())))
    }
}

impl Default for ConverterService {
    fn default() -> Self {
        Self::new(RateProviderRegistry::new_with_defaults())
    }
}
