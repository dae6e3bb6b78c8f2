use crate::models::rate::CurrencyKind;

use super::coingecko::CoinGeckoProvider;
use super::frankfurter::FrankfurterProvider;
use super::traits::RateProvider;

/// Registry of all available rate providers.
///
/// Routes requests to the correct provider based on `CurrencyKind`.
pub struct RateProviderRegistry {
    providers: Vec<Box<dyn RateProvider>>,
}

impl RateProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Create a registry with Frankfurter (fiat) and CoinGecko (crypto).
    /// Neither needs an API key.
    pub fn new_with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(FrankfurterProvider::new()));
        registry.register(Box::new(CoinGeckoProvider::new()));
        registry
    }

    /// Register a new rate provider.
    pub fn register(&mut self, provider: Box<dyn RateProvider>) {
        self.providers.push(provider);
    }

    /// Find the first provider that supports the given kind.
    pub fn get_provider_for(&self, kind: CurrencyKind) -> Option<&dyn RateProvider> {
        self.providers
            .iter()
            .find(|p| p.supported_kinds().contains(&kind))
            .map(|p| p.as_ref())
    }

    /// All providers for the kind, in registration order (fallback chain).
    pub fn get_providers_for(&self, kind: CurrencyKind) -> Vec<&dyn RateProvider> {
        self.providers
            .iter()
            .filter(|p| p.supported_kinds().contains(&kind))
            .map(|p| p.as_ref())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for RateProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
