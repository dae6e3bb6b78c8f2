pub mod registry;
pub mod traits;

// API provider implementations
pub mod analysis;
pub mod backend;
pub mod coingecko;
pub mod frankfurter;
