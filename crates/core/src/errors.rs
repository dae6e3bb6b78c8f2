use thiserror::Error;

/// Unified error type for the entire daybook-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Storage / File ──────────────────────────────────────────────
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── File I/O (native only) ──────────────────────────────────────
    #[error("File I/O error: {0}")]
    FileIO(String),

    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("No rate provider available for {0}")]
    NoProvider(String),

    #[error("Rate not available for {from} → {to}")]
    RateNotAvailable { from: String, to: String },

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    // ── Business Logic ──────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid date key: {0}")]
    InvalidDateKey(String),

    #[error("No date selected — pick a date on the calendar first")]
    NoDateSelected,

    #[error("Reset was not confirmed; nothing was deleted")]
    ResetNotConfirmed,
}

impl CoreError {
    /// True for errors caused by user input rather than storage or the network.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            CoreError::Validation(_)
                | CoreError::InvalidDateKey(_)
                | CoreError::NoDateSelected
                | CoreError::ResetNotConfirmed
        )
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors often contain full URLs; the analysis endpoint
        // carries its API key in the query string.
        CoreError::Network(redact_query(&e.to_string()))
    }
}

/// Strip everything after the first `?` so query parameters never reach logs.
pub(crate) fn redact_query(msg: &str) -> String {
    match msg.find('?') {
        Some(idx) => format!("{}?<query redacted>", &msg[..idx]),
        None => msg.to_string(),
    }
}
