use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::category::Category;
use crate::models::date_key::{DateKey, DateKeyStyle};
use crate::models::summary::SummaryTotals;
use crate::models::transaction::{Transaction, TransactionKind};

/// Abstraction over the dashboard's REST backend.
///
/// The backend owns the ledger; this side only reads aggregates and posts
/// new entries.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait LedgerBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Server-computed totals for the dashboard.
    async fn fetch_summary(&self) -> Result<SummaryTotals, CoreError>;

    /// Transactions recorded on one date.
    async fn fetch_transactions(&self, date: &DateKey) -> Result<Vec<Transaction>, CoreError>;

    async fn add_transaction(
        &self,
        kind: TransactionKind,
        request: &TransactionRequest,
    ) -> Result<(), CoreError>;

    /// Delete every transaction on the server.
    async fn reset(&self) -> Result<(), CoreError>;
}

/// Body of `POST /transactions/{income|expense}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    /// Always `YYYY-MM-DD`
    pub date: String,
    pub category: String,
    pub amount: u64,
}

impl TransactionRequest {
    pub fn new(date: &DateKey, category: &Category, amount: u64) -> Self {
        Self {
            date: date.with_style(DateKeyStyle::Padded).to_string(),
            category: category.key().to_string(),
            amount,
        }
    }
}

// ── Wire types ──────────────────────────────────────────────────────

/// A category as the backend sends it: a bare key or `{ "name": key }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireCategory {
    Key(String),
    Named { name: String },
}

impl WireCategory {
    pub fn key(&self) -> &str {
        match self {
            WireCategory::Key(key) => key,
            WireCategory::Named { name } => name,
        }
    }
}

/// A transaction as returned by `GET /transactions?date=`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTransaction {
    #[serde(default)]
    pub id: i64,

    #[serde(default, alias = "transactionDate", alias = "transaction_date")]
    pub date: Option<String>,

    #[serde(default, alias = "description")]
    pub name: Option<String>,

    pub category: WireCategory,

    pub amount: f64,

    #[serde(default, rename = "type", alias = "kind")]
    pub kind: Option<String>,
}

impl WireTransaction {
    /// Convert into a ledger transaction, falling back to `requested` when
    /// the server omits or garbles the date, and to the category's natural
    /// kind when the server omits the type.
    pub fn into_transaction(self, requested: &DateKey) -> Result<Transaction, CoreError> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(CoreError::Deserialization(format!(
                "Transaction {} has an invalid amount {}",
                self.id, self.amount
            )));
        }
        let category = Category::from(self.category.key());
        let kind = match self.kind.as_deref() {
            Some(raw) => raw.parse()?,
            None => category.natural_kind().unwrap_or_default(),
        };
        let date = self
            .date
            .as_deref()
            .and_then(|d| DateKey::parse(d).ok())
            .map(|d| d.with_style(requested.style()))
            .unwrap_or(*requested);

        Ok(Transaction {
            id: self.id,
            date,
            name: self.name.unwrap_or_default(),
            category,
            amount: self.amount.round() as u64,
            kind,
        })
    }
}

// ── HTTP implementation ─────────────────────────────────────────────

/// reqwest client for the dashboard backend.
///
/// `base_url` is the API root, e.g. `http://localhost:8080/api`.
pub struct HttpLedgerBackend {
    client: Client,
    base_url: String,
}

impl HttpLedgerBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(15));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn summary_url(&self) -> String {
        format!("{}/summary", self.base_url)
    }

    pub fn transactions_url(&self, date: &DateKey) -> String {
        format!(
            "{}/transactions?date={}",
            self.base_url,
            date.with_style(DateKeyStyle::Padded)
        )
    }

    pub fn add_url(&self, kind: TransactionKind) -> String {
        format!("{}/transactions/{}", self.base_url, kind.as_str())
    }

    pub fn reset_url(&self) -> String {
        format!("{}/data/reset", self.base_url)
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl LedgerBackend for HttpLedgerBackend {
    fn name(&self) -> &str {
        "Dashboard backend"
    }

    async fn fetch_summary(&self) -> Result<SummaryTotals, CoreError> {
        self.client
            .get(self.summary_url())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: self.name().into(),
                message: format!("Failed to parse summary: {e}"),
            })
    }

    async fn fetch_transactions(&self, date: &DateKey) -> Result<Vec<Transaction>, CoreError> {
        let wire: Vec<WireTransaction> = self
            .client
            .get(self.transactions_url(date))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: self.name().into(),
                message: format!("Failed to parse transactions for {date}: {e}"),
            })?;

        let mut transactions = wire
            .into_iter()
            .map(|w| w.into_transaction(date))
            .collect::<Result<Vec<_>, _>>()?;
        transactions.sort_by_key(|t| t.id);
        Ok(transactions)
    }

    async fn add_transaction(
        &self,
        kind: TransactionKind,
        request: &TransactionRequest,
    ) -> Result<(), CoreError> {
        self.client
            .post(self.add_url(kind))
            .json(request)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn reset(&self) -> Result<(), CoreError> {
        // The reset endpoint may answer with an empty body.
        self.client
            .post(self.reset_url())
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
