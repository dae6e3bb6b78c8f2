use tracing::{info, warn};

use crate::errors::CoreError;
use crate::models::date_key::DateKey;
use crate::models::summary::{DashboardSummary, DayDetail, SummaryTotals};
use crate::models::transaction::TransactionKind;
use crate::providers::backend::{LedgerBackend, TransactionRequest};

use super::ledger_service::{Confirmation, LedgerService};
use super::summary_service::SummaryService;

/// A view model plus the user-facing message to show when the backend
/// could not be reached. `value` is always renderable.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteOutcome<T> {
    pub value: T,
    pub error: Option<String>,
}

impl<T> RemoteOutcome<T> {
    fn ok(value: T) -> Self {
        Self { value, error: None }
    }

    fn degraded(value: T, error: String) -> Self {
        Self {
            value,
            error: Some(error),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

/// Dashboard driven by a REST backend instead of the local ledger.
///
/// Reads never fail: on a backend error the zeroed summary or an empty day
/// is returned together with a message. Writes validate locally first and
/// report backend errors to the caller.
pub struct RemoteDashboard<B: LedgerBackend> {
    backend: B,
    ledger_service: LedgerService,
    summary_service: SummaryService,
}

impl<B: LedgerBackend> RemoteDashboard<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            ledger_service: LedgerService::new(),
            summary_service: SummaryService::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn summary(&self) -> RemoteOutcome<DashboardSummary> {
        match self.backend.fetch_summary().await {
            Ok(totals) => RemoteOutcome::ok(self.summary_service.summarize_totals(totals)),
            Err(e) => {
                warn!(backend = self.backend.name(), error = %e, "summary unavailable, showing zeroes");
                RemoteOutcome::degraded(
                    self.summary_service.summarize_totals(SummaryTotals::default()),
                    format!("Could not load the summary from the server: {e}"),
                )
            }
        }
    }

    pub async fn day_detail(&self, key: &DateKey) -> RemoteOutcome<DayDetail> {
        match self.backend.fetch_transactions(key).await {
            Ok(transactions) => {
                RemoteOutcome::ok(self.summary_service.detail_from(key, transactions.iter()))
            }
            Err(e) => {
                warn!(backend = self.backend.name(), date = %key, error = %e, "transactions unavailable");
                RemoteOutcome::degraded(
                    self.summary_service.detail_from(key, std::iter::empty()),
                    format!("Could not load transactions for {key}: {e}"),
                )
            }
        }
    }

    /// Validate and post a new entry for the selected date.
    pub async fn add_transaction(
        &self,
        kind: TransactionKind,
        selected: Option<&DateKey>,
        category: &str,
        amount_text: &str,
    ) -> Result<(), CoreError> {
        let date = selected.ok_or(CoreError::NoDateSelected)?;
        let amount = LedgerService::parse_amount(amount_text)?;
        let new = self
            .ledger_service
            .validate(kind, *date, category, amount, None)?;

        let request = TransactionRequest::new(&new.date, &new.category, new.amount);
        self.backend.add_transaction(kind, &request).await?;
        info!(kind = %kind, date = %new.date, amount, "transaction posted to backend");
        Ok(())
    }

    /// Delete everything on the server. Nothing is sent unless confirmed.
    pub async fn reset(&self, confirmation: Confirmation) -> Result<(), CoreError> {
        confirmation.require()?;
        self.backend.reset().await?;
        info!(backend = self.backend.name(), "backend data reset");
        Ok(())
    }
}
