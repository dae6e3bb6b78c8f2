use tracing::info;

use crate::errors::CoreError;
use crate::models::category::Category;
use crate::models::date_key::DateKey;
use crate::models::transaction::{Transaction, TransactionKind, TransactionLedger};

/// Largest amount a single entry may carry.
pub const MAX_AMOUNT: u64 = i64::MAX as u64;

/// Validated input for a new ledger entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub date: DateKey,
    pub category: Category,
    pub amount: u64,
    pub name: String,
}

/// Explicit answer to a destructive prompt ("delete everything?").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl Confirmation {
    /// `Err(ResetNotConfirmed)` unless confirmed.
    pub fn require(self) -> Result<(), CoreError> {
        match self {
            Confirmation::Confirmed => Ok(()),
            Confirmation::Declined => Err(CoreError::ResetNotConfirmed),
        }
    }
}

impl From<bool> for Confirmation {
    fn from(yes: bool) -> Self {
        if yes {
            Confirmation::Confirmed
        } else {
            Confirmation::Declined
        }
    }
}

/// Validates and appends ledger entries.
///
/// Pure business logic — no I/O. Persistence is the caller's job.
pub struct LedgerService;

impl LedgerService {
    pub fn new() -> Self {
        Self
    }

    /// Coerce user input into a positive amount.
    ///
    /// Every non-digit is dropped first (the amount field only accepts
    /// digits), so `"500,000"` parses as 500000. Empty, zero or
    /// input above [`MAX_AMOUNT`] is a validation error.
    pub fn parse_amount(input: &str) -> Result<u64, CoreError> {
        let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            return Err(CoreError::Validation(format!(
                "Amount '{input}' is not a number"
            )));
        }
        let amount: u64 = digits
            .parse()
            .map_err(|_| CoreError::Validation(format!("Amount '{input}' is too large")))?;
        if amount == 0 {
            return Err(CoreError::Validation("Amount must be greater than zero".into()));
        }
        if amount > MAX_AMOUNT {
            return Err(CoreError::Validation(format!("Amount '{input}' is too large")));
        }
        Ok(amount)
    }

    /// Check the raw fields and build a [`NewTransaction`].
    pub fn validate(
        &self,
        kind: TransactionKind,
        date: DateKey,
        category: &str,
        amount: u64,
        name: Option<&str>,
    ) -> Result<NewTransaction, CoreError> {
        if amount == 0 {
            return Err(CoreError::Validation("Amount must be greater than zero".into()));
        }
        if amount > MAX_AMOUNT {
            return Err(CoreError::Validation(format!(
                "Amount {amount} is above the limit of {MAX_AMOUNT}"
            )));
        }
        if category.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "Please fill in every {kind} field: category is missing"
            )));
        }
        let category = Category::from_key(category).ok_or_else(|| {
            CoreError::Validation(format!("Unknown category '{}'", category.trim()))
        })?;
        if category.natural_kind() != Some(kind) {
            return Err(CoreError::Validation(format!(
                "'{}' is not an {kind} category",
                category.key()
            )));
        }

        Ok(NewTransaction {
            kind,
            date,
            category,
            amount,
            name: name.map(|n| n.trim().to_string()).unwrap_or_default(),
        })
    }

    /// Next id: the creation time in milliseconds, bumped past the
    /// highest id already in the ledger so ids stay unique and increasing.
    pub fn next_id(&self, ledger: &TransactionLedger, now_millis: i64) -> i64 {
        match ledger.max_id() {
            Some(max) if max >= now_millis => max + 1,
            _ => now_millis,
        }
    }

    /// Append a validated entry to the matching sequence (newest last).
    pub fn append(
        &self,
        ledger: &mut TransactionLedger,
        new: NewTransaction,
        now_millis: i64,
    ) -> Transaction {
        let tx = Transaction {
            id: self.next_id(ledger, now_millis),
            date: new.date,
            name: new.name,
            category: new.category,
            amount: new.amount,
            kind: new.kind,
        };
        ledger.sequence_mut(new.kind).push(tx.clone());
        info!(id = tx.id, kind = %tx.kind, date = %tx.date, amount = tx.amount, "transaction added");
        tx
    }
}

impl Default for LedgerService {
    fn default() -> Self {
        Self::new()
    }
}
