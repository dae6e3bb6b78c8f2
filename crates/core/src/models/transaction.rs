use serde::{Deserialize, Serialize};

use super::category::Category;
use super::date_key::DateKey;

/// Which side of the ledger a transaction sits on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    #[default]
    Expense,
}

impl TransactionKind {
    /// `+` for income, `-` for expense.
    pub fn sign(&self) -> char {
        match self {
            TransactionKind::Income => '+',
            TransactionKind::Expense => '-',
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = crate::errors::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(crate::errors::CoreError::Validation(format!(
                "Unknown transaction kind '{other}' (expected income or expense)"
            ))),
        }
    }
}

/// A single income or expense entry.
///
/// Never mutated after creation; only added or bulk-cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Creation timestamp in milliseconds, unique within a ledger
    pub id: i64,

    pub date: DateKey,

    /// Free-text label; may be empty when only a category was entered
    #[serde(default)]
    pub name: String,

    pub category: Category,

    /// Always positive
    pub amount: u64,

    /// Implied by the sequence the transaction is stored in; re-derived on load.
    #[serde(default)]
    pub kind: TransactionKind,
}

impl Transaction {
    /// Name for display: the entered name, or the category's display name.
    pub fn label(&self) -> String {
        if self.name.trim().is_empty() {
            self.category.display_name()
        } else {
            self.name.clone()
        }
    }
}

/// The persisted dashboard ledger: `{ "incomes": [...], "expenses": [...] }`.
///
/// Both sequences are kept in insertion order (newest last).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionLedger {
    #[serde(default)]
    pub incomes: Vec<Transaction>,

    #[serde(default)]
    pub expenses: Vec<Transaction>,
}

impl TransactionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-derive every transaction's `kind` from the sequence holding it.
    /// Snapshots written by the browser widget carry no `kind` field.
    pub fn normalize(&mut self) {
        for tx in &mut self.incomes {
            tx.kind = TransactionKind::Income;
        }
        for tx in &mut self.expenses {
            tx.kind = TransactionKind::Expense;
        }
    }

    pub fn sequence(&self, kind: TransactionKind) -> &[Transaction] {
        match kind {
            TransactionKind::Income => &self.incomes,
            TransactionKind::Expense => &self.expenses,
        }
    }

    pub(crate) fn sequence_mut(&mut self, kind: TransactionKind) -> &mut Vec<Transaction> {
        match kind {
            TransactionKind::Income => &mut self.incomes,
            TransactionKind::Expense => &mut self.expenses,
        }
    }

    pub fn len(&self) -> usize {
        self.incomes.len() + self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.incomes.is_empty() && self.expenses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.incomes.iter().chain(self.expenses.iter())
    }

    pub fn get(&self, id: i64) -> Option<&Transaction> {
        self.iter().find(|t| t.id == id)
    }

    /// Highest id in use, if any.
    pub fn max_id(&self) -> Option<i64> {
        self.iter().map(|t| t.id).max()
    }

    /// All transactions on `key`, incomes and expenses merged, ordered by id.
    pub fn for_date(&self, key: &DateKey) -> Vec<&Transaction> {
        let mut day: Vec<&Transaction> = self.iter().filter(|t| &t.date == key).collect();
        day.sort_by_key(|t| t.id);
        day
    }

    pub fn has_records_on(&self, key: &DateKey) -> bool {
        self.iter().any(|t| &t.date == key)
    }

    pub fn clear(&mut self) {
        self.incomes.clear();
        self.expenses.clear();
    }
}
